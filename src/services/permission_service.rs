// src/services/permission_service.rs

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::PermissionRepository;
use crate::models::permission::{
    CreatePermissionPayload, PermissionKind, PermissionNode, PermissionTreeNode,
    UpdatePermissionPayload,
};

// Resultado de uma passada de compilação do catálogo. Imutável depois de
// montado; leitores clonam o Arc e enxergam a versão antiga ou a nova
// completa, nunca uma intermediária.
pub struct CompiledCatalog {
    pub forest: Vec<PermissionTreeNode>,
    pub menu_forest: Vec<PermissionTreeNode>,
    pub nodes: Vec<PermissionNode>,
}

// Catálogo de permissões: administração dos nós e compilação da árvore,
// com cache em memória reconstruído a cada mudança administrativa.
#[derive(Clone)]
pub struct PermissionService {
    repo: PermissionRepository,
    cache: Arc<RwLock<Option<Arc<CompiledCatalog>>>>,
}

impl PermissionService {
    pub fn new(repo: PermissionRepository) -> Self {
        Self {
            repo,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    // Snapshot corrente do catálogo compilado, construindo-o na primeira
    // leitura.
    pub async fn snapshot(&self) -> Result<Arc<CompiledCatalog>, AppError> {
        if let Some(compiled) = self.cache.read().expect("cache de permissões envenenado").clone()
        {
            return Ok(compiled);
        }
        self.reload().await
    }

    async fn reload(&self) -> Result<Arc<CompiledCatalog>, AppError> {
        let nodes = self.repo.list_live().await?;

        let menu_nodes: Vec<PermissionNode> = nodes
            .iter()
            .filter(|n| n.kind == PermissionKind::Menu.as_str())
            .cloned()
            .collect();

        let compiled = Arc::new(CompiledCatalog {
            forest: compile_tree(&nodes),
            menu_forest: compile_tree(&menu_nodes),
            nodes,
        });

        *self.cache.write().expect("cache de permissões envenenado") = Some(compiled.clone());
        Ok(compiled)
    }

    pub async fn tree(&self, menu_only: bool) -> Result<Vec<PermissionTreeNode>, AppError> {
        let compiled = self.snapshot().await?;
        Ok(if menu_only {
            compiled.menu_forest.clone()
        } else {
            compiled.forest.clone()
        })
    }

    pub async fn button_list(&self) -> Result<Vec<PermissionNode>, AppError> {
        self.repo.list_live_buttons().await
    }

    // Rotas de menu autorizadas para um conjunto de códigos, resolvidas no
    // login e congeladas na credencial.
    pub async fn allowed_paths_for(&self, codes: &[String]) -> Result<Vec<String>, AppError> {
        let compiled = self.snapshot().await?;
        Ok(resolve_allowed_paths(codes, &compiled.nodes))
    }

    pub async fn create(&self, payload: &CreatePermissionPayload) -> Result<PermissionNode, AppError> {
        if self.repo.code_taken(&payload.code, None).await? {
            return Err(AppError::Conflict("O código da permissão já existe.".into()));
        }
        let node = self.repo.insert(payload).await?;
        self.reload().await?;
        Ok(node)
    }

    pub async fn update(&self, payload: &UpdatePermissionPayload) -> Result<PermissionNode, AppError> {
        if self.repo.code_taken(&payload.code, Some(payload.id)).await? {
            return Err(AppError::Conflict("O código da permissão já existe.".into()));
        }
        let node = self.repo.update(payload).await?;
        self.reload().await?;
        Ok(node)
    }

    pub async fn delete(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Err(AppError::Validation("Informe ao menos uma permissão.".into()));
        }
        let affected = self.repo.soft_delete(ids).await?;
        self.reload().await?;
        Ok(affected)
    }
}

// Compila o conjunto plano de nós vivos na floresta ordenada.
// Ordenação: menus antes de botões, depois `sort` ascendente. Como os
// filhos são anexados nessa ordem, a árvore final preserva a prioridade
// declarada. Nós cujo pai não está no conjunto (removido) são descartados
// em silêncio, não propagados como erro.
pub fn compile_tree(nodes: &[PermissionNode]) -> Vec<PermissionTreeNode> {
    let mut sorted: Vec<&PermissionNode> = nodes.iter().collect();
    sorted.sort_by(|a, b| {
        let rank = |n: &PermissionNode| if n.kind == PermissionKind::Menu.as_str() { 0 } else { 1 };
        rank(a).cmp(&rank(b)).then(a.sort.cmp(&b.sort))
    });

    // Arena indexada pela chave de negócio (code), montada uma vez por
    // passada, sem grafo de objetos recursivo vivo.
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(sorted.len());
    for (i, node) in sorted.iter().enumerate() {
        index.insert(node.code.as_str(), i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); sorted.len()];
    let mut roots: Vec<usize> = Vec::new();

    for (i, node) in sorted.iter().enumerate() {
        match node.parent_code.as_deref() {
            None => roots.push(i),
            Some(parent_code) if parent_code != node.code => {
                if let Some(&parent_idx) = index.get(parent_code) {
                    children[parent_idx].push(i);
                }
                // pai ausente: órfão fica de fora da floresta
            }
            // auto-referência nunca entra na árvore
            Some(_) => {}
        }
    }

    fn assemble(
        idx: usize,
        sorted: &[&PermissionNode],
        children: &[Vec<usize>],
    ) -> PermissionTreeNode {
        let node = sorted[idx];
        let is_menu = node.kind == PermissionKind::Menu.as_str();
        let kids: Vec<PermissionTreeNode> = children[idx]
            .iter()
            .map(|&child| assemble(child, sorted, children))
            .collect();

        PermissionTreeNode {
            id: node.id,
            name: node.name.clone(),
            code: node.code.clone(),
            kind: node.kind.clone(),
            icon: node.icon.clone(),
            // Botões não carregam ordenação nem rota
            sort: if is_menu { Some(node.sort) } else { None },
            path: if is_menu { node.path.clone() } else { None },
            parent_path: node.parent_path.clone(),
            parent_code: node.parent_code.clone(),
            children: if kids.is_empty() { None } else { Some(kids) },
        }
    }

    roots
        .into_iter()
        .map(|idx| assemble(idx, &sorted, &children))
        .collect()
}

// Caminhos de menu autorizados por um conjunto de códigos. Botões nunca
// viram rota: são checados por pertinência de código, não por prefixo.
pub fn resolve_allowed_paths(codes: &[String], nodes: &[PermissionNode]) -> Vec<String> {
    nodes
        .iter()
        .filter(|n| n.kind == PermissionKind::Menu.as_str())
        .filter(|n| codes.iter().any(|c| c == &n.code))
        .filter_map(|n| n.path.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn node(
        code: &str,
        kind: &str,
        parent_code: Option<&str>,
        path: Option<&str>,
        sort: i32,
    ) -> PermissionNode {
        PermissionNode {
            id: Uuid::new_v4(),
            name: code.to_uppercase(),
            code: code.into(),
            kind: kind.into(),
            parent_code: parent_code.map(Into::into),
            path: path.map(Into::into),
            parent_path: None,
            icon: None,
            sort,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn orphans_of_deleted_parents_vanish_silently() {
        // O pai "system" não está no conjunto vivo: o filho some da
        // floresta em vez de virar raiz ou erro.
        let nodes = vec![
            node("dashboard", "menu", None, Some("/api/dashboard"), 1),
            node("system:users", "menu", Some("system"), Some("/api/users"), 2),
        ];

        let forest = compile_tree(&nodes);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].code, "dashboard");
    }

    #[test]
    fn menus_precede_buttons_and_sort_orders_siblings() {
        let nodes = vec![
            node("content:delete", "button", Some("content"), None, 0),
            node("content", "menu", None, Some("/api/contents"), 2),
            node("dashboard", "menu", None, Some("/api/dashboard"), 1),
        ];

        let forest = compile_tree(&nodes);
        let codes: Vec<&str> = forest.iter().map(|n| n.code.as_str()).collect();
        assert_eq!(codes, vec!["dashboard", "content"]);

        let content = &forest[1];
        let kids = content.children.as_ref().unwrap();
        assert_eq!(kids[0].code, "content:delete");
        assert_eq!(kids[0].sort, None);
        assert_eq!(kids[0].path, None);
    }

    #[test]
    fn leaves_have_no_empty_children_array() {
        let nodes = vec![node("dashboard", "menu", None, Some("/api/dashboard"), 1)];
        let forest = compile_tree(&nodes);
        assert!(forest[0].children.is_none());
    }

    #[test]
    fn nested_tree_keeps_declared_order() {
        let nodes = vec![
            node("content", "menu", None, Some("/api/contents"), 1),
            node("content:list", "menu", Some("content"), Some("/api/contents/list"), 2),
            node("content:preview", "menu", Some("content"), Some("/api/contents/preview"), 1),
        ];

        let forest = compile_tree(&nodes);
        let kids = forest[0].children.as_ref().unwrap();
        let codes: Vec<&str> = kids.iter().map(|n| n.code.as_str()).collect();
        assert_eq!(codes, vec!["content:preview", "content:list"]);
    }

    #[test]
    fn allowed_paths_cover_exactly_the_held_menu_codes() {
        let nodes = vec![
            node("content", "menu", None, Some("/api/contents"), 1),
            node("logs", "menu", None, Some("/api/logs"), 2),
            node("content:delete", "button", Some("content"), None, 0),
        ];

        let held = vec!["content".to_string(), "content:delete".to_string()];
        let paths = resolve_allowed_paths(&held, &nodes);

        // O botão não vira rota; o menu não concedido não vaza.
        assert_eq!(paths, vec!["/api/contents".to_string()]);
    }
}
