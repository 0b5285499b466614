// src/services/role_service.rs

use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::RoleRepository;
use crate::models::role::{
    CreateRolePayload, Role, STATUS_ACTIVE, STATUS_DISABLED, UpdateRolePayload,
};

// Registro de cargos. O conjunto de permissões pertence ao cargo; nada
// aqui depende do formato da árvore do catálogo.
#[derive(Clone)]
pub struct RoleService {
    repo: RoleRepository,
}

impl RoleService {
    pub fn new(repo: RoleRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, payload: &CreateRolePayload) -> Result<Role, AppError> {
        if self.repo.code_taken(&payload.code, None).await? {
            return Err(AppError::Conflict("Já existe um cargo com esse código.".into()));
        }
        self.repo.insert(payload).await
    }

    pub async fn update(&self, payload: &UpdateRolePayload) -> Result<Role, AppError> {
        if self.repo.code_taken(&payload.code, Some(payload.id)).await? {
            return Err(AppError::Conflict("Já existe um cargo com esse código.".into()));
        }
        self.repo.update(payload).await
    }

    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<Role, AppError> {
        if status != STATUS_ACTIVE && status != STATUS_DISABLED {
            return Err(AppError::Validation(format!("Status de cargo inválido: {status}")));
        }
        // Desativar um cargo bloqueia novos logins, mas credenciais já
        // emitidas seguem valendo até expirarem.
        self.repo.update_status(id, status).await
    }

    pub async fn delete(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Err(AppError::Validation("Informe ao menos um cargo.".into()));
        }
        self.repo.soft_delete(ids).await
    }

    pub async fn list(
        &self,
        keywords: Option<&str>,
        status: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Role>, i64), AppError> {
        self.repo.list(keywords, status, page, page_size).await
    }

    pub async fn list_all(&self) -> Result<Vec<Role>, AppError> {
        self.repo.list_all().await
    }
}
