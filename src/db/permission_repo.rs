// src/db/permission_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::permission::{CreatePermissionPayload, PermissionNode, UpdatePermissionPayload};

const NODE_COLUMNS: &str = "id, name, code, kind, parent_code, path, parent_path, icon, sort, \
     created_at, updated_at";

// Repositório do catálogo de permissões (tabela 'permissions').
// Remoção é sempre soft-delete; a unicidade de `code` vale apenas entre
// registros vivos (índice parcial).
#[derive(Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Todos os nós vivos, já na ordem secundária de `sort`.
    pub async fn list_live(&self) -> Result<Vec<PermissionNode>, AppError> {
        let nodes = sqlx::query_as::<_, PermissionNode>(&format!(
            "SELECT {NODE_COLUMNS} FROM permissions WHERE NOT deleted ORDER BY sort ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(nodes)
    }

    pub async fn list_live_buttons(&self) -> Result<Vec<PermissionNode>, AppError> {
        let nodes = sqlx::query_as::<_, PermissionNode>(&format!(
            "SELECT {NODE_COLUMNS} FROM permissions \
             WHERE NOT deleted AND kind = 'button' ORDER BY sort ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(nodes)
    }

    // Checagem de unicidade do code entre vivos, excluindo opcionalmente o
    // próprio registro (caso de update).
    pub async fn code_taken(&self, code: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM permissions \
                WHERE code = $1 AND NOT deleted AND ($2::uuid IS NULL OR id <> $2) \
            )",
        )
        .bind(code)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    pub async fn insert(&self, p: &CreatePermissionPayload) -> Result<PermissionNode, AppError> {
        let node = sqlx::query_as::<_, PermissionNode>(&format!(
            "INSERT INTO permissions (name, code, kind, parent_code, path, parent_path, icon, sort) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {NODE_COLUMNS}"
        ))
        .bind(&p.name)
        .bind(&p.code)
        .bind(p.kind.as_str())
        .bind(&p.parent_code)
        .bind(&p.path)
        .bind(&p.parent_path)
        .bind(&p.icon)
        .bind(p.sort)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe uma permissão com esse código."))?;

        Ok(node)
    }

    pub async fn update(&self, p: &UpdatePermissionPayload) -> Result<PermissionNode, AppError> {
        let node = sqlx::query_as::<_, PermissionNode>(&format!(
            "UPDATE permissions \
             SET name = $2, code = $3, kind = $4, parent_code = $5, path = $6, \
                 parent_path = $7, icon = $8, sort = $9, updated_at = now() \
             WHERE id = $1 AND NOT deleted \
             RETURNING {NODE_COLUMNS}"
        ))
        .bind(p.id)
        .bind(&p.name)
        .bind(&p.code)
        .bind(p.kind.as_str())
        .bind(&p.parent_code)
        .bind(&p.path)
        .bind(&p.parent_path)
        .bind(&p.icon)
        .bind(p.sort)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe uma permissão com esse código."))?
        .ok_or_else(|| AppError::NotFound("Permissão não encontrada.".into()))?;

        Ok(node)
    }

    pub async fn soft_delete(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE permissions SET deleted = TRUE, updated_at = now() \
             WHERE id = ANY($1) AND NOT deleted",
        )
        .bind(ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
