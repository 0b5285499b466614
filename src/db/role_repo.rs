// src/db/role_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::role::{CreateRolePayload, Role, UpdateRolePayload};

const ROLE_COLUMNS: &str =
    "id, name, code, description, permissions, status, created_at, updated_at";

#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1 AND NOT deleted"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE code = $1 AND NOT deleted"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    pub async fn code_taken(&self, code: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM roles \
                WHERE code = $1 AND NOT deleted AND ($2::uuid IS NULL OR id <> $2) \
            )",
        )
        .bind(code)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    pub async fn insert(&self, p: &CreateRolePayload) -> Result<Role, AppError> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "INSERT INTO roles (name, code, description, permissions) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ROLE_COLUMNS}"
        ))
        .bind(&p.name)
        .bind(&p.code)
        .bind(&p.description)
        .bind(&p.permissions)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um cargo com esse código."))?;

        Ok(role)
    }

    pub async fn update(&self, p: &UpdateRolePayload) -> Result<Role, AppError> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "UPDATE roles \
             SET name = $2, code = $3, description = $4, permissions = $5, updated_at = now() \
             WHERE id = $1 AND NOT deleted \
             RETURNING {ROLE_COLUMNS}"
        ))
        .bind(p.id)
        .bind(&p.name)
        .bind(&p.code)
        .bind(&p.description)
        .bind(&p.permissions)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um cargo com esse código."))?
        .ok_or_else(|| AppError::NotFound("Cargo não encontrado.".into()))?;

        Ok(role)
    }

    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<Role, AppError> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "UPDATE roles SET status = $2, updated_at = now() \
             WHERE id = $1 AND NOT deleted \
             RETURNING {ROLE_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Cargo não encontrado.".into()))?;

        Ok(role)
    }

    pub async fn list(
        &self,
        keywords: Option<&str>,
        status: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Role>, i64), AppError> {
        let pattern = keywords.map(|k| format!("%{k}%"));

        let list = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles \
             WHERE NOT deleted \
               AND ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1) \
               AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(&pattern)
        .bind(status)
        .bind(page_size)
        .bind((page - 1) * page_size)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM roles \
             WHERE NOT deleted \
               AND ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1) \
               AND ($2::text IS NULL OR status = $2)",
        )
        .bind(&pattern)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((list, total))
    }

    // Listagem completa, sem paginação (formulário de usuários)
    pub async fn list_all(&self) -> Result<Vec<Role>, AppError> {
        let list = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE NOT deleted ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(list)
    }

    pub async fn soft_delete(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE roles SET deleted = TRUE, updated_at = now() \
             WHERE id = ANY($1) AND NOT deleted",
        )
        .bind(ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
