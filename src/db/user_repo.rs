// src/db/user_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::User;

const USER_COLUMNS: &str = "id, username, nickname, email, password_hash, role, permissions, \
     status, created_at, updated_at";

// O repositório de usuários, responsável por todas as interações com a
// tabela 'users'.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Login aceita nome de usuário ou e-mail
    pub async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE (username = $1 OR email = $1) AND NOT deleted"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND NOT deleted"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_user)
    }

    pub async fn insert(
        &self,
        username: &str,
        nickname: &str,
        email: &str,
        password_hash: &str,
        role: &str,
        permissions: &[String],
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, nickname, email, password_hash, role, permissions) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(nickname)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(permissions)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Usuário ou e-mail já existe."))?;

        Ok(user)
    }

    // Atribuição de cargo grava o snapshot de códigos de permissão junto.
    // A cópia é tirada aqui e nunca mais sincronizada com o cargo.
    pub async fn update_profile(
        &self,
        id: Uuid,
        nickname: &str,
        email: &str,
        role: &str,
        permissions: &[String],
        status: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET nickname = $2, email = $3, role = $4, permissions = $5, status = $6, \
                 updated_at = now() \
             WHERE id = $1 AND NOT deleted \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(nickname)
        .bind(email)
        .bind(role)
        .bind(permissions)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "E-mail já está em uso por outro usuário."))?
        .ok_or_else(|| AppError::NotFound("Usuário não encontrado.".into()))?;

        Ok(user)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() \
             WHERE id = $1 AND NOT deleted",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Usuário não encontrado.".into()));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        username: Option<&str>,
        status: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<User>, i64), AppError> {
        let pattern = username.map(|u| format!("%{u}%"));

        let list = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE NOT deleted \
               AND ($1::text IS NULL OR username ILIKE $1) \
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
            "SELECT COUNT(*) FROM users \
             WHERE NOT deleted \
               AND ($1::text IS NULL OR username ILIKE $1) \
               AND ($2::text IS NULL OR status = $2)",
        )
        .bind(&pattern)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((list, total))
    }

    pub async fn soft_delete(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE users SET deleted = TRUE, updated_at = now() \
             WHERE id = ANY($1) AND NOT deleted",
        )
        .bind(ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
