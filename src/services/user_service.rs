// src/services/user_service.rs

use bcrypt::hash;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{RoleRepository, UserRepository};
use crate::models::auth::{CreateUserPayload, UpdateUserPayload, User};

// Administração de usuários. A atribuição de cargo copia o conjunto de
// códigos do cargo para o usuário naquele instante; edições posteriores
// no cargo não reescrevem a cópia.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    role_repo: RoleRepository,
}

impl UserService {
    pub fn new(user_repo: UserRepository, role_repo: RoleRepository) -> Self {
        Self { user_repo, role_repo }
    }

    async fn role_snapshot(&self, role_code: &str) -> Result<Vec<String>, AppError> {
        let role = self
            .role_repo
            .find_by_code(role_code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cargo não encontrado: {role_code}")))?;
        Ok(role.permissions)
    }

    pub async fn create(&self, payload: &CreateUserPayload) -> Result<User, AppError> {
        let permissions = self.role_snapshot(&payload.role).await?;

        let password = payload.password.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {e}"))??;

        self.user_repo
            .insert(
                &payload.username,
                &payload.nickname,
                &payload.email,
                &password_hash,
                &payload.role,
                &permissions,
            )
            .await
    }

    pub async fn update(&self, payload: &UpdateUserPayload) -> Result<User, AppError> {
        if payload.status != "active" && payload.status != "disabled" {
            return Err(AppError::Validation(format!(
                "Status de usuário inválido: {}",
                payload.status
            )));
        }

        // Snapshot tirado de novo a cada atribuição de cargo
        let permissions = self.role_snapshot(&payload.role).await?;

        self.user_repo
            .update_profile(
                payload.id,
                &payload.nickname,
                &payload.email,
                &payload.role,
                &permissions,
                &payload.status,
            )
            .await
    }

    pub async fn update_password(&self, id: Uuid, password: &str) -> Result<(), AppError> {
        let password = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {e}"))??;

        self.user_repo.update_password(id, &password_hash).await
    }

    pub async fn list(
        &self,
        username: Option<&str>,
        status: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<User>, i64), AppError> {
        self.user_repo.list(username, status, page, page_size).await
    }

    pub async fn delete(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Err(AppError::Validation("Informe ao menos um usuário.".into()));
        }
        self.user_repo.soft_delete(ids).await
    }
}
