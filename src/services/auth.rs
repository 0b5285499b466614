// src/services/auth.rs

use bcrypt::{hash, verify};

use crate::common::error::AppError;
use crate::db::{RoleRepository, UserRepository};
use crate::models::auth::{AuthResponse, LoginPayload, RegisterPayload, User};
use crate::models::role::STATUS_ACTIVE;
use crate::services::permission_service::PermissionService;
use crate::services::token::{REMEMBER_TTL_SECS, SESSION_TTL_SECS, TokenAuthority};

const DEFAULT_ROLE: &str = "viewer";

pub struct IssuedCredential {
    pub token: String,
    pub max_age_secs: i64,
    pub response: AuthResponse,
}

// Fluxo de autenticação: resolve o usuário, valida cargo e senha, computa
// os caminhos permitidos uma única vez e congela tudo na credencial.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    role_repo: RoleRepository,
    catalog: PermissionService,
    tokens: TokenAuthority,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        role_repo: RoleRepository,
        catalog: PermissionService,
        tokens: TokenAuthority,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            catalog,
            tokens,
        }
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<IssuedCredential, AppError> {
        let user = self
            .user_repo
            .find_by_identifier(&payload.username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if user.status != STATUS_ACTIVE {
            return Err(AppError::UserDisabled);
        }

        // Cargo desativado bloqueia o login; credenciais já emitidas não
        // são afetadas; a expiração é a única revogação.
        let role = self.role_repo.find_by_code(&user.role).await?;
        match role {
            Some(r) if r.status == STATUS_ACTIVE => {}
            _ => return Err(AppError::RoleDisabled),
        }

        let password = payload.password.clone();
        let password_hash = user.password_hash.clone();
        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {e}"))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.issue_for(&user, payload.remember).await
    }

    pub async fn register(&self, payload: &RegisterPayload) -> Result<IssuedCredential, AppError> {
        // Novos registros entram sempre como viewer, com o snapshot de
        // permissões do cargo naquele momento.
        let permissions = match self.role_repo.find_by_code(DEFAULT_ROLE).await? {
            Some(role) => role.permissions,
            None => Vec::new(),
        };

        let password = payload.password.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {e}"))??;

        let user = self
            .user_repo
            .insert(
                &payload.username,
                &payload.username,
                &payload.email,
                &password_hash,
                DEFAULT_ROLE,
                &permissions,
            )
            .await?;

        self.issue_for(&user, false).await
    }

    async fn issue_for(&self, user: &User, remember: bool) -> Result<IssuedCredential, AppError> {
        let allowed_paths = self.catalog.allowed_paths_for(&user.permissions).await?;

        let max_age_secs = if remember { REMEMBER_TTL_SECS } else { SESSION_TTL_SECS };

        let token = self.tokens.issue(
            user.id,
            &user.username,
            &user.role,
            user.permissions.clone(),
            allowed_paths.clone(),
            max_age_secs,
        )?;

        Ok(IssuedCredential {
            token,
            max_age_secs,
            response: AuthResponse {
                user_id: user.id,
                username: user.username.clone(),
                role: user.role.clone(),
                allowed_paths,
            },
        })
    }
}
