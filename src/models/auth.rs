// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Representa um usuário vindo do banco de dados.
// `permissions` é a cópia tirada do cargo no momento da atribuição;
// edições no cargo não reescrevem usuários nem credenciais já emitidas.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub nickname: String,
    pub email: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "editor")]
    pub role: String,

    pub permissions: Vec<String>,

    #[schema(example = "active")]
    pub status: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Identidade resolvida da credencial. É passada explicitamente a cada
// chamada de serviço; nenhuma camada lê estado ambiente de requisição.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl Identity {
    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.iter().any(|p| p == code)
    }
}

// Estrutura de dados ("claims") dentro do JWT.
// `allowed_paths` é resolvido uma única vez no login; a expiração do token
// é o único mecanismo de revogação de permissões.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub allowed_paths: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "O usuário não pode ser vazio."))]
    #[schema(example = "maria")]
    pub username: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[serde(default)]
    pub remember: bool,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 1, message = "O usuário não pode ser vazio."))]
    pub username: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
}

// Resposta de autenticação
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
    pub allowed_paths: Vec<String>,
}

// Administração de usuários

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "O usuário não pode ser vazio."))]
    pub username: String,

    #[serde(default)]
    pub nickname: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[validate(length(min = 1, message = "O cargo é obrigatório."))]
    #[schema(example = "editor")]
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub id: Uuid,

    #[serde(default)]
    pub nickname: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 1, message = "O cargo é obrigatório."))]
    pub role: String,

    #[schema(example = "active")]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordPayload {
    pub id: Uuid,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteUsersPayload {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub list: Vec<User>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_checks_permission_by_code() {
        let id = Identity {
            user_id: Uuid::new_v4(),
            username: "maria".into(),
            role: "editor".into(),
            permissions: vec!["content:create".into(), "content:update".into()],
        };
        assert!(id.has_permission("content:create"));
        assert!(!id.has_permission("content:review"));
    }
}
