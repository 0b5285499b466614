// src/models/role.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_DISABLED: &str = "disabled";

// O que sai do banco (tabela roles).
// O cargo é dono do seu conjunto de códigos de permissão; usuários carregam
// uma cópia tirada no momento da atribuição, nunca uma referência viva.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,

    #[schema(example = "Editor")]
    pub name: String,

    #[schema(example = "editor")]
    pub code: String,

    pub description: String,

    #[schema(example = json!(["content:create", "content:update"]))]
    pub permissions: Vec<String>,

    #[schema(example = "active")]
    pub status: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O código é obrigatório."))]
    pub code: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolePayload {
    pub id: Uuid,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O código é obrigatório."))]
    pub code: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleStatusPayload {
    pub id: Uuid,

    #[schema(example = "disabled")]
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteRolesPayload {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleListResponse {
    pub list: Vec<Role>,
    pub total: i64,
}
