// src/models/permission.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Códigos de capacidade consumidos pelas regras de negócio.
// O code é a chave de negócio estável; ids internos nunca saem do banco.
pub mod codes {
    pub const CONTENT_PUBLISH: &str = "content:publish";
    pub const CONTENT_REVIEW: &str = "content:review";
    pub const CONTENT_SUBMIT_ALL: &str = "content:submitAll";
    pub const CONTENT_MANAGE: &str = "content:manage";
    pub const CONTENT_VIEW_ALL: &str = "content:viewAll";
    pub const CONTENT_VIEW_PUBLISHED: &str = "content:viewPublished";
    pub const USER_MANAGE: &str = "user:manage";
}

// Tipo do nó: menus viram rotas no token, botões são checados por code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PermissionKind {
    Menu,
    Button,
}

impl PermissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionKind::Menu => "menu",
            PermissionKind::Button => "button",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "menu" => Some(PermissionKind::Menu),
            "button" => Some(PermissionKind::Button),
            _ => None,
        }
    }
}

// O que sai do banco (tabela permissions)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionNode {
    pub id: Uuid,

    #[schema(example = "Lista de conteúdos")]
    pub name: String,

    #[schema(example = "content:list")]
    pub code: String,

    #[schema(example = "menu")]
    pub kind: String,

    // Referência ao pai pela chave de negócio, não pelo id interno
    pub parent_code: Option<String>,

    #[schema(example = "/api/contents")]
    pub path: Option<String>,

    pub parent_path: Option<String>,
    pub icon: Option<String>,
    pub sort: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Nó da floresta compilada. `children` some quando vazio, para que
// folhas não carreguem um array vazio de enfeite.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionTreeNode {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub kind: String,
    pub icon: Option<String>,
    // Botões não têm ordenação nem rota próprias
    pub sort: Option<i32>,
    pub path: Option<String>,
    pub parent_path: Option<String>,
    pub parent_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<PermissionTreeNode>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Lista de conteúdos")]
    pub name: String,

    #[validate(length(min = 1, message = "O código é obrigatório."))]
    #[schema(example = "content:list")]
    pub code: String,

    #[schema(example = "menu")]
    pub kind: PermissionKind,

    pub parent_code: Option<String>,

    #[schema(example = "/api/contents")]
    pub path: Option<String>,

    pub parent_path: Option<String>,
    pub icon: Option<String>,

    #[serde(default)]
    pub sort: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionPayload {
    pub id: Uuid,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O código é obrigatório."))]
    pub code: String,

    pub kind: PermissionKind,
    pub parent_code: Option<String>,
    pub path: Option<String>,
    pub parent_path: Option<String>,
    pub icon: Option<String>,

    #[serde(default)]
    pub sort: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeletePermissionsPayload {
    pub ids: Vec<Uuid>,
}
