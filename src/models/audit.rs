// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAIL: &str = "fail";

// Entrada da trilha de auditoria, append-only. Gravada para toda operação
// mutante, com sucesso ou falha.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Uuid,

    #[schema(example = "CONTENT")]
    pub module: String,

    #[schema(example = "UPDATE")]
    pub action: String,

    #[schema(example = "Revisão de artigo")]
    pub description: String,

    #[schema(example = "maria")]
    pub operator: String,

    pub ip: String,
    pub location: String,

    #[schema(example = "success")]
    pub status: String,

    pub duration_ms: i64,
    pub params: String,
    pub error_msg: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogListResponse {
    pub list: Vec<AuditLogEntry>,
    pub total: i64,
}
