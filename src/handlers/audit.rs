// src/handlers/audit.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    models::audit::AuditLogListResponse,
};

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub module: Option<String>,
    pub operator: Option<String>,
    // Datas no formato YYYY-MM-DD; o intervalo cobre os dias inteiros
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn parse_day(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Data inválida: {value}")))
}

// GET /api/logs
#[utoipa::path(
    get,
    path = "/api/logs",
    tag = "Logs",
    params(AuditLogQuery),
    responses((status = 200, description = "Trilha de auditoria, da entrada mais recente para a mais antiga", body = AuditLogListResponse)),
    security(("credential_cookie" = []))
)]
pub async fn list(
    State(app_state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let start = match query.start_time.as_deref() {
        Some(raw) => {
            let day = parse_day(raw)?;
            Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).expect("meia-noite válida")))
        }
        None => None,
    };
    let end = match query.end_time.as_deref() {
        Some(raw) => {
            let day = parse_day(raw)?;
            Some(Utc.from_utc_datetime(&day.and_hms_opt(23, 59, 59).expect("fim de dia válido")))
        }
        None => None,
    };

    let (list, total) = app_state
        .audit
        .list(
            query.module.as_deref(),
            query.operator.as_deref(),
            start,
            end,
            query.page.max(1),
            query.page_size.clamp(1, 100),
        )
        .await?;

    Ok(Json(AuditLogListResponse { list, total }))
}
