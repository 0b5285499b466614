// src/handlers/role.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{CurrentUser, RequestMeta},
    models::role::{
        CreateRolePayload, DeleteRolesPayload, Role, RoleListResponse, UpdateRolePayload,
        UpdateRoleStatusPayload,
    },
    services::audit::AuditContext,
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
pub struct RoleListQuery {
    pub keywords: Option<String>,
    pub status: Option<String>,
    // options=all devolve a lista completa, sem paginação
    pub options: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

// GET /api/roles
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "Roles",
    params(RoleListQuery),
    responses((status = 200, description = "Lista de cargos", body = RoleListResponse)),
    security(("credential_cookie" = []))
)]
pub async fn list(
    State(app_state): State<AppState>,
    Query(query): Query<RoleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    if query.options.as_deref() == Some("all") {
        let list = app_state.role_service.list_all().await?;
        let total = list.len() as i64;
        return Ok(Json(RoleListResponse { list, total }));
    }

    let (list, total) = app_state
        .role_service
        .list(
            query.keywords.as_deref(),
            query.status.as_deref(),
            query.page.max(1),
            query.page_size.clamp(1, 100),
        )
        .await?;

    Ok(Json(RoleListResponse { list, total }))
}

// POST /api/roles
#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "Roles",
    request_body = CreateRolePayload,
    responses(
        (status = 201, description = "Cargo criado", body = Role),
        (status = 409, description = "Código já existe")
    ),
    security(("credential_cookie" = []))
)]
pub async fn create(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let role = app_state
        .audit
        .record(
            "ROLE",
            "CREATE",
            "Criação de cargo",
            &ctx,
            json!({ "code": payload.code.clone(), "permissions": payload.permissions.clone() }),
            || async { app_state.role_service.create(&payload).await },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(role)))
}

// PUT /api/roles
#[utoipa::path(
    put,
    path = "/api/roles",
    tag = "Roles",
    request_body = UpdateRolePayload,
    responses(
        (status = 200, description = "Cargo atualizado", body = Role),
        (status = 404, description = "Cargo não encontrado")
    ),
    security(("credential_cookie" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let role = app_state
        .audit
        .record(
            "ROLE",
            "UPDATE",
            "Atualização de cargo",
            &ctx,
            json!({ "id": payload.id, "code": payload.code.clone() }),
            || async { app_state.role_service.update(&payload).await },
        )
        .await?;

    Ok(Json(role))
}

// PUT /api/roles/status
#[utoipa::path(
    put,
    path = "/api/roles/status",
    tag = "Roles",
    request_body = UpdateRoleStatusPayload,
    responses((status = 200, description = "Status do cargo atualizado", body = Role)),
    security(("credential_cookie" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<UpdateRoleStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let role = app_state
        .audit
        .record(
            "ROLE",
            "UPDATE",
            "Mudança de status de cargo",
            &ctx,
            json!({ "id": payload.id, "status": payload.status.clone() }),
            || async {
                app_state
                    .role_service
                    .update_status(payload.id, &payload.status)
                    .await
            },
        )
        .await?;

    Ok(Json(role))
}

// DELETE /api/roles
#[utoipa::path(
    delete,
    path = "/api/roles",
    tag = "Roles",
    request_body = DeleteRolesPayload,
    responses((status = 200, description = "Cargos removidos (soft-delete)")),
    security(("credential_cookie" = []))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<DeleteRolesPayload>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let affected = app_state
        .audit
        .record(
            "ROLE",
            "DELETE",
            "Remoção de cargos",
            &ctx,
            json!({ "ids": payload.ids.clone() }),
            || async { app_state.role_service.delete(&payload.ids).await },
        )
        .await?;

    Ok(Json(json!({ "affected": affected })))
}
