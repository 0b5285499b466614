// src/handlers/permission.rs

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
    models::permission::{
        CreatePermissionPayload, DeletePermissionsPayload, PermissionNode, PermissionTreeNode,
        UpdatePermissionPayload,
    },
    services::audit::AuditContext,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct TreeQuery {
    // kind=menu devolve só a árvore de navegação
    pub kind: Option<String>,
}

// GET /api/permissions
#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "Permissions",
    params(TreeQuery),
    responses((status = 200, description = "Floresta compilada do catálogo", body = Vec<PermissionTreeNode>)),
    security(("credential_cookie" = []))
)]
pub async fn list_tree(
    State(app_state): State<AppState>,
    Query(query): Query<TreeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let menu_only = query.kind.as_deref() == Some("menu");
    let tree = app_state.permission_service.tree(menu_only).await?;
    Ok(Json(json!({ "list": tree })))
}

// GET /api/permissions/buttons
#[utoipa::path(
    get,
    path = "/api/permissions/buttons",
    tag = "Permissions",
    responses((status = 200, description = "Lista plana dos nós de botão", body = Vec<PermissionNode>)),
    security(("credential_cookie" = []))
)]
pub async fn list_buttons(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let buttons = app_state.permission_service.button_list().await?;
    Ok(Json(json!({ "list": buttons })))
}

// POST /api/permissions
#[utoipa::path(
    post,
    path = "/api/permissions",
    tag = "Permissions",
    request_body = CreatePermissionPayload,
    responses(
        (status = 201, description = "Permissão criada", body = PermissionNode),
        (status = 409, description = "Código já existe")
    ),
    security(("credential_cookie" = []))
)]
pub async fn create(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<CreatePermissionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let node = app_state
        .audit
        .record(
            "PERMISSION",
            "CREATE",
            "Criação de permissão",
            &ctx,
            json!({ "code": payload.code.clone(), "kind": payload.kind }),
            || async { app_state.permission_service.create(&payload).await },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(node)))
}

// PUT /api/permissions
#[utoipa::path(
    put,
    path = "/api/permissions",
    tag = "Permissions",
    request_body = UpdatePermissionPayload,
    responses(
        (status = 200, description = "Permissão atualizada", body = PermissionNode),
        (status = 404, description = "Permissão não encontrada")
    ),
    security(("credential_cookie" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<UpdatePermissionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let node = app_state
        .audit
        .record(
            "PERMISSION",
            "UPDATE",
            "Atualização de permissão",
            &ctx,
            json!({ "id": payload.id, "code": payload.code.clone() }),
            || async { app_state.permission_service.update(&payload).await },
        )
        .await?;

    Ok(Json(node))
}

// DELETE /api/permissions
#[utoipa::path(
    delete,
    path = "/api/permissions",
    tag = "Permissions",
    request_body = DeletePermissionsPayload,
    responses((status = 200, description = "Permissões removidas (soft-delete)")),
    security(("credential_cookie" = []))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<DeletePermissionsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let affected = app_state
        .audit
        .record(
            "PERMISSION",
            "DELETE",
            "Remoção de permissões",
            &ctx,
            json!({ "ids": payload.ids.clone() }),
            || async { app_state.permission_service.delete(&payload.ids).await },
        )
        .await?;

    Ok(Json(json!({ "affected": affected })))
}
