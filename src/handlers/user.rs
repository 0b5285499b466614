// src/handlers/user.rs

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
    models::auth::{
        CreateUserPayload, DeleteUsersPayload, UpdatePasswordPayload, UpdateUserPayload, User,
        UserListResponse,
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
pub struct UserListQuery {
    pub username: Option<String>,
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(UserListQuery),
    responses((status = 200, description = "Lista de usuários", body = UserListResponse)),
    security(("credential_cookie" = []))
)]
pub async fn list(
    State(app_state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (list, total) = app_state
        .user_service
        .list(
            query.username.as_deref(),
            query.status.as_deref(),
            query.page.max(1),
            query.page_size.clamp(1, 100),
        )
        .await?;

    Ok(Json(UserListResponse { list, total }))
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado com o snapshot de permissões do cargo", body = User),
        (status = 409, description = "Usuário ou e-mail já existe")
    ),
    security(("credential_cookie" = []))
)]
pub async fn create(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let user = app_state
        .audit
        .record(
            "USER",
            "CREATE",
            "Criação de usuário",
            &ctx,
            json!({ "username": payload.username.clone(), "role": payload.role.clone() }),
            || async { app_state.user_service.create(&payload).await },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

// PUT /api/users
#[utoipa::path(
    put,
    path = "/api/users",
    tag = "Users",
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado; atribuição de cargo refaz o snapshot", body = User),
        (status = 404, description = "Usuário ou cargo não encontrado")
    ),
    security(("credential_cookie" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let user = app_state
        .audit
        .record(
            "USER",
            "UPDATE",
            "Atualização de usuário",
            &ctx,
            json!({ "id": payload.id, "role": payload.role.clone(), "status": payload.status.clone() }),
            || async { app_state.user_service.update(&payload).await },
        )
        .await?;

    Ok(Json(user))
}

// PUT /api/users/password
#[utoipa::path(
    put,
    path = "/api/users/password",
    tag = "Users",
    request_body = UpdatePasswordPayload,
    responses((status = 200, description = "Senha redefinida")),
    security(("credential_cookie" = []))
)]
pub async fn update_password(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<UpdatePasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    // A nova senha fica fora da trilha
    app_state
        .audit
        .record(
            "USER",
            "UPDATE",
            "Redefinição de senha",
            &ctx,
            json!({ "id": payload.id }),
            || async {
                app_state
                    .user_service
                    .update_password(payload.id, &payload.password)
                    .await
            },
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}

// DELETE /api/users
#[utoipa::path(
    delete,
    path = "/api/users",
    tag = "Users",
    request_body = DeleteUsersPayload,
    responses((status = 200, description = "Usuários removidos (soft-delete)")),
    security(("credential_cookie" = []))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<DeleteUsersPayload>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let affected = app_state
        .audit
        .record(
            "USER",
            "DELETE",
            "Remoção de usuários",
            &ctx,
            json!({ "ids": payload.ids.clone() }),
            || async { app_state.user_service.delete(&payload.ids).await },
        )
        .await?;

    Ok(Json(json!({ "affected": affected })))
}
