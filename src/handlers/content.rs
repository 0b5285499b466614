// src/handlers/content.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{CurrentUser, RequestMeta},
    models::content::{
        Content, ContentDetail, ContentListResponse, CreateContentPayload, DeleteContentsPayload,
        ReviewPayload, ReviewRecord, UpdateContentPayload,
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
pub struct ContentListQuery {
    pub title: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

// GET /api/contents
#[utoipa::path(
    get,
    path = "/api/contents",
    tag = "Contents",
    params(ContentListQuery),
    responses((status = 200, description = "Lista de artigos visíveis para o chamador", body = ContentListResponse)),
    security(("credential_cookie" = []))
)]
pub async fn list(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Query(query): Query<ContentListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (list, total) = app_state
        .content_service
        .list(
            &identity,
            query.title.as_deref(),
            query.category.as_deref(),
            query.status.as_deref(),
            query.page.max(1),
            query.page_size.clamp(1, 100),
        )
        .await?;

    Ok(Json(ContentListResponse { list, total }))
}

// GET /api/contents/{id}
#[utoipa::path(
    get,
    path = "/api/contents/{id}",
    tag = "Contents",
    params(("id" = Uuid, Path, description = "ID do artigo")),
    responses(
        (status = 200, description = "Detalhe do artigo", body = ContentDetail),
        (status = 404, description = "Artigo não encontrado")
    ),
    security(("credential_cookie" = []))
)]
pub async fn detail(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.content_service.detail(id).await?;
    Ok(Json(detail))
}

// GET /api/contents/{id}/reviews
#[utoipa::path(
    get,
    path = "/api/contents/{id}/reviews",
    tag = "Contents",
    params(("id" = Uuid, Path, description = "ID do artigo")),
    responses((status = 200, description = "Histórico de revisões, da mais recente para a mais antiga", body = Vec<ReviewRecord>)),
    security(("credential_cookie" = []))
)]
pub async fn review_history(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let records = app_state.content_service.review_history(id).await?;
    Ok(Json(json!({ "list": records })))
}

// POST /api/contents
#[utoipa::path(
    post,
    path = "/api/contents",
    tag = "Contents",
    request_body = CreateContentPayload,
    responses(
        (status = 201, description = "Artigo criado; status inicial limitado pelas capacidades do autor", body = Content),
        (status = 409, description = "Título já existe")
    ),
    security(("credential_cookie" = []))
)]
pub async fn create(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<CreateContentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let content = app_state
        .audit
        .record(
            "CONTENT",
            "CREATE",
            "Criação de artigo",
            &ctx,
            json!({ "title": payload.title.clone(), "status": payload.status }),
            || async { app_state.content_service.create(&identity, &payload).await },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(content)))
}

// PUT /api/contents
#[utoipa::path(
    put,
    path = "/api/contents",
    tag = "Contents",
    request_body = UpdateContentPayload,
    responses(
        (status = 200, description = "Artigo atualizado; o autor original é preservado", body = Content),
        (status = 404, description = "Artigo não encontrado")
    ),
    security(("credential_cookie" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<UpdateContentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let content = app_state
        .audit
        .record(
            "CONTENT",
            "UPDATE",
            "Atualização de artigo",
            &ctx,
            json!({ "id": payload.id, "title": payload.title.clone() }),
            || async { app_state.content_service.update(&identity, &payload).await },
        )
        .await?;

    Ok(Json(content))
}

// POST /api/contents/{id}/submit
#[utoipa::path(
    post,
    path = "/api/contents/{id}/submit",
    tag = "Contents",
    params(("id" = Uuid, Path, description = "ID do artigo")),
    responses(
        (status = 200, description = "Artigo enviado para revisão"),
        (status = 400, description = "Artigo não está em rascunho"),
        (status = 403, description = "Chamador não é o autor")
    ),
    security(("credential_cookie" = []))
)]
pub async fn submit_for_review(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    app_state
        .audit
        .record(
            "CONTENT",
            "UPDATE",
            "Envio de artigo para revisão",
            &ctx,
            json!({ "id": id }),
            || async {
                app_state
                    .content_service
                    .submit_for_review(&identity, id)
                    .await
            },
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}

// POST /api/contents/{id}/review
#[utoipa::path(
    post,
    path = "/api/contents/{id}/review",
    tag = "Contents",
    params(("id" = Uuid, Path, description = "ID do artigo")),
    request_body = ReviewPayload,
    responses(
        (status = 200, description = "Revisão aplicada com registro atômico"),
        (status = 400, description = "Artigo não está pendente ou motivo ausente"),
        (status = 409, description = "Artigo sendo revisado por outro usuário")
    ),
    security(("credential_cookie" = []))
)]
pub async fn review(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewPayload>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    app_state
        .audit
        .record(
            "CONTENT",
            "UPDATE",
            "Revisão de artigo",
            &ctx,
            json!({ "id": id, "action": payload.action, "reason": payload.reason.clone() }),
            || async {
                app_state
                    .content_service
                    .review(&identity, id, payload.action, payload.reason.as_deref())
                    .await
            },
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}

// POST /api/contents/{id}/archive
#[utoipa::path(
    post,
    path = "/api/contents/{id}/archive",
    tag = "Contents",
    params(("id" = Uuid, Path, description = "ID do artigo")),
    responses(
        (status = 200, description = "Artigo arquivado (estado terminal)"),
        (status = 400, description = "Artigo não está publicado")
    ),
    security(("credential_cookie" = []))
)]
pub async fn archive(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    app_state
        .audit
        .record(
            "CONTENT",
            "UPDATE",
            "Arquivamento de artigo",
            &ctx,
            json!({ "id": id }),
            || async { app_state.content_service.archive(&identity, id).await },
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}

// DELETE /api/contents
#[utoipa::path(
    delete,
    path = "/api/contents",
    tag = "Contents",
    request_body = DeleteContentsPayload,
    responses((status = 200, description = "Artigos removidos (soft-delete)")),
    security(("credential_cookie" = []))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    meta: RequestMeta,
    Json(payload): Json<DeleteContentsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AuditContext { operator: identity.username.clone(), ip: meta.ip };
    let affected = app_state
        .audit
        .record(
            "CONTENT",
            "DELETE",
            "Remoção de artigos",
            &ctx,
            json!({ "ids": payload.ids.clone() }),
            || async { app_state.content_service.delete(&payload.ids).await },
        )
        .await?;

    Ok(Json(json!({ "affected": affected })))
}
