// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{CurrentUser, RequestMeta, TOKEN_COOKIE},
    models::auth::{AuthResponse, LoginPayload, RegisterPayload},
    services::audit::AuditContext,
};

fn credential_cookie(token: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        // Apenas HTTPS fora do build de desenvolvimento
        .secure(!cfg!(debug_assertions))
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login efetuado, cookie de credencial emitido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Usuário ou cargo desativado")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    meta: RequestMeta,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ctx = AuditContext {
        operator: payload.username.clone(),
        ip: meta.ip,
    };

    // A senha nunca entra na trilha de auditoria
    let issued = app_state
        .audit
        .record(
            "AUTH",
            "LOGIN",
            "Login de usuário",
            &ctx,
            json!({ "username": payload.username.clone(), "remember": payload.remember }),
            || async { app_state.auth_service.login(&payload).await },
        )
        .await?;

    let jar = jar.add(credential_cookie(issued.token, issued.max_age_secs));
    Ok((jar, Json(issued.response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Usuário registrado como viewer", body = AuthResponse),
        (status = 409, description = "Usuário ou e-mail já existe")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    meta: RequestMeta,
    jar: CookieJar,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ctx = AuditContext {
        operator: payload.username.clone(),
        ip: meta.ip,
    };

    let issued = app_state
        .audit
        .record(
            "AUTH",
            "REGISTER",
            "Registro de usuário",
            &ctx,
            json!({ "username": payload.username.clone(), "email": payload.email.clone() }),
            || async { app_state.auth_service.register(&payload).await },
        )
        .await?;

    let jar = jar.add(credential_cookie(issued.token, issued.max_age_secs));
    Ok((axum::http::StatusCode::CREATED, jar, Json(issued.response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Cookie de credencial removido"))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    meta: RequestMeta,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    // A rota é pública; o operador sai da credencial quando ela existir
    let operator = jar
        .get(TOKEN_COOKIE)
        .and_then(|c| app_state.tokens.verify(c.value()))
        .map(|claims| claims.username)
        .unwrap_or_else(|| "desconhecido".to_string());

    let ctx = AuditContext { operator, ip: meta.ip };

    app_state
        .audit
        .record("AUTH", "LOGOUT", "Logout de usuário", &ctx, json!({}), || async {
            Ok(())
        })
        .await?;

    let jar = jar.remove(Cookie::build((TOKEN_COOKIE, "")).path("/").build());
    Ok((jar, Json(json!({ "success": true }))))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses((status = 200, description = "Identidade resolvida da credencial")),
    security(("credential_cookie" = []))
)]
pub async fn get_me(CurrentUser(identity): CurrentUser) -> impl IntoResponse {
    // Só o que a credencial carrega; nada é rebuscado do banco
    Json(json!({
        "userId": identity.user_id,
        "username": identity.username,
        "role": identity.role,
        "permissions": identity.permissions,
    }))
}
