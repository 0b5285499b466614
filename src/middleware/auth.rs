// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::Identity,
    services::audit::AuditTrail,
};

pub const TOKEN_COOKIE: &str = "token";

// Rotas públicas, liberadas antes de qualquer trabalho com credencial.
const PUBLIC_PREFIXES: &[&str] = &[
    "/api/health",
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/logout",
    "/swagger-ui",
    "/api-docs",
];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

// Semântica de prefixo proposital: uma entrada `/api/contents` autoriza
// `/api/contents/{id}` para qualquer id, sem uma entrada por recurso.
pub fn is_path_allowed(path: &str, allowed_paths: &[String]) -> bool {
    allowed_paths
        .iter()
        .any(|p| !p.is_empty() && path.starts_with(p.as_str()))
}

// O gate de autorização. Sem credencial válida: redireciona para o login.
// Credencial válida sem rota liberada: "forbidden", desfecho distinto de
// "não autenticado".
pub async fn authorization_gate(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    if is_public_path(&path) {
        return next.run(request).await;
    }

    let claims = jar
        .get(TOKEN_COOKIE)
        .and_then(|cookie| app_state.tokens.verify(cookie.value()));

    let Some(claims) = claims else {
        return Redirect::to("/auth/login").into_response();
    };

    if !is_path_allowed(&path, &claims.allowed_paths) {
        tracing::warn!("Permissão insuficiente, acesso negado: {path}");
        return AppError::Forbidden.into_response();
    }

    // Identidade resolvida só da credencial; nada é rebuscado do banco
    request.extensions_mut().insert(CurrentUser(Identity {
        user_id: claims.sub,
        username: claims.username,
        role: claims.role,
        permissions: claims.permissions,
    }));

    next.run(request).await
}

// Extrator para obter a identidade autenticada diretamente nos handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

// Metadados de transporte para a trilha de auditoria.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub ip: String,
}

impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok());

        Ok(RequestMeta {
            ip: AuditTrail::client_ip(forwarded),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, middleware as axum_middleware, routing::get};
    use tower::ServiceExt;

    const SECRET: &str = "segredo-de-teste";

    fn app() -> (Router, AppState) {
        let state = AppState::for_tests(SECRET);
        let router = Router::new()
            .route("/api/health", get(|| async { "OK" }))
            .route("/api/contents/{id}", get(|| async { "conteudo" }))
            .route("/api/logs", get(|| async { "logs" }))
            .layer(axum_middleware::from_fn_with_state(
                state.clone(),
                authorization_gate,
            ))
            .with_state(state.clone());
        (router, state)
    }

    fn cookie_for(state: &AppState, allowed_paths: Vec<String>) -> String {
        let token = state
            .tokens
            .issue(
                uuid::Uuid::new_v4(),
                "maria",
                "editor",
                vec![],
                allowed_paths,
                3600,
            )
            .unwrap();
        format!("{TOKEN_COOKIE}={token}")
    }

    #[test]
    fn prefix_match_covers_dynamic_segments() {
        let allowed = vec!["/api/contents/preview".to_string()];
        assert!(is_path_allowed("/api/contents/preview/abc123", &allowed));
        assert!(!is_path_allowed("/api/contents/list", &allowed));
        assert!(!is_path_allowed("/api/logs", &allowed));
    }

    #[test]
    fn empty_entries_never_match() {
        assert!(!is_path_allowed("/api/logs", &[String::new()]));
        assert!(!is_path_allowed("/api/logs", &[]));
    }

    #[tokio::test]
    async fn public_routes_bypass_the_gate() {
        let (router, _) = app();
        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_credential_redirects_to_login() {
        let (router, _) = app();
        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/logs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()["location"], "/auth/login");
    }

    #[tokio::test]
    async fn allowed_prefix_grants_nested_path() {
        let (router, state) = app();
        let cookie = cookie_for(&state, vec!["/api/contents".to_string()]);
        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/contents/abc123")
                    .header("cookie", cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unlisted_path_is_forbidden_not_redirected() {
        let (router, state) = app();
        let cookie = cookie_for(&state, vec!["/api/contents".to_string()]);
        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/logs")
                    .header("cookie", cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn garbage_token_counts_as_unauthenticated() {
        let (router, _) = app();
        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/logs")
                    .header("cookie", format!("{TOKEN_COOKIE}=nao-e-um-jwt"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_redirection());
    }
}
