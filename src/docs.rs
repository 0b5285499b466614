// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Permissions ---
        handlers::permission::list_tree,
        handlers::permission::list_buttons,
        handlers::permission::create,
        handlers::permission::update,
        handlers::permission::delete,

        // --- Roles ---
        handlers::role::list,
        handlers::role::create,
        handlers::role::update,
        handlers::role::update_status,
        handlers::role::delete,

        // --- Users ---
        handlers::user::list,
        handlers::user::create,
        handlers::user::update,
        handlers::user::update_password,
        handlers::user::delete,

        // --- Contents ---
        handlers::content::list,
        handlers::content::detail,
        handlers::content::review_history,
        handlers::content::create,
        handlers::content::update,
        handlers::content::submit_for_review,
        handlers::content::review,
        handlers::content::archive,
        handlers::content::delete,

        // --- Logs ---
        handlers::audit::list,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::RegisterPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::UpdatePasswordPayload,
            models::auth::DeleteUsersPayload,
            models::auth::UserListResponse,

            // --- Permissions ---
            models::permission::PermissionKind,
            models::permission::PermissionNode,
            models::permission::PermissionTreeNode,
            models::permission::CreatePermissionPayload,
            models::permission::UpdatePermissionPayload,
            models::permission::DeletePermissionsPayload,

            // --- Roles ---
            models::role::Role,
            models::role::CreateRolePayload,
            models::role::UpdateRolePayload,
            models::role::UpdateRoleStatusPayload,
            models::role::DeleteRolesPayload,
            models::role::RoleListResponse,

            // --- Contents ---
            models::content::ContentStatus,
            models::content::ReviewAction,
            models::content::Content,
            models::content::ContentListItem,
            models::content::ContentListResponse,
            models::content::ContentDetail,
            models::content::ReviewRecord,
            models::content::CreateContentPayload,
            models::content::UpdateContentPayload,
            models::content::ReviewPayload,
            models::content::DeleteContentsPayload,

            // --- Logs ---
            models::audit::AuditLogEntry,
            models::audit::AuditLogListResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e emissão de credencial"),
        (name = "Permissions", description = "Catálogo de permissões (menus e botões)"),
        (name = "Roles", description = "Cargos e seus conjuntos de permissões"),
        (name = "Users", description = "Administração de usuários"),
        (name = "Contents", description = "Fluxo editorial de conteúdo"),
        (name = "Logs", description = "Trilha de auditoria")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        // A credencial viaja em cookie httpOnly, não em header Authorization
        components.add_security_scheme(
            "credential_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
        );
    }
}
