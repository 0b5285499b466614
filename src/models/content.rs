// src/models/content.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// Estados do ciclo de vida de um artigo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Draft,
    Pending,
    Published,
    Archived,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Pending => "pending",
            ContentStatus::Published => "published",
            ContentStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "draft" => Ok(ContentStatus::Draft),
            "pending" => Ok(ContentStatus::Pending),
            "published" => Ok(ContentStatus::Published),
            "archived" => Ok(ContentStatus::Archived),
            other => Err(AppError::Validation(format!(
                "Status de artigo desconhecido: {other}"
            ))),
        }
    }

    // Tabela de transições legais. `archived` é terminal.
    pub fn allowed_next(&self) -> &'static [ContentStatus] {
        match self {
            // Rascunho só pode ser enviado para revisão
            ContentStatus::Draft => &[ContentStatus::Pending],
            // Pendente pode ser aprovado ou devolvido a rascunho
            ContentStatus::Pending => &[ContentStatus::Published, ContentStatus::Draft],
            // Publicado só pode ser arquivado
            ContentStatus::Published => &[ContentStatus::Archived],
            ContentStatus::Archived => &[],
        }
    }

    pub fn can_transition(&self, to: ContentStatus) -> bool {
        self.allowed_next().contains(&to)
    }
}

// Valida uma transição; transição fora da tabela é erro de estado e
// deixa o registro intocado.
pub fn validate_transition(from: ContentStatus, to: ContentStatus) -> Result<(), AppError> {
    if from.can_transition(to) {
        return Ok(());
    }
    Err(AppError::State(format!(
        "Transição de status ilegal: {} -> {}",
        from.as_str(),
        to.as_str()
    )))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approved,
    Rejected,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Approved => "approved",
            ReviewAction::Rejected => "rejected",
        }
    }
}

pub const REVIEW_NOT_REVIEWED: &str = "not_reviewed";
pub const REVIEW_APPROVED: &str = "approved";
pub const REVIEW_REJECTED: &str = "rejected";

// O que sai do banco (tabela contents). `author_id` nunca muda após a
// criação; `updater_id` muda a cada edição.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub category: String,
    pub cover: String,

    #[schema(example = "pending")]
    pub status: String,

    pub author_id: Uuid,
    pub updater_id: Option<Uuid>,

    #[schema(example = "not_reviewed")]
    pub review_status: String,

    pub last_reviewed_by: Option<Uuid>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Item de listagem com os dados de exibição de autor e atualizador já
// resolvidos no JOIN.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentListItem {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub cover: String,
    pub status: String,
    pub review_status: String,
    pub rejection_reason: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub updater_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentListResponse {
    pub list: Vec<ContentListItem>,
    pub total: i64,
}

// Detalhe de um artigo com autor e atualizador resolvidos.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetail {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub category: String,
    pub cover: String,
    pub status: String,
    pub review_status: String,
    pub rejection_reason: String,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_role: String,
    pub updater_id: Option<Uuid>,
    pub updater_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Faixa de visibilidade da listagem, decidida uma única vez a partir da
// identidade do chamador (predicado único, não duplicado por endpoint).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentVisibility {
    // content:viewAll: tudo; arquivados só aparecem com filtro explícito
    All,
    // content:viewPublished: os próprios artigos mais os publicados alheios
    OwnPlusPublished(Uuid),
    // Sem capacidade especial: apenas publicados
    PublishedOnly,
}

// Registro de revisão, append-only: uma linha por decisão.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: Uuid,
    pub content_id: Uuid,
    pub reviewer_id: Uuid,

    #[schema(example = "rejected")]
    pub action: String,

    pub reason: String,
    pub previous_status: String,
    pub new_status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentPayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,

    #[validate(length(min = 1, message = "O corpo do artigo é obrigatório."))]
    pub body: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[serde(default)]
    pub cover: String,

    // Honrado apenas para quem detém content:publish
    pub status: Option<ContentStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentPayload {
    pub id: Uuid,

    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,

    #[validate(length(min = 1, message = "O corpo do artigo é obrigatório."))]
    pub body: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[serde(default)]
    pub cover: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub action: ReviewAction,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteContentsPayload {
    pub ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_only_goes_to_pending() {
        assert!(ContentStatus::Draft.can_transition(ContentStatus::Pending));
        assert!(!ContentStatus::Draft.can_transition(ContentStatus::Published));
        assert!(!ContentStatus::Draft.can_transition(ContentStatus::Archived));
    }

    #[test]
    fn pending_goes_to_published_or_back_to_draft() {
        assert!(ContentStatus::Pending.can_transition(ContentStatus::Published));
        assert!(ContentStatus::Pending.can_transition(ContentStatus::Draft));
        assert!(!ContentStatus::Pending.can_transition(ContentStatus::Archived));
    }

    #[test]
    fn archived_is_terminal() {
        for to in [
            ContentStatus::Draft,
            ContentStatus::Pending,
            ContentStatus::Published,
            ContentStatus::Archived,
        ] {
            assert!(!ContentStatus::Archived.can_transition(to));
        }
    }

    #[test]
    fn illegal_transition_is_a_state_error() {
        let err = validate_transition(ContentStatus::Published, ContentStatus::Draft).unwrap_err();
        assert!(matches!(err, AppError::State(_)));
        assert!(validate_transition(ContentStatus::Published, ContentStatus::Archived).is_ok());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for s in ["draft", "pending", "published", "archived"] {
            assert_eq!(ContentStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(ContentStatus::parse("review").is_err());
    }
}
