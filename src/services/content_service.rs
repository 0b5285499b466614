// src/services/content_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::ContentRepository;
use crate::models::auth::Identity;
use crate::models::content::{
    Content, ContentDetail, ContentListItem, ContentStatus, ContentVisibility,
    CreateContentPayload, REVIEW_APPROVED, REVIEW_NOT_REVIEWED, REVIEW_REJECTED, ReviewAction,
    ReviewRecord, UpdateContentPayload, validate_transition,
};
use crate::models::permission::codes;

// Motor do fluxo editorial. Toda chamada recebe a identidade explícita do
// chamador; o banco é o único árbitro de consistência e a transação de
// revisão é a unidade atômica status + registro.
#[derive(Clone)]
pub struct ContentService {
    repo: ContentRepository,
    pool: PgPool,
}

impl ContentService {
    pub fn new(repo: ContentRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn create(
        &self,
        identity: &Identity,
        payload: &CreateContentPayload,
    ) -> Result<Content, AppError> {
        if self.repo.title_taken(&payload.title, None).await? {
            return Err(AppError::Conflict("Já existe um artigo com esse título.".into()));
        }

        let status = initial_status(
            payload.status,
            identity.has_permission(codes::CONTENT_PUBLISH),
        );

        self.repo
            .insert(
                &payload.title,
                &payload.body,
                &payload.category,
                &payload.cover,
                status.as_str(),
                identity.user_id,
                REVIEW_NOT_REVIEWED,
            )
            .await
    }

    pub async fn update(
        &self,
        identity: &Identity,
        payload: &UpdateContentPayload,
    ) -> Result<Content, AppError> {
        if self.repo.title_taken(&payload.title, Some(payload.id)).await? {
            return Err(AppError::Conflict("Já existe um artigo com esse título.".into()));
        }

        // O autor original é preservado; só o atualizador muda.
        self.repo
            .update(
                payload.id,
                &payload.title,
                &payload.body,
                &payload.category,
                &payload.cover,
                identity.user_id,
            )
            .await
    }

    pub async fn submit_for_review(
        &self,
        identity: &Identity,
        content_id: Uuid,
    ) -> Result<(), AppError> {
        let content = self
            .repo
            .find_by_id(content_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Artigo não encontrado.".into()))?;

        // Só o autor envia o próprio artigo, salvo quem pode enviar todos
        if content.author_id != identity.user_id
            && !identity.has_permission(codes::CONTENT_SUBMIT_ALL)
        {
            return Err(AppError::Permission(
                "Só é possível enviar os próprios artigos para revisão.".into(),
            ));
        }

        let current = ContentStatus::parse(&content.status)?;
        if current != ContentStatus::Draft {
            return Err(AppError::State(format!(
                "Só rascunhos podem ser enviados para revisão; status atual: {}",
                content.status
            )));
        }

        let rows = self
            .repo
            .transition_status(
                &self.pool,
                content_id,
                ContentStatus::Draft.as_str(),
                ContentStatus::Pending.as_str(),
                REVIEW_NOT_REVIEWED,
                None,
                None,
                // O motivo da última rejeição fica no histórico do registro
                &content.rejection_reason,
            )
            .await?;

        if rows == 0 {
            return Err(AppError::State(
                "O artigo mudou de status antes do envio; recarregue e tente de novo.".into(),
            ));
        }
        Ok(())
    }

    // Revisão em uma unidade atômica: trava a linha, confere que o status
    // ainda é `pending`, aplica a transição e anexa o registro de revisão
    // na mesma transação: os dois commits juntos ou nenhum. O perdedor de
    // uma corrida enxerga o status já transicionado e falha limpo.
    pub async fn review(
        &self,
        identity: &Identity,
        content_id: Uuid,
        action: ReviewAction,
        reason: Option<&str>,
    ) -> Result<(), AppError> {
        if !identity.has_permission(codes::CONTENT_REVIEW) {
            return Err(AppError::Permission("Sem permissão para revisar artigos.".into()));
        }

        let reason = reason.unwrap_or("").trim();
        if action == ReviewAction::Rejected && reason.is_empty() {
            return Err(AppError::Validation(
                "Informe o motivo ao rejeitar um artigo.".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let content = self
            .repo
            .lock_for_review(&mut *tx, content_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Artigo não encontrado.".into()))?;

        let current = ContentStatus::parse(&content.status)?;
        if current != ContentStatus::Pending {
            return Err(AppError::State(format!(
                "Só artigos pendentes podem ser revisados; status atual: {}",
                content.status
            )));
        }

        let (new_status, review_status) = match action {
            ReviewAction::Approved => (ContentStatus::Published, REVIEW_APPROVED),
            ReviewAction::Rejected => (ContentStatus::Draft, REVIEW_REJECTED),
        };
        validate_transition(current, new_status)?;

        let rows = self
            .repo
            .transition_status(
                &mut *tx,
                content_id,
                ContentStatus::Pending.as_str(),
                new_status.as_str(),
                review_status,
                Some(identity.user_id),
                Some(Utc::now()),
                reason,
            )
            .await?;

        if rows == 0 {
            return Err(AppError::Conflict(
                "O artigo está sendo revisado por outro usuário.".into(),
            ));
        }

        self.repo
            .insert_review_record(
                &mut *tx,
                content_id,
                identity.user_id,
                action.as_str(),
                reason,
                current.as_str(),
                new_status.as_str(),
            )
            .await?;

        tx.commit()
            .await
            .map_err(|_| AppError::Transaction("Falha ao concluir a revisão; tente novamente.".into()))?;

        Ok(())
    }

    // Arquivamento é ação administrativa; `archived` é terminal.
    pub async fn archive(&self, identity: &Identity, content_id: Uuid) -> Result<(), AppError> {
        if !identity.has_permission(codes::CONTENT_MANAGE) {
            return Err(AppError::Permission("Sem permissão para arquivar artigos.".into()));
        }

        let content = self
            .repo
            .find_by_id(content_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Artigo não encontrado.".into()))?;

        let current = ContentStatus::parse(&content.status)?;
        validate_transition(current, ContentStatus::Archived)?;

        let rows = self
            .repo
            .transition_status(
                &self.pool,
                content_id,
                current.as_str(),
                ContentStatus::Archived.as_str(),
                &content.review_status,
                None,
                None,
                &content.rejection_reason,
            )
            .await?;

        if rows == 0 {
            return Err(AppError::State(
                "O artigo mudou de status antes do arquivamento.".into(),
            ));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        identity: &Identity,
        title: Option<&str>,
        category: Option<&str>,
        status: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<ContentListItem>, i64), AppError> {
        let visibility = visibility_for(identity);
        self.repo
            .list(visibility, title, category, status, page, page_size)
            .await
    }

    pub async fn detail(&self, content_id: Uuid) -> Result<ContentDetail, AppError> {
        self.repo
            .find_detail(content_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Artigo não encontrado.".into()))
    }

    pub async fn review_history(&self, content_id: Uuid) -> Result<Vec<ReviewRecord>, AppError> {
        self.repo.list_reviews(content_id).await
    }

    pub async fn delete(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Err(AppError::Validation("Informe ao menos um artigo.".into()));
        }
        self.repo.soft_delete(ids).await
    }
}

// Status inicial na criação: quem detém content:publish tem o valor
// pedido honrado (limitado aos estados válidos); os demais nunca criam
// nada além de rascunho ou pendente.
pub fn initial_status(requested: Option<ContentStatus>, can_publish: bool) -> ContentStatus {
    if can_publish {
        return requested.unwrap_or(ContentStatus::Draft);
    }
    match requested {
        Some(ContentStatus::Draft) => ContentStatus::Draft,
        _ => ContentStatus::Pending,
    }
}

// Faixa de visibilidade da listagem, decidida uma única vez por chamada.
// viewAll prevalece quando as duas capacidades estão presentes.
pub fn visibility_for(identity: &Identity) -> ContentVisibility {
    if identity.has_permission(codes::CONTENT_VIEW_ALL) {
        ContentVisibility::All
    } else if identity.has_permission(codes::CONTENT_VIEW_PUBLISHED) {
        ContentVisibility::OwnPlusPublished(identity.user_id)
    } else {
        ContentVisibility::PublishedOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_with(perms: &[&str]) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            username: "maria".into(),
            role: "editor".into(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn publisher_gets_requested_status() {
        assert_eq!(
            initial_status(Some(ContentStatus::Published), true),
            ContentStatus::Published
        );
        assert_eq!(initial_status(None, true), ContentStatus::Draft);
    }

    #[test]
    fn non_publisher_is_clamped_to_draft_or_pending() {
        assert_eq!(
            initial_status(Some(ContentStatus::Published), false),
            ContentStatus::Pending
        );
        assert_eq!(
            initial_status(Some(ContentStatus::Archived), false),
            ContentStatus::Pending
        );
        assert_eq!(
            initial_status(Some(ContentStatus::Draft), false),
            ContentStatus::Draft
        );
        assert_eq!(initial_status(None, false), ContentStatus::Pending);
    }

    #[test]
    fn view_all_wins_over_view_published() {
        let id = identity_with(&["content:viewAll", "content:viewPublished"]);
        assert_eq!(visibility_for(&id), ContentVisibility::All);
    }

    #[test]
    fn view_published_sees_own_plus_published() {
        let id = identity_with(&["content:viewPublished"]);
        assert_eq!(
            visibility_for(&id),
            ContentVisibility::OwnPlusPublished(id.user_id)
        );
    }

    #[test]
    fn no_capability_sees_published_only() {
        let id = identity_with(&[]);
        assert_eq!(visibility_for(&id), ContentVisibility::PublishedOnly);
    }
}
