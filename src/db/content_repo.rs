// src/db/content_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::content::{
    Content, ContentDetail, ContentListItem, ContentVisibility, ReviewRecord,
};

const CONTENT_COLUMNS: &str = "id, title, body, category, cover, status, author_id, updater_id, \
     review_status, last_reviewed_by, last_reviewed_at, rejection_reason, created_at, updated_at";

// Repositório de artigos e registros de revisão. As escritas da transação
// de revisão recebem um Executor genérico para rodarem dentro do mesmo tx.
#[derive(Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Content>, AppError> {
        let content = sqlx::query_as::<_, Content>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM contents WHERE id = $1 AND NOT deleted"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(content)
    }

    pub async fn title_taken(&self, title: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM contents \
                WHERE title = $1 AND NOT deleted AND ($2::uuid IS NULL OR id <> $2) \
            )",
        )
        .bind(title)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    pub async fn insert(
        &self,
        title: &str,
        body: &str,
        category: &str,
        cover: &str,
        status: &str,
        author_id: Uuid,
        review_status: &str,
    ) -> Result<Content, AppError> {
        let content = sqlx::query_as::<_, Content>(&format!(
            "INSERT INTO contents (title, body, category, cover, status, author_id, review_status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(title)
        .bind(body)
        .bind(category)
        .bind(cover)
        .bind(status)
        .bind(author_id)
        .bind(review_status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um artigo com esse título."))?;

        Ok(content)
    }

    // O autor nunca muda; apenas o atualizador é sobrescrito.
    pub async fn update(
        &self,
        id: Uuid,
        title: &str,
        body: &str,
        category: &str,
        cover: &str,
        updater_id: Uuid,
    ) -> Result<Content, AppError> {
        let content = sqlx::query_as::<_, Content>(&format!(
            "UPDATE contents \
             SET title = $2, body = $3, category = $4, cover = $5, updater_id = $6, \
                 updated_at = now() \
             WHERE id = $1 AND NOT deleted \
             RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(id)
        .bind(title)
        .bind(body)
        .bind(category)
        .bind(cover)
        .bind(updater_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um artigo com esse título."))?
        .ok_or_else(|| AppError::NotFound("Artigo não encontrado.".into()))?;

        Ok(content)
    }

    // Tranca a linha dentro da transação de revisão. Quem chegar depois
    // espera o commit do primeiro e enxerga o status já transicionado.
    pub async fn lock_for_review<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Content>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let content = sqlx::query_as::<_, Content>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM contents \
             WHERE id = $1 AND NOT deleted FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(content)
    }

    // Atualização guardada: só transiciona se o status atual ainda for o
    // esperado. rows_affected == 0 significa que outro chamador venceu.
    pub async fn transition_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        expected: &str,
        new_status: &str,
        review_status: &str,
        reviewer_id: Option<Uuid>,
        reviewed_at: Option<DateTime<Utc>>,
        rejection_reason: &str,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE contents \
             SET status = $3, review_status = $4, last_reviewed_by = COALESCE($5, last_reviewed_by), \
                 last_reviewed_at = COALESCE($6, last_reviewed_at), rejection_reason = $7, \
                 updated_at = now() \
             WHERE id = $1 AND status = $2 AND NOT deleted",
        )
        .bind(id)
        .bind(expected)
        .bind(new_status)
        .bind(review_status)
        .bind(reviewer_id)
        .bind(reviewed_at)
        .bind(rejection_reason)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert_review_record<'e, E>(
        &self,
        executor: E,
        content_id: Uuid,
        reviewer_id: Uuid,
        action: &str,
        reason: &str,
        previous_status: &str,
        new_status: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO review_records \
                 (content_id, reviewer_id, action, reason, previous_status, new_status) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(content_id)
        .bind(reviewer_id)
        .bind(action)
        .bind(reason)
        .bind(previous_status)
        .bind(new_status)
        .execute(executor)
        .await
        .map_err(|e| {
            AppError::from_unique_violation(e, "O artigo está sendo revisado por outro usuário.")
        })?;

        Ok(())
    }

    pub async fn list_reviews(&self, content_id: Uuid) -> Result<Vec<ReviewRecord>, AppError> {
        let records = sqlx::query_as::<_, ReviewRecord>(
            "SELECT id, content_id, reviewer_id, action, reason, previous_status, new_status, \
                    created_at \
             FROM review_records WHERE content_id = $1 \
             ORDER BY created_at DESC",
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn find_detail(&self, id: Uuid) -> Result<Option<ContentDetail>, AppError> {
        let detail = sqlx::query_as::<_, ContentDetail>(
            "SELECT c.id, c.title, c.body, c.category, c.cover, c.status, c.review_status, \
                    c.rejection_reason, c.last_reviewed_at, \
                    c.author_id, a.nickname AS author_name, a.role AS author_role, \
                    c.updater_id, u.nickname AS updater_name, \
                    c.created_at, c.updated_at \
             FROM contents c \
             JOIN users a ON a.id = c.author_id \
             LEFT JOIN users u ON u.id = c.updater_id \
             WHERE c.id = $1 AND NOT c.deleted",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(detail)
    }

    pub async fn list(
        &self,
        visibility: ContentVisibility,
        title: Option<&str>,
        category: Option<&str>,
        status: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<ContentListItem>, i64), AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT c.id, c.title, c.category, c.cover, c.status, c.review_status, \
                    c.rejection_reason, c.author_id, a.nickname AS author_name, \
                    u.nickname AS updater_name, c.created_at, c.updated_at \
             FROM contents c \
             JOIN users a ON a.id = c.author_id \
             LEFT JOIN users u ON u.id = c.updater_id ",
        );
        push_filters(&mut qb, visibility, title, category, status);
        qb.push(" ORDER BY c.created_at DESC LIMIT ")
            .push_bind(page_size)
            .push(" OFFSET ")
            .push_bind((page - 1) * page_size);

        let list = qb
            .build_query_as::<ContentListItem>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contents c ");
        push_filters(&mut count_qb, visibility, title, category, status);

        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok((list, total))
    }

    pub async fn soft_delete(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE contents SET deleted = TRUE, updated_at = now() \
             WHERE id = ANY($1) AND NOT deleted",
        )
        .bind(ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// Filtros compartilhados entre a listagem e a contagem. A faixa de
// visibilidade entra aqui como um predicado único.
fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    visibility: ContentVisibility,
    title: Option<&str>,
    category: Option<&str>,
    status: Option<&str>,
) {
    qb.push("WHERE NOT c.deleted");

    match visibility {
        ContentVisibility::All => {
            match status {
                Some(s) => {
                    qb.push(" AND c.status = ").push_bind(s.to_string());
                }
                // Sem filtro explícito, arquivados ficam de fora
                None => {
                    qb.push(" AND c.status <> 'archived'");
                }
            }
        }
        ContentVisibility::OwnPlusPublished(user_id) => match status {
            Some(s) => {
                qb.push(" AND ((c.author_id = ")
                    .push_bind(user_id)
                    .push(" AND c.status = ")
                    .push_bind(s.to_string())
                    .push(") OR (c.author_id <> ")
                    .push_bind(user_id)
                    .push(" AND c.status = 'published'))");
            }
            None => {
                qb.push(" AND (c.author_id = ")
                    .push_bind(user_id)
                    .push(" OR c.status = 'published')");
            }
        },
        ContentVisibility::PublishedOnly => {
            qb.push(" AND c.status = 'published'");
        }
    }

    if let Some(t) = title {
        qb.push(" AND c.title ILIKE ").push_bind(format!("%{t}%"));
    }
    if let Some(cat) = category {
        qb.push(" AND c.category = ").push_bind(cat.to_string());
    }
}
