// src/db/audit_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::error::AppError;
use crate::models::audit::AuditLogEntry;

const LOG_COLUMNS: &str = "id, module, action, description, operator, ip, location, status, \
     duration_ms, params, error_msg, created_at";

// Repositório da trilha de auditoria (tabela 'audit_logs'), append-only.
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

pub struct NewAuditLog<'a> {
    pub module: &'a str,
    pub action: &'a str,
    pub description: &'a str,
    pub operator: &'a str,
    pub ip: &'a str,
    pub location: &'a str,
    pub status: &'a str,
    pub duration_ms: i64,
    pub params: &'a str,
    pub error_msg: Option<&'a str>,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: NewAuditLog<'_>) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO audit_logs \
                 (module, action, description, operator, ip, location, status, duration_ms, \
                  params, error_msg) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(entry.module)
        .bind(entry.action)
        .bind(entry.description)
        .bind(entry.operator)
        .bind(entry.ip)
        .bind(entry.location)
        .bind(entry.status)
        .bind(entry.duration_ms)
        .bind(entry.params)
        .bind(entry.error_msg)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list(
        &self,
        module: Option<&str>,
        operator: Option<&str>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<AuditLogEntry>, i64), AppError> {
        let list = sqlx::query_as::<_, AuditLogEntry>(&format!(
            "SELECT {LOG_COLUMNS} FROM audit_logs \
             WHERE NOT deleted \
               AND ($1::text IS NULL OR module = $1) \
               AND ($2::text IS NULL OR operator = $2) \
               AND ($3::timestamptz IS NULL OR created_at >= $3) \
               AND ($4::timestamptz IS NULL OR created_at <= $4) \
             ORDER BY created_at DESC \
             LIMIT $5 OFFSET $6"
        ))
        .bind(module)
        .bind(operator)
        .bind(start)
        .bind(end)
        .bind(page_size)
        .bind((page - 1) * page_size)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM audit_logs \
             WHERE NOT deleted \
               AND ($1::text IS NULL OR module = $1) \
               AND ($2::text IS NULL OR operator = $2) \
               AND ($3::timestamptz IS NULL OR created_at >= $3) \
               AND ($4::timestamptz IS NULL OR created_at <= $4)",
        )
        .bind(module)
        .bind(operator)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok((list, total))
    }
}
