//! Audit store queries.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{AuditError, PageRequest};
use crate::models::audit::{AuditPage, AuditRecord, NewAuditRecord};

type AuditRow = (
    i64,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
);

/// Append one audit record, returning its ID.
pub async fn insert_audit_record(
    pool: &SqlitePool,
    record: &NewAuditRecord,
) -> Result<i64, AuditError> {
    let details_json = record
        .details
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO audit_logs (actor_username, actor_role, ip, action, target, details_json, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&record.actor_username)
    .bind(&record.actor_role)
    .bind(&record.ip)
    .bind(&record.action)
    .bind(record.target.as_deref())
    .bind(details_json)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Fetch one page of audit records, newest first, plus the total count.
pub async fn list_audit_records(
    pool: &SqlitePool,
    page: PageRequest,
) -> Result<AuditPage, AuditError> {
    let rows = sqlx::query_as::<_, AuditRow>(
        r#"
        SELECT id, actor_username, actor_role, ip, action, target, details_json, created_at
        FROM audit_logs
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total = count_audit_records(pool).await?;

    let records = rows
        .into_iter()
        .map(
            |(id, actor_username, actor_role, ip, action, target, details_json, created_at)| {
                AuditRecord {
                    id,
                    actor_username,
                    actor_role,
                    ip,
                    action,
                    target,
                    details_json,
                    created_at,
                }
            },
        )
        .collect();

    Ok(AuditPage {
        records,
        page: page.page,
        limit: page.limit,
        total,
    })
}

/// Count all audit records.
pub async fn count_audit_records(pool: &SqlitePool) -> Result<i64, AuditError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audit_logs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
