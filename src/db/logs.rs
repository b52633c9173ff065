use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{LogAction, LogEntry};

pub struct NewLogEntry<'a> {
    pub action: LogAction,
    pub entity_type: &'a str,
    pub entity_id: Uuid,
    pub user_id: Uuid,
    pub user_name: &'a str,
    pub details: serde_json::Value,
    pub ip_address: Option<String>,
}

/// Append one entry to the trail. The details payload is stored verbatim.
pub async fn append(pool: &PgPool, entry: NewLogEntry<'_>) -> Result<LogEntry, sqlx::Error> {
    sqlx::query_as::<_, LogEntry>(
        "INSERT INTO audit_logs (action, entity_type, entity_id, user_id, user_name, details, ip_address)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(entry.action)
    .bind(entry.entity_type)
    .bind(entry.entity_id)
    .bind(entry.user_id)
    .bind(entry.user_name)
    .bind(entry.details)
    .bind(entry.ip_address)
    .fetch_one(pool)
    .await
}

#[derive(Debug, Default, Clone)]
pub struct LogFilter {
    pub action: Option<LogAction>,
    pub entity_type: Option<String>,
    pub user_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn push_filters(qb: &mut QueryBuilder<Postgres>, filter: &LogFilter) {
    if let Some(action) = filter.action {
        qb.push(" AND action = ").push_bind(action);
    }
    if let Some(entity_type) = &filter.entity_type {
        qb.push(" AND entity_type = ").push_bind(entity_type.clone());
    }
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(from) = filter.from {
        qb.push(" AND occurred_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND occurred_at <= ").push_bind(to);
    }
}

pub async fn list(
    pool: &PgPool,
    filter: &LogFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<LogEntry>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM audit_logs WHERE TRUE");
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY occurred_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    qb.build_query_as::<LogEntry>().fetch_all(pool).await
}

pub async fn count(pool: &PgPool, filter: &LogFilter) -> Result<i64, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM audit_logs WHERE TRUE");
    push_filters(&mut qb, filter);

    qb.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<LogEntry>, sqlx::Error> {
    sqlx::query_as::<_, LogEntry>(
        "SELECT * FROM audit_logs ORDER BY occurred_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn by_user(pool: &PgPool, user_id: Uuid, limit: i64) -> Result<Vec<LogEntry>, sqlx::Error> {
    sqlx::query_as::<_, LogEntry>(
        "SELECT * FROM audit_logs WHERE user_id = $1 ORDER BY occurred_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn by_entity(
    pool: &PgPool,
    entity_type: &str,
    entity_id: Uuid,
    limit: i64,
) -> Result<Vec<LogEntry>, sqlx::Error> {
    sqlx::query_as::<_, LogEntry>(
        "SELECT * FROM audit_logs WHERE entity_type = $1 AND entity_id = $2
         ORDER BY occurred_at DESC LIMIT $3",
    )
    .bind(entity_type)
    .bind(entity_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// The only path that ever removes audit records: drop everything older than
/// the retention horizon.
pub async fn purge_older_than(pool: &PgPool, retention_days: i64) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now() - Duration::days(retention_days);
    let result = sqlx::query("DELETE FROM audit_logs WHERE occurred_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
