use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::logs::LogFilter;
use crate::error::AppError;
use crate::models::LogAction;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub user_id: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

fn parse_date(name: &str, value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::BadRequest(format!("Invalid {name}: {e}")))
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let action = params
        .action
        .as_deref()
        .map(|s| {
            LogAction::parse(s).ok_or_else(|| AppError::BadRequest(format!("Unknown action '{s}'")))
        })
        .transpose()?;
    let from = params
        .start_date
        .as_deref()
        .map(|s| parse_date("start_date", s))
        .transpose()?;
    let to = params
        .end_date
        .as_deref()
        .map(|s| parse_date("end_date", s))
        .transpose()?;

    let filter = LogFilter {
        action,
        entity_type: params.entity_type.clone(),
        user_id: params.user_id,
        from,
        to,
    };

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let logs = db::logs::list(&state.pool, &filter, per_page, offset).await?;
    let total = db::logs::count(&state.pool, &filter).await?;

    Ok(Json(json!({
        "logs": logs,
        "total": total,
        "page": page,
        "per_page": per_page,
        "total_pages": (total + per_page - 1) / per_page,
    })))
}

pub async fn by_user(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 100);
    let logs = db::logs::by_user(&state.pool, user_id, limit).await?;
    Ok(Json(json!({ "logs": logs })))
}

pub async fn by_entity(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path((entity_type, entity_id)): Path<(String, Uuid)>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 100);
    let logs = db::logs::by_entity(&state.pool, &entity_type, entity_id, limit).await?;
    Ok(Json(json!({ "logs": logs })))
}
