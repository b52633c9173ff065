use axum::extract::State;
use axum::Json;
use serde_json::{json, Map, Value};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::VehicleStatus;
use crate::state::SharedState;

/// Read-only fan-out over the live fleet plus the tail of the audit trail.
/// The sub-queries are independent; nothing here writes.
pub async fn index(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Value>, AppError> {
    let total = db::vehicles::count_live(&state.pool).await?;
    let by_status = db::vehicles::count_by_status(&state.pool).await?;
    let by_type = db::vehicles::count_by_type(&state.pool).await?;
    let recent_logs = db::logs::recent(&state.pool, 10).await?;

    let status_count = |status: VehicleStatus| -> i64 {
        by_status
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };

    let vehicles_by_status: Map<String, Value> = by_status
        .iter()
        .map(|(status, n)| (status.as_str().to_string(), json!(n)))
        .collect();
    let vehicles_by_type: Map<String, Value> = by_type
        .iter()
        .map(|(vehicle_type, n)| (vehicle_type.as_str().to_string(), json!(n)))
        .collect();

    Ok(Json(json!({
        "total_vehicles": total,
        "on_duty_vehicles": status_count(VehicleStatus::OnDuty),
        "off_duty_vehicles": status_count(VehicleStatus::OffDuty),
        "maintenance_vehicles": status_count(VehicleStatus::Maintenance),
        "vehicles_by_status": vehicles_by_status,
        "vehicles_by_type": vehicles_by_type,
        "recent_logs": recent_logs,
    })))
}
