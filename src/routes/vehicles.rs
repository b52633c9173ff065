use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::logs::NewLogEntry;
use crate::db::vehicles::{
    ListParams, SortColumn, SortOrder, VehicleCreate, VehicleFilter, VehiclePatch,
};
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{FuelType, LogAction, VehicleStatus, VehicleType};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub vehicle_type: Option<String>,
    pub fuel_type: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}

fn parse_filter(params: &ListQuery) -> Result<VehicleFilter, AppError> {
    let status = params
        .status
        .as_deref()
        .map(|s| {
            VehicleStatus::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown status '{s}'")))
        })
        .transpose()?;
    let vehicle_type = params
        .vehicle_type
        .as_deref()
        .map(|s| {
            VehicleType::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown vehicle type '{s}'")))
        })
        .transpose()?;
    let fuel_type = params
        .fuel_type
        .as_deref()
        .map(|s| {
            FuelType::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown fuel type '{s}'")))
        })
        .transpose()?;

    Ok(VehicleFilter {
        search: params.search.clone(),
        status,
        vehicle_type,
        fuel_type,
    })
}

fn validate_create(data: &VehicleCreate) -> Result<(), AppError> {
    if data.registration_no.trim().is_empty() || data.registration_no.len() > 20 {
        return Err(AppError::BadRequest(
            "Registration number must be between 1 and 20 characters".to_string(),
        ));
    }
    if data.make.is_empty() || data.make.len() > 50 {
        return Err(AppError::BadRequest(
            "Make must be between 1 and 50 characters".to_string(),
        ));
    }
    if data.model.is_empty() || data.model.len() > 50 {
        return Err(AppError::BadRequest(
            "Model must be between 1 and 50 characters".to_string(),
        ));
    }
    if let Some(remarks) = &data.remarks {
        if remarks.len() > 500 {
            return Err(AppError::BadRequest(
                "Remarks must be at most 500 characters".to_string(),
            ));
        }
    }
    validate_numeric("kmpl", Some(data.kmpl))?;
    validate_numeric("cost", Some(data.cost))?;
    validate_numeric("tank_capacity", Some(data.tank_capacity))?;
    if data.seating_capacity <= 0 {
        return Err(AppError::BadRequest(
            "seating_capacity must be strictly positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_patch(patch: &VehiclePatch) -> Result<(), AppError> {
    if let Some(registration_no) = &patch.registration_no {
        if registration_no.trim().is_empty() || registration_no.len() > 20 {
            return Err(AppError::BadRequest(
                "Registration number must be between 1 and 20 characters".to_string(),
            ));
        }
    }
    if let Some(remarks) = &patch.remarks {
        if remarks.len() > 500 {
            return Err(AppError::BadRequest(
                "Remarks must be at most 500 characters".to_string(),
            ));
        }
    }
    validate_numeric("kmpl", patch.kmpl)?;
    validate_numeric("cost", patch.cost)?;
    validate_numeric("tank_capacity", patch.tank_capacity)?;
    if let Some(seats) = patch.seating_capacity {
        if seats <= 0 {
            return Err(AppError::BadRequest(
                "seating_capacity must be strictly positive".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_numeric(name: &str, value: Option<f64>) -> Result<(), AppError> {
    if let Some(value) = value {
        if !value.is_finite() || value <= 0.0 {
            return Err(AppError::BadRequest(format!(
                "{name} must be strictly positive"
            )));
        }
    }
    Ok(())
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let filter = parse_filter(&params)?;

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let sort_by = match params.sort_by.as_deref() {
        Some(s) => SortColumn::parse(s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown sort column '{s}'")))?,
        None => SortColumn::CreatedAt,
    };
    let sort_order = match params.sort_order.as_deref() {
        Some(s) => SortOrder::parse(s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown sort order '{s}'")))?,
        None => SortOrder::Desc,
    };

    let list_params = ListParams {
        filter: filter.clone(),
        limit: per_page,
        offset,
        sort_by,
        sort_order,
    };

    let vehicles = db::vehicles::list(&state.pool, &list_params).await?;
    let total = db::vehicles::count(&state.pool, &filter).await?;

    Ok(Json(json!({
        "vehicles": vehicles,
        "total": total,
        "page": page,
        "per_page": per_page,
        "total_pages": (total + per_page - 1) / per_page,
    })))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let vehicle = db::vehicles::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let warning = audit::record(
        &state.pool,
        NewLogEntry {
            action: LogAction::View,
            entity_type: "vehicle",
            entity_id: vehicle.id,
            user_id: auth.user_id,
            user_name: &auth.full_name,
            details: json!({ "registration_no": vehicle.registration_no }),
            ip_address: audit::client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies),
        },
    )
    .await;

    let mut body = json!({ "vehicle": vehicle });
    if let Some(warning) = warning {
        body["warning"] = json!(warning);
    }
    Ok(Json(body))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(data): Json<VehicleCreate>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate_create(&data)?;

    if db::vehicles::find_by_registration_no(&state.pool, &data.registration_no)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "A vehicle with this registration number already exists".to_string(),
        ));
    }

    // The partial unique index still catches the create/create race the
    // pre-check above cannot.
    let vehicle = db::vehicles::create(&state.pool, &data, auth.user_id)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(
                    "A vehicle with this registration number already exists".to_string(),
                )
            }
            _ => AppError::Database(e),
        })?;

    let warning = audit::record(
        &state.pool,
        NewLogEntry {
            action: LogAction::Create,
            entity_type: "vehicle",
            entity_id: vehicle.id,
            user_id: auth.user_id,
            user_name: &auth.full_name,
            details: json!({
                "registration_no": vehicle.registration_no,
                "make": vehicle.make,
                "model": vehicle.model,
                "status": vehicle.status.as_str(),
            }),
            ip_address: audit::client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies),
        },
    )
    .await;

    let mut body = json!({ "vehicle": vehicle });
    if let Some(warning) = warning {
        body["warning"] = json!(warning);
    }
    Ok(Json(body))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(patch): Json<VehiclePatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate_patch(&patch)?;

    let existing = db::vehicles::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    if let Some(registration_no) = &patch.registration_no {
        if registration_no != &existing.registration_no
            && db::vehicles::find_by_registration_no(&state.pool, registration_no)
                .await?
                .is_some()
        {
            return Err(AppError::Conflict(
                "A vehicle with this registration number already exists".to_string(),
            ));
        }
    }

    let vehicle = db::vehicles::update(&state.pool, id, &patch, auth.user_id)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(
                    "A vehicle with this registration number already exists".to_string(),
                )
            }
            _ => AppError::Database(e),
        })?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let warning = audit::record(
        &state.pool,
        NewLogEntry {
            action: LogAction::Update,
            entity_type: "vehicle",
            entity_id: vehicle.id,
            user_id: auth.user_id,
            user_name: &auth.full_name,
            details: json!({
                "registration_no": vehicle.registration_no,
                "changed_fields": patch.changed_fields(),
            }),
            ip_address: audit::client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies),
        },
    )
    .await;

    let mut body = json!({ "vehicle": vehicle });
    if let Some(warning) = warning {
        body["warning"] = json!(warning);
    }
    Ok(Json(body))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let vehicle = db::vehicles::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    // A racing delete can still win between the lookup and here.
    if !db::vehicles::soft_delete(&state.pool, id, auth.user_id).await? {
        return Err(AppError::NotFound("Vehicle not found".to_string()));
    }

    let warning = audit::record(
        &state.pool,
        NewLogEntry {
            action: LogAction::Delete,
            entity_type: "vehicle",
            entity_id: vehicle.id,
            user_id: auth.user_id,
            user_name: &auth.full_name,
            details: json!({
                "registration_no": vehicle.registration_no,
                "make": vehicle.make,
                "model": vehicle.model,
            }),
            ip_address: audit::client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies),
        },
    )
    .await;

    let mut body = json!({ "message": "Vehicle deleted" });
    if let Some(warning) = warning {
        body["warning"] = json!(warning);
    }
    Ok(Json(body))
}

/// Soft-delete a batch of vehicles. Absent or already-deleted ids are
/// skipped; each vehicle that actually goes away gets its own audit entry.
pub async fn bulk_delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut deleted_count = 0i64;
    let mut registration_numbers = Vec::new();
    let mut warning = None;

    for id in req.ids {
        let Some(vehicle) = db::vehicles::find_by_id(&state.pool, id).await? else {
            continue;
        };
        if !db::vehicles::soft_delete(&state.pool, id, auth.user_id).await? {
            continue;
        }

        deleted_count += 1;
        registration_numbers.push(vehicle.registration_no.clone());

        if let Some(w) = audit::record(
            &state.pool,
            NewLogEntry {
                action: LogAction::Delete,
                entity_type: "vehicle",
                entity_id: vehicle.id,
                user_id: auth.user_id,
                user_name: &auth.full_name,
                details: json!({
                    "registration_no": vehicle.registration_no,
                    "bulk_delete": true,
                }),
                ip_address: audit::client_ip(
                    &headers,
                    Some(addr.ip()),
                    &state.config.trusted_proxies,
                ),
            },
        )
        .await
        {
            warning = Some(w);
        }
    }

    let mut body = json!({
        "deleted_count": deleted_count,
        "registration_numbers": registration_numbers,
    });
    if let Some(warning) = warning {
        body["warning"] = json!(warning);
    }
    Ok(Json(body))
}
