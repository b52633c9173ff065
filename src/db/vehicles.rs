use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{FuelType, Provision, Vehicle, VehicleCondition, VehicleStatus, VehicleType};

/// Fields a caller supplies when registering a vehicle. Audit metadata is
/// stamped by the repository, never by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleCreate {
    pub registration_no: String,
    pub customer_id: String,
    pub make: String,
    pub model: String,
    pub kmpl: f64,
    pub vehicle_group: String,
    pub category: String,
    pub purchase_date: DateTime<Utc>,
    pub cost: f64,
    pub purchased_from: String,
    pub registration_date: DateTime<Utc>,
    pub fuel_type: FuelType,
    pub tank_capacity: f64,
    pub seating_capacity: i32,
    pub provision: Provision,
    pub unit_id: String,
    pub present_unit_name: String,
    pub previous_unit_name: Option<String>,
    pub engine_no: String,
    pub chassis_no: String,
    pub go_date: DateTime<Utc>,
    pub go_number: String,
    pub condition: VehicleCondition,
    pub remarks: Option<String>,
    pub status: VehicleStatus,
    pub vehicle_type: VehicleType,
}

/// Partial update: unset fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehiclePatch {
    pub registration_no: Option<String>,
    pub customer_id: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub kmpl: Option<f64>,
    pub vehicle_group: Option<String>,
    pub category: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub cost: Option<f64>,
    pub purchased_from: Option<String>,
    pub registration_date: Option<DateTime<Utc>>,
    pub fuel_type: Option<FuelType>,
    pub tank_capacity: Option<f64>,
    pub seating_capacity: Option<i32>,
    pub provision: Option<Provision>,
    pub unit_id: Option<String>,
    pub present_unit_name: Option<String>,
    pub previous_unit_name: Option<String>,
    pub engine_no: Option<String>,
    pub chassis_no: Option<String>,
    pub go_date: Option<DateTime<Utc>>,
    pub go_number: Option<String>,
    pub condition: Option<VehicleCondition>,
    pub remarks: Option<String>,
    pub status: Option<VehicleStatus>,
    pub vehicle_type: Option<VehicleType>,
}

impl VehiclePatch {
    /// Names of the fields this patch would touch, for audit details.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.registration_no.is_some() {
            fields.push("registration_no");
        }
        if self.customer_id.is_some() {
            fields.push("customer_id");
        }
        if self.make.is_some() {
            fields.push("make");
        }
        if self.model.is_some() {
            fields.push("model");
        }
        if self.kmpl.is_some() {
            fields.push("kmpl");
        }
        if self.vehicle_group.is_some() {
            fields.push("vehicle_group");
        }
        if self.category.is_some() {
            fields.push("category");
        }
        if self.purchase_date.is_some() {
            fields.push("purchase_date");
        }
        if self.cost.is_some() {
            fields.push("cost");
        }
        if self.purchased_from.is_some() {
            fields.push("purchased_from");
        }
        if self.registration_date.is_some() {
            fields.push("registration_date");
        }
        if self.fuel_type.is_some() {
            fields.push("fuel_type");
        }
        if self.tank_capacity.is_some() {
            fields.push("tank_capacity");
        }
        if self.seating_capacity.is_some() {
            fields.push("seating_capacity");
        }
        if self.provision.is_some() {
            fields.push("provision");
        }
        if self.unit_id.is_some() {
            fields.push("unit_id");
        }
        if self.present_unit_name.is_some() {
            fields.push("present_unit_name");
        }
        if self.previous_unit_name.is_some() {
            fields.push("previous_unit_name");
        }
        if self.engine_no.is_some() {
            fields.push("engine_no");
        }
        if self.chassis_no.is_some() {
            fields.push("chassis_no");
        }
        if self.go_date.is_some() {
            fields.push("go_date");
        }
        if self.go_number.is_some() {
            fields.push("go_number");
        }
        if self.condition.is_some() {
            fields.push("condition");
        }
        if self.remarks.is_some() {
            fields.push("remarks");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.vehicle_type.is_some() {
            fields.push("vehicle_type");
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }
}

#[derive(Debug, Default, Clone)]
pub struct VehicleFilter {
    pub search: Option<String>,
    pub status: Option<VehicleStatus>,
    pub vehicle_type: Option<VehicleType>,
    pub fuel_type: Option<FuelType>,
}

#[derive(Debug, Clone, Copy)]
pub enum SortColumn {
    CreatedAt,
    RegistrationNo,
    Make,
    Model,
    Cost,
    PurchaseDate,
}

impl SortColumn {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created_at" => Some(Self::CreatedAt),
            "registration_no" => Some(Self::RegistrationNo),
            "make" => Some(Self::Make),
            "model" => Some(Self::Model),
            "cost" => Some(Self::Cost),
            "purchase_date" => Some(Self::PurchaseDate),
            _ => None,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::RegistrationNo => "registration_no",
            Self::Make => "make",
            Self::Model => "model",
            Self::Cost => "cost",
            Self::PurchaseDate => "purchase_date",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

pub struct ListParams {
    pub filter: VehicleFilter,
    pub limit: i64,
    pub offset: i64,
    pub sort_by: SortColumn,
    pub sort_order: SortOrder,
}

/// Filters compose as a conjunction on top of the soft-delete guard. The
/// free-text search matches registration number, make, model and the present
/// unit name, case-insensitively.
fn push_filters(qb: &mut QueryBuilder<Postgres>, filter: &VehicleFilter) {
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (registration_no ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR make ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR model ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR present_unit_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(vehicle_type) = filter.vehicle_type {
        qb.push(" AND vehicle_type = ").push_bind(vehicle_type);
    }
    if let Some(fuel_type) = filter.fuel_type {
        qb.push(" AND fuel_type = ").push_bind(fuel_type);
    }
}

pub async fn list(pool: &PgPool, params: &ListParams) -> Result<Vec<Vehicle>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM vehicles WHERE NOT is_deleted");
    push_filters(&mut qb, &params.filter);
    qb.push(" ORDER BY ")
        .push(params.sort_by.as_sql())
        .push(" ")
        .push(params.sort_order.as_sql())
        .push(" LIMIT ")
        .push_bind(params.limit)
        .push(" OFFSET ")
        .push_bind(params.offset);

    qb.build_query_as::<Vehicle>().fetch_all(pool).await
}

/// Size of the filtered set before pagination.
pub async fn count(pool: &PgPool, filter: &VehicleFilter) -> Result<i64, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM vehicles WHERE NOT is_deleted");
    push_filters(&mut qb, filter);

    qb.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Vehicle>, sqlx::Error> {
    sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 AND NOT is_deleted")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_registration_no(
    pool: &PgPool,
    registration_no: &str,
) -> Result<Option<Vehicle>, sqlx::Error> {
    sqlx::query_as::<_, Vehicle>(
        "SELECT * FROM vehicles WHERE registration_no = $1 AND NOT is_deleted",
    )
    .bind(registration_no)
    .fetch_optional(pool)
    .await
}

/// Insert a vehicle, stamping created/updated metadata from the acting user.
/// `created_at` and `updated_at` share a single now() so a fresh record always
/// has identical timestamps.
pub async fn create(
    pool: &PgPool,
    data: &VehicleCreate,
    actor_id: Uuid,
) -> Result<Vehicle, sqlx::Error> {
    sqlx::query_as::<_, Vehicle>(
        "INSERT INTO vehicles (
            registration_no, customer_id, make, model, kmpl, vehicle_group,
            category, purchase_date, cost, purchased_from, registration_date,
            fuel_type, tank_capacity, seating_capacity, provision, unit_id,
            present_unit_name, previous_unit_name, engine_no, chassis_no,
            go_date, go_number, condition, remarks, status, vehicle_type,
            created_by, updated_by
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
            $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26,
            $27, $27
        ) RETURNING *",
    )
    .bind(&data.registration_no)
    .bind(&data.customer_id)
    .bind(&data.make)
    .bind(&data.model)
    .bind(data.kmpl)
    .bind(&data.vehicle_group)
    .bind(&data.category)
    .bind(data.purchase_date)
    .bind(data.cost)
    .bind(&data.purchased_from)
    .bind(data.registration_date)
    .bind(data.fuel_type)
    .bind(data.tank_capacity)
    .bind(data.seating_capacity)
    .bind(data.provision)
    .bind(&data.unit_id)
    .bind(&data.present_unit_name)
    .bind(&data.previous_unit_name)
    .bind(&data.engine_no)
    .bind(&data.chassis_no)
    .bind(data.go_date)
    .bind(&data.go_number)
    .bind(data.condition)
    .bind(&data.remarks)
    .bind(data.status)
    .bind(data.vehicle_type)
    .bind(actor_id)
    .fetch_one(pool)
    .await
}

/// Apply only the supplied fields. A non-empty patch always refreshes
/// `updated_by`/`updated_at`; an empty patch re-reads the current row without
/// writing anything.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    patch: &VehiclePatch,
    actor_id: Uuid,
) -> Result<Option<Vehicle>, sqlx::Error> {
    if patch.is_empty() {
        return find_by_id(pool, id).await;
    }

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE vehicles SET ");
    let mut set = qb.separated(", ");

    if let Some(v) = &patch.registration_no {
        set.push("registration_no = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = &patch.customer_id {
        set.push("customer_id = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = &patch.make {
        set.push("make = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = &patch.model {
        set.push("model = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = patch.kmpl {
        set.push("kmpl = ").push_bind_unseparated(v);
    }
    if let Some(v) = &patch.vehicle_group {
        set.push("vehicle_group = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = &patch.category {
        set.push("category = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = patch.purchase_date {
        set.push("purchase_date = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.cost {
        set.push("cost = ").push_bind_unseparated(v);
    }
    if let Some(v) = &patch.purchased_from {
        set.push("purchased_from = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = patch.registration_date {
        set.push("registration_date = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.fuel_type {
        set.push("fuel_type = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.tank_capacity {
        set.push("tank_capacity = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.seating_capacity {
        set.push("seating_capacity = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.provision {
        set.push("provision = ").push_bind_unseparated(v);
    }
    if let Some(v) = &patch.unit_id {
        set.push("unit_id = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = &patch.present_unit_name {
        set.push("present_unit_name = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = &patch.previous_unit_name {
        set.push("previous_unit_name = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = &patch.engine_no {
        set.push("engine_no = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = &patch.chassis_no {
        set.push("chassis_no = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = patch.go_date {
        set.push("go_date = ").push_bind_unseparated(v);
    }
    if let Some(v) = &patch.go_number {
        set.push("go_number = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = patch.condition {
        set.push("condition = ").push_bind_unseparated(v);
    }
    if let Some(v) = &patch.remarks {
        set.push("remarks = ").push_bind_unseparated(v.clone());
    }
    if let Some(v) = patch.status {
        set.push("status = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.vehicle_type {
        set.push("vehicle_type = ").push_bind_unseparated(v);
    }
    set.push("updated_by = ").push_bind_unseparated(actor_id);
    set.push("updated_at = now()");

    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND NOT is_deleted RETURNING *");

    qb.build_query_as::<Vehicle>().fetch_optional(pool).await
}

/// Conditional on the current live state, so a delete racing another delete
/// (or landing after one) reports false instead of double-counting.
pub async fn soft_delete(pool: &PgPool, id: Uuid, actor_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE vehicles SET is_deleted = TRUE, updated_by = $2, updated_at = now()
         WHERE id = $1 AND NOT is_deleted",
    )
    .bind(id)
    .bind(actor_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_live(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vehicles WHERE NOT is_deleted")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Grouped counts over live vehicles; statuses with no vehicles are simply
/// absent from the result.
pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(VehicleStatus, i64)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT status, COUNT(*) FROM vehicles WHERE NOT is_deleted GROUP BY status",
    )
    .fetch_all(pool)
    .await
}

pub async fn count_by_type(pool: &PgPool) -> Result<Vec<(VehicleType, i64)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT vehicle_type, COUNT(*) FROM vehicles WHERE NOT is_deleted GROUP BY vehicle_type",
    )
    .fetch_all(pool)
    .await
}
