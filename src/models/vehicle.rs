use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "fuel_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuelType {
    Petrol,
    Diesel,
    Cng,
    Lpg,
    Electric,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "provision", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provision {
    Owned,
    Leased,
    Hired,
    Donated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vehicle_condition", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleCondition {
    New,
    Good,
    Fair,
    Poor,
    Unserviceable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vehicle_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    OnDuty,
    OffDuty,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vehicle_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    TwoWheeler,
    ThreeWheeler,
    Car,
    Suv,
    Van,
    Bus,
    Truck,
    Tractor,
    SpecialPurpose,
}

impl FuelType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PETROL" => Some(Self::Petrol),
            "DIESEL" => Some(Self::Diesel),
            "CNG" => Some(Self::Cng),
            "LPG" => Some(Self::Lpg),
            "ELECTRIC" => Some(Self::Electric),
            "HYBRID" => Some(Self::Hybrid),
            _ => None,
        }
    }
}

impl VehicleStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ON_DUTY" => Some(Self::OnDuty),
            "OFF_DUTY" => Some(Self::OffDuty),
            "MAINTENANCE" => Some(Self::Maintenance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnDuty => "ON_DUTY",
            Self::OffDuty => "OFF_DUTY",
            Self::Maintenance => "MAINTENANCE",
        }
    }
}

impl VehicleType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TWO_WHEELER" => Some(Self::TwoWheeler),
            "THREE_WHEELER" => Some(Self::ThreeWheeler),
            "CAR" => Some(Self::Car),
            "SUV" => Some(Self::Suv),
            "VAN" => Some(Self::Van),
            "BUS" => Some(Self::Bus),
            "TRUCK" => Some(Self::Truck),
            "TRACTOR" => Some(Self::Tractor),
            "SPECIAL_PURPOSE" => Some(Self::SpecialPurpose),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwoWheeler => "TWO_WHEELER",
            Self::ThreeWheeler => "THREE_WHEELER",
            Self::Car => "CAR",
            Self::Suv => "SUV",
            Self::Van => "VAN",
            Self::Bus => "BUS",
            Self::Truck => "TRUCK",
            Self::Tractor => "TRACTOR",
            Self::SpecialPurpose => "SPECIAL_PURPOSE",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
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
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_by: Uuid,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_deleted: bool,
}
