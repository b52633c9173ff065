pub mod log;
pub mod user;
pub mod vehicle;

pub use log::{LogAction, LogEntry};
pub use user::User;
pub use vehicle::{
    FuelType, Provision, Vehicle, VehicleCondition, VehicleStatus, VehicleType,
};
