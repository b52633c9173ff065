pub mod logs;
pub mod users;
pub mod vehicles;
