//! Domain entities

pub mod communication;
pub mod log_record;
pub mod vision;
