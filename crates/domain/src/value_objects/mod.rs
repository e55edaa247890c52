//! Domain value objects

pub mod phone_number;
