pub mod config;
pub mod error;
pub mod students;
pub mod telemetry;
