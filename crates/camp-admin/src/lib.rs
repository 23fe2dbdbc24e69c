pub mod auth;
pub mod camp;
pub mod config;
pub mod error;
pub mod telemetry;
