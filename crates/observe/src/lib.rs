//! This crate contains the code required to make the deployment tooling
//! observable: initialization logic for logging and a panic hook that routes
//! panics through the same log pipeline.
pub mod config;
pub mod panic_hook;
pub mod tracing;

pub use config::Config;
