pub mod accounts;
pub mod arguments;
pub mod artifacts;
pub mod chain;
pub mod config;
pub mod environment;
pub mod error;
pub mod manifest;
mod run;
pub mod runner;
pub mod store;
pub mod task;
#[cfg(test)]
mod tests;

pub use self::run::{run, start};
