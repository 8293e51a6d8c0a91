//! Download Tracker - Backend Library
//!
//! Records best-effort download intent signals posted by the project website.

#[macro_use]
mod macros;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, Result};
