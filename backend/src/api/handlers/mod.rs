//! HTTP request handlers.

pub mod downloads;
pub mod health;
