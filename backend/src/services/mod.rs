//! Business logic services.

pub mod download_service;
