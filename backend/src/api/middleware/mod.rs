//! API middleware.

pub mod correlation;
