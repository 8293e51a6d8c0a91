//! Database models (SQLx).

pub mod download_event;

pub use download_event::{DownloadEvent, DownloadPayload, NewDownloadEvent};
