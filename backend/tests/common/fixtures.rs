//! Payload fixtures for download tracking tests

#![allow(dead_code)]

use serde_json::json;

/// Installers offered on the download page, as `(file, platform)`.
pub const INSTALLERS: &[(&str, &str)] = &[
    ("Groot2-v1.6.1-windows-installer.exe", "windows"),
    ("Groot2-v1.6.1-linux-installer.run", "linux"),
    ("Groot2-v1.6.1-x86_64.AppImage", "linux"),
];

pub fn payload(file: &str, platform: &str, version: Option<&str>) -> String {
    json!({ "file": file, "platform": platform, "version": version }).to_string()
}

pub fn payload_without_version(file: &str, platform: &str) -> String {
    json!({ "file": file, "platform": platform }).to_string()
}
