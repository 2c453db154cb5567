//! Shared test utilities.

#![allow(dead_code)]

use std::fs;

use claude_switch::config::{SecureString, Selection};
use claude_switch::providers::ProviderId;
use claude_switch::settings::{SettingsDocument, SwitchPaths};
use serde_json::Value;
use tempfile::TempDir;

/// Paths rooted in a fresh temp directory. Keep the `TempDir` alive.
pub fn temp_paths() -> (TempDir, SwitchPaths) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let paths = SwitchPaths::rooted_at(temp_dir.path());
    (temp_dir, paths)
}

pub fn write_settings(paths: &SwitchPaths, content: &str) {
    fs::create_dir_all(paths.settings_file.parent().unwrap()).unwrap();
    fs::write(&paths.settings_file, content).unwrap();
}

pub fn read_settings_bytes(paths: &SwitchPaths) -> Vec<u8> {
    fs::read(&paths.settings_file).expect("settings file should exist")
}

pub fn doc(value: Value) -> SettingsDocument {
    serde_json::from_value(value).expect("test document must be an object")
}

pub fn selection(provider: ProviderId, region: &str, model: &str, key: &str) -> Selection {
    Selection {
        provider,
        region: region.to_string(),
        model: model.to_string(),
        api_key: SecureString::new(key.to_string()),
    }
}
