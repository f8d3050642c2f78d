use std::{fs, path::Path};

use preview_core::{PreviewOptions, DEFAULT_LAYOUT};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub default_layout: String,
    pub event_capacity: usize,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_layout: DEFAULT_LAYOUT.into(),
            event_capacity: 1024,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn preview_options(&self) -> PreviewOptions {
        PreviewOptions {
            default_layout: self.default_layout.clone(),
            event_capacity: self.event_capacity,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    default_layout: Option<String>,
    event_capacity: Option<usize>,
    log_filter: Option<String>,
}

pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(path) {
        apply_file_settings(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file_settings(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<FileSettings>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.default_layout {
        settings.default_layout = v;
    }
    if let Some(v) = file_cfg.event_capacity {
        settings.event_capacity = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP__DEFAULT_LAYOUT") {
        settings.default_layout = v;
    }
    if let Some(v) = lookup("APP__EVENT_CAPACITY") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.event_capacity = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__EVENT_CAPACITY"),
        }
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
