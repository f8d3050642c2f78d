use super::{apply_env_overrides, apply_file_settings, load_settings, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn missing_file_yields_defaults() {
    let settings = load_settings(&env::temp_dir().join("no_such_preview_config.toml"));
    assert_eq!(settings.event_capacity, Settings::default().event_capacity);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_settings(
        &mut settings,
        "default_layout = \"centered\"\nevent_capacity = 16\n",
    );
    assert_eq!(settings.default_layout, "centered");
    assert_eq!(settings.event_capacity, 16);
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn malformed_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, "event_capacity = \"lots\"");
    assert_eq!(settings, Settings::default());
}

#[test]
fn env_overrides_win_and_bad_numbers_are_skipped() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        lookup_from(&[
            ("APP__DEFAULT_LAYOUT", "fullscreen"),
            ("APP__EVENT_CAPACITY", "many"),
            ("APP__LOG_FILTER", "preview_core=debug"),
        ]),
    );
    assert_eq!(settings.default_layout, "fullscreen");
    assert_eq!(settings.event_capacity, 1024);
    assert_eq!(settings.log_filter, "preview_core=debug");
}

#[test]
fn loads_settings_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("preview_cli_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("preview.toml");
    fs::write(&path, "log_filter = \"warn\"\n").expect("write config");

    let settings = load_settings(&path);
    fs::remove_dir_all(temp_root).expect("cleanup");

    if env::var("APP__LOG_FILTER").is_err() {
        assert_eq!(settings.log_filter, "warn");
    }
    if env::var("APP__DEFAULT_LAYOUT").is_err() {
        assert_eq!(settings.preview_options().default_layout, "padded");
    }
}
