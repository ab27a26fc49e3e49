use std::path::{Path, PathBuf};

use versus::config::GameConfig;
use versus::input::{Control, KeyCode};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("versus-config-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn defaults_match_the_logical_screen() {
    let config = GameConfig::default();
    assert_eq!((config.width, config.height), (1280, 960));
    assert_eq!(config.ups, 60);
    assert!(!config.debug);
}

#[test]
fn controls_are_looked_up_per_player() {
    let config = GameConfig::default();
    assert_eq!(config.controls(1).action_for(KeyCode::Space), Some(Control::Jump));
    assert_eq!(config.controls(2).action_for(KeyCode::Numpad0), Some(Control::Jump));
    assert_eq!(config.controls(2).action_for(KeyCode::Space), None);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let config = GameConfig::load(Path::new("/definitely/not/here/versus.json"));
    assert_eq!(config, GameConfig::default());
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let dir = scratch_dir("malformed");
    let path = dir.join("versus.json");
    std::fs::write(&path, "ups = 30").unwrap();
    assert_eq!(GameConfig::load(&path), GameConfig::default());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let dir = scratch_dir("partial");
    let path = dir.join("versus.json");
    std::fs::write(&path, r#"{ "ups": 30, "debug": true }"#).unwrap();
    let config = GameConfig::load(&path);
    assert_eq!(config.ups, 30);
    assert!(config.debug);
    assert_eq!(config.title, GameConfig::default().title);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn saved_config_loads_back() {
    let dir = scratch_dir("saved");
    let path = dir.join("versus.json");
    let mut config = GameConfig::default();
    config.stats_path = Some(dir.join("stats.json"));
    config.save(&path).unwrap();
    assert_eq!(GameConfig::load(&path), config);
    assert_eq!(config.resolved_stats_path(), Some(dir.join("stats.json")));
    let _ = std::fs::remove_dir_all(dir);
}
