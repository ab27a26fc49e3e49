use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::input::{ActionMap, Control};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "VERSUS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "versus.json";

/// Logical render resolution every screen lays out against.
pub const SCREEN_WIDTH: i32 = 1280;
pub const SCREEN_HEIGHT: i32 = 960;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Simulation ticks per second.
    pub ups: u32,
    pub asset_dir: PathBuf,
    /// Stats document; `None` resolves to the platform data directory.
    pub stats_path: Option<PathBuf>,
    pub debug: bool,
    /// Player 1 and player 2 key bindings.
    pub controls: [ActionMap<Control>; 2],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Bleach: VS Ultimate".into(),
            width: SCREEN_WIDTH as u32,
            height: SCREEN_HEIGHT as u32,
            ups: 60,
            asset_dir: PathBuf::from("assets"),
            stats_path: None,
            debug: false,
            controls: [ActionMap::player_one(), ActionMap::player_two()],
        }
    }
}

impl GameConfig {
    /// Read the config at `path`, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<GameConfig>(&text) {
                Ok(cfg) => {
                    info!(path = %path.display(), "loaded config");
                    cfg
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "config is malformed; using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file; using defaults");
                Self::default()
            }
        }
    }

    /// Config path from the environment, or the working-directory default.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let data = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &data)
    }

    /// Bindings for player `1` or `2`.
    pub fn controls(&self, player: u8) -> &ActionMap<Control> {
        &self.controls[usize::from(player.saturating_sub(1)).min(1)]
    }

    pub fn resolved_stats_path(&self) -> Option<PathBuf> {
        self.stats_path.clone().or_else(|| data_dir().map(|dir| dir.join("stats.json")))
    }
}

/// Platform data directory for the game, created on demand.
pub fn data_dir() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "versus", "Versus")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Some(dir)
}

/// Write to a sibling temp file, then rename over `path`.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data)?;
    if path.exists() {
        let _ = fs::remove_file(path);
    }
    fs::rename(&tmp, path)
}
