//! External configuration loader.
//!
//! Reads `config.toml` from the executable's directory (or CWD).
//! A missing file or missing keys fall back to defaults; a file that
//! exists but cannot be read, parsed or validated is an error the caller
//! decides how to handle.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use simplelog::LevelFilter;
use thiserror::Error;

use crate::domain::art;
use crate::domain::grid::Grid;

pub const CONFIG_FILE: &str = "config.toml";

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub speed: SpeedConfig,
    pub rules: RulesConfig,
    pub general: GeneralConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub cell_size: u32,
    pub panel_width: u32,   // in cells
    pub panel_height: u32,  // in cells
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedConfig {
    pub refresh_rate: u32,       // frames per second
    pub initial: u32,            // snake moves per second at Start
    pub min: u32,
    pub max: u32,
    pub frame_ms: u32,           // flash timer increment per frame
    pub flash_interval_ms: u32,  // one full on/off flash cycle
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulesConfig {
    pub collision_allowance: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneralConfig {
    /// Fixed seed for target selection; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    board: TomlBoard,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlBoard {
    #[serde(default = "default_canvas_width")]
    canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    canvas_height: u32,
    #[serde(default = "default_cell_size")]
    cell_size: u32,
    #[serde(default = "default_panel_width")]
    panel_width: u32,
    #[serde(default = "default_panel_height")]
    panel_height: u32,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_refresh_rate")]
    refresh_rate: u32,
    #[serde(default = "default_initial_speed")]
    initial: u32,
    #[serde(default = "default_min_speed")]
    min: u32,
    #[serde(default = "default_max_speed")]
    max: u32,
    #[serde(default = "default_frame_ms")]
    frame_ms: u32,
    #[serde(default = "default_flash_interval")]
    flash_interval_ms: u32,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_collision_allowance")]
    collision_allowance: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_canvas_width() -> u32 { 800 }
fn default_canvas_height() -> u32 { 600 }
fn default_cell_size() -> u32 { 20 }
fn default_panel_width() -> u32 { 5 }
fn default_panel_height() -> u32 { 3 }

fn default_refresh_rate() -> u32 { 60 }
fn default_initial_speed() -> u32 { 3 }
fn default_min_speed() -> u32 { 1 }
fn default_max_speed() -> u32 { 60 }   // beyond the refresh rate every frame moves anyway
fn default_frame_ms() -> u32 { 16 }
fn default_flash_interval() -> u32 { 500 }

fn default_collision_allowance() -> u32 { 1 }

fn default_log_file() -> String { "heartsnake.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlBoard {
    fn default() -> Self {
        TomlBoard {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            cell_size: default_cell_size(),
            panel_width: default_panel_width(),
            panel_height: default_panel_height(),
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            refresh_rate: default_refresh_rate(),
            initial: default_initial_speed(),
            min: default_min_speed(),
            max: default_max_speed(),
            frame_ms: default_frame_ms(),
            flash_interval_ms: default_flash_interval(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            collision_allowance: default_collision_allowance(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            board: BoardConfig {
                canvas_width: default_canvas_width(),
                canvas_height: default_canvas_height(),
                cell_size: default_cell_size(),
                panel_width: default_panel_width(),
                panel_height: default_panel_height(),
            },
            speed: SpeedConfig {
                refresh_rate: default_refresh_rate(),
                initial: default_initial_speed(),
                min: default_min_speed(),
                max: default_max_speed(),
                frame_ms: default_frame_ms(),
                flash_interval_ms: default_flash_interval(),
            },
            rules: RulesConfig {
                collision_allowance: default_collision_allowance(),
            },
            general: GeneralConfig {
                seed: None,
                log_file: PathBuf::from(default_log_file()),
                log_level: LevelFilter::Info,
            },
        }
    }
}

// ── Loading ──

/// Smallest board that still fits the starting snake beside the panel.
const MIN_GRID_W: u32 = 10;
const MIN_GRID_H: u32 = 8;

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// No file anywhere means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match find_config(&candidate_dirs()) {
            Some(path) => GameConfig::from_file(&path),
            None => Ok(GameConfig::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        GameConfig::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: TomlConfig = toml::from_str(text)?;
        GameConfig::from_raw(raw)
    }

    fn from_raw(raw: TomlConfig) -> Result<Self, ConfigError> {
        let b = raw.board;
        if b.cell_size == 0 {
            return Err(ConfigError::Invalid("board.cell_size must be positive".into()));
        }
        let (cols, rows) = (b.canvas_width / b.cell_size, b.canvas_height / b.cell_size);
        if cols < MIN_GRID_W || rows < MIN_GRID_H {
            return Err(ConfigError::Invalid(format!(
                "board is {cols}x{rows} cells, need at least {MIN_GRID_W}x{MIN_GRID_H}"
            )));
        }
        if b.panel_width == 0 || b.panel_height == 0 || b.panel_width > cols - 6 || b.panel_height > rows {
            return Err(ConfigError::Invalid(format!(
                "panel {}x{} does not fit a {cols}x{rows} board",
                b.panel_width, b.panel_height
            )));
        }
        let board = BoardConfig {
            canvas_width: b.canvas_width,
            canvas_height: b.canvas_height,
            cell_size: b.cell_size,
            panel_width: b.panel_width,
            panel_height: b.panel_height,
        };
        // Every heart pixel must be reachable, or the round can never be won.
        let grid = Grid::from_config(&board);
        if let Some(c) = art::heart_cells(&grid).into_iter().find(|&c| !grid.contains(c) || grid.in_panel(c)) {
            return Err(ConfigError::Invalid(format!(
                "heart pixel ({}, {}) is off the board or under the panel",
                c.x, c.y
            )));
        }

        let s = raw.speed;
        if s.refresh_rate == 0 {
            return Err(ConfigError::Invalid("speed.refresh_rate must be positive".into()));
        }
        if s.min == 0 || s.min > s.max {
            return Err(ConfigError::Invalid(format!(
                "speed range {}..={} is empty or starts at zero",
                s.min, s.max
            )));
        }
        if s.flash_interval_ms == 0 {
            return Err(ConfigError::Invalid("speed.flash_interval_ms must be positive".into()));
        }

        let g = raw.general;
        let log_level: LevelFilter = g.log_level.parse().map_err(|_| {
            ConfigError::Invalid(format!("unknown log level '{}'", g.log_level))
        })?;

        Ok(GameConfig {
            board,
            speed: SpeedConfig {
                refresh_rate: s.refresh_rate,
                initial: s.initial.clamp(s.min, s.max),
                min: s.min,
                max: s.max,
                frame_ms: s.frame_ms,
                flash_interval_ms: s.flash_interval_ms,
            },
            rules: RulesConfig {
                collision_allowance: raw.rules.collision_allowance,
            },
            general: GeneralConfig {
                seed: g.seed,
                log_file: PathBuf::from(g.log_file),
                log_level,
            },
        })
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|path| path.is_file())
}
