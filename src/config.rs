// Configuration module for reading Snake.toml
// Holds the session settings the engine is constructed from plus the knobs
// used by the headless runner and the debug tick log.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::board::MAX_BOARD_CELLS;
use crate::types::Coord;

/// Failures while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub board: BoardConfig,
    pub timing: TimingConfig,
    pub rules: RulesConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub debug: DebugConfig,
}

/// Grid dimensions and fixed obstacles
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BoardConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub obstacles: Vec<Coord>,
}

impl BoardConfig {
    /// The cell the head starts on
    pub fn center(&self) -> Coord {
        Coord {
            x: (self.width / 2) as i32,
            y: (self.height / 2) as i32,
        }
    }
}

/// Tick timing
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TimingConfig {
    pub tick_interval_ms: u64,
    /// How often the headless runner polls `step()`; should be finer than a tick
    pub polling_interval_ms: u64,
}

/// Game rules
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RulesConfig {
    pub wrap_enabled: bool,
}

/// Per-session settings
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct SessionConfig {
    /// Fixed seed for food placement; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Tick cap for the headless runner, 0 means unlimited
    #[serde(default)]
    pub max_ticks: u64,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, ConfigError>` - Parsed and validated configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            board: BoardConfig {
                width: 30,
                height: 30,
                obstacles: Vec::new(),
            },
            timing: TimingConfig {
                tick_interval_ms: 100,
                polling_interval_ms: 10,
            },
            rules: RulesConfig { wrap_enabled: true },
            session: SessionConfig {
                seed: None,
                max_ticks: 0,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "snake_ticks.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Checks every value the engine relies on at construction time
    pub fn validate(&self) -> Result<(), ConfigError> {
        let board = &self.board;
        if board.width == 0 || board.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "board dimensions must be positive, got {}x{}",
                board.width, board.height
            )));
        }
        if i32::try_from(board.width).is_err() || i32::try_from(board.height).is_err() {
            return Err(ConfigError::Invalid(format!(
                "board dimensions {}x{} are too large",
                board.width, board.height
            )));
        }
        let cells = u64::from(board.width) * u64::from(board.height);
        if cells > MAX_BOARD_CELLS {
            return Err(ConfigError::Invalid(format!(
                "board {}x{} has {} cells, the limit is {}",
                board.width, board.height, cells, MAX_BOARD_CELLS
            )));
        }
        if self.timing.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be positive".to_string(),
            ));
        }

        let (width, height) = (board.width as i32, board.height as i32);
        let center = board.center();
        for obstacle in &board.obstacles {
            if !obstacle.in_bounds(width, height) {
                return Err(ConfigError::Invalid(format!(
                    "obstacle ({}, {}) is outside the {}x{} board",
                    obstacle.x, obstacle.y, width, height
                )));
            }
            if *obstacle == center {
                return Err(ConfigError::Invalid(format!(
                    "obstacle ({}, {}) blocks the starting cell",
                    obstacle.x, obstacle.y
                )));
            }
        }

        Ok(())
    }
}
