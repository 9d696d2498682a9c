// bingo/src/config.rs
// Game configuration read from a simple `key = value` file.

use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::error::BingoError;
use crate::evaluator::{Rules, WinMode};
use crate::logging::{log_info, log_warning};
use crate::ranker::NearWinnerStrategy;

pub const DEFAULT_CONFIG_PATH: &str = "conf/bingo.conf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub mode: WinMode,
    pub near_threshold: usize,
    pub near_strategy: NearWinnerStrategy,
    pub players: usize,
    // how many draws a simulated player waits before covering a number
    pub marking_lag: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: WinMode::default(),
            near_threshold: 3,
            near_strategy: NearWinnerStrategy::default(),
            players: 4,
            marking_lag: 1,
        }
    }
}

impl GameConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let content = fs::read_to_string(path)?;
        Self::from_str_content(&content)
    }

    pub fn from_str_content(content: &str) -> Result<Self, Box<dyn Error>> {
        let config_map = parse_config(content);
        let defaults = Self::default();

        let mode = match config_map.get("mode") {
            Some(value) => value.parse::<WinMode>()?,
            None => defaults.mode,
        };

        let near_threshold = match config_map.get("near_threshold") {
            Some(value) => value.parse::<usize>()?,
            None => defaults.near_threshold,
        };
        if near_threshold == 0 {
            return Err(BingoError::InvalidThreshold.into());
        }

        let near_strategy = match config_map.get("near_strategy") {
            Some(value) => value.parse::<NearWinnerStrategy>()?,
            None => defaults.near_strategy,
        };

        let players = config_map
            .get("players")
            .map(|p| p.parse::<usize>())
            .transpose()?
            .unwrap_or(defaults.players);

        let marking_lag = config_map
            .get("marking_lag")
            .map(|l| l.parse::<usize>())
            .transpose()?
            .unwrap_or(defaults.marking_lag);

        Ok(GameConfig { mode, near_threshold, near_strategy, players, marking_lag })
    }

    pub fn load_or_default() -> Self {
        match Self::from_file(DEFAULT_CONFIG_PATH) {
            Ok(config) => {
                log_info(&format!("Loaded game configuration from {DEFAULT_CONFIG_PATH}"));
                config
            }
            Err(e) => {
                log_warning(&format!(
                    "Could not load game config from {DEFAULT_CONFIG_PATH}: {e}. Using defaults."
                ));
                Self::default()
            }
        }
    }

    pub fn rules(&self) -> Result<Rules, BingoError> {
        Rules::new(self.mode, self.near_threshold, self.near_strategy)
    }
}

fn parse_config(content: &str) -> HashMap<String, String> {
    let mut config = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            config.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    config
}
