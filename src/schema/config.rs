/// Run configuration: explicit values threaded through the tools and bot.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::order::{InvalidOrder, Order};

/// Default walk budget per sentence before generation gives up.
pub const DEFAULT_MAX_STEPS: usize = 100_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("{0}")]
    InvalidOrder(#[from] InvalidOrder),
}

/// Settings for one training + generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaneyConfig {
    pub order: Order,
    /// Sentences generated per round.
    pub count: usize,
    /// Fixed RNG seed; `None` draws one from entropy.
    pub seed: Option<u64>,
    /// Truncate quotes to at most this many words.
    pub word_limit: Option<usize>,
    /// Walk iterations allowed per sentence.
    pub max_steps: usize,
    pub verbose: bool,
}

impl Default for ShaneyConfig {
    fn default() -> Self {
        Self {
            order: Order::Second,
            count: 10,
            seed: None,
            word_limit: None,
            max_steps: DEFAULT_MAX_STEPS,
            verbose: false,
        }
    }
}

impl ShaneyConfig {
    /// Parse a configuration from a RON string.
    pub fn parse_ron(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    /// Load a configuration from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }
}
