use mtc_emulator::{Radix, DEFAULT_CAPACITY};
use serde::{Deserialize, Deserializer};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read configuration file. ({0})")]
    Io(#[from] std::io::Error),

    #[error("Could not parse configuration file. ({0})")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of 16-bit cells in memory.
    pub memory_capacity: usize,
    /// Time between two steps.
    pub clock_interval_ms: u64,
    /// Stop after this many steps. Runs until an error when not set.
    pub max_steps: Option<u64>,
    #[serde(deserialize_with = "deserialize_radix")]
    pub radix: Radix,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_capacity: DEFAULT_CAPACITY,
            clock_interval_ms: 1000,
            max_steps: None,
            radix: Radix::Hexadecimal,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

fn deserialize_radix<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Radix, D::Error> {
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}
