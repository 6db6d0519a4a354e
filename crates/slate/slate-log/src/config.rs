use crate::Logger;
use serde::Deserialize;
use std::path::Path;

/// TOML-loadable logger settings.
///
/// Archiving is enabled by giving `max_file_size`; `max_archives` then
/// bounds the chain (default 3).
#[derive(Deserialize, Debug)]
pub struct LoggerConfig {
    pub path: String,
    #[serde(default = "defaults::ring_bytes")]
    pub ring_bytes: usize,
    #[serde(default)]
    pub max_file_size: Option<u64>,
    #[serde(default = "defaults::max_archives")]
    pub max_archives: u32,
    #[serde(default = "defaults::include_date")]
    pub include_date: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

mod defaults {
    pub fn ring_bytes() -> usize {
        1 << 20
    }

    pub fn max_archives() -> u32 {
        3
    }

    pub fn include_date() -> bool {
        true
    }
}

impl LoggerConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: LoggerConfig = toml::from_str(&raw)?;
        Ok(config)
    }
}

impl Logger {
    /// An inert handle carrying the config's settings; open it with
    /// `config.path`.
    pub fn from_config(config: &LoggerConfig) -> Logger {
        let mut logger = Logger::new();
        logger.set_ring_size(config.ring_bytes);
        if let Some(max_file_size) = config.max_file_size {
            logger.set_archive(max_file_size, config.max_archives);
        }
        logger.set_include_date(config.include_date);
        logger
    }
}
