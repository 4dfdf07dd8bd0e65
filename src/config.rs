//! Runtime configuration for the booking engine
//!
//! `StoreConfig` carries where records live and how long a single
//! persistence call may take. It is built from CLI arguments by
//! [`CliArgs::to_store_config`](crate::cli::CliArgs::to_store_config).

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Default directory for `users.json` and `trains.json`
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default bound on a single persistence call
pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage location and persistence timeout
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the flat record files
    pub data_dir: PathBuf,
    /// Upper bound for each load or save
    pub persist_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            persist_timeout: DEFAULT_PERSIST_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// Create a StoreConfig with custom values
    ///
    /// A zero timeout would fail every write, so it falls back to the
    /// default with a warning.
    pub fn new(data_dir: impl Into<PathBuf>, persist_timeout: Duration) -> Self {
        let persist_timeout = if persist_timeout.is_zero() {
            warn!(
                "Invalid persist timeout (0ms), using default ({}ms)",
                DEFAULT_PERSIST_TIMEOUT.as_millis()
            );
            DEFAULT_PERSIST_TIMEOUT
        } else {
            persist_timeout
        };

        Self {
            data_dir: data_dir.into(),
            persist_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.persist_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_timeout_falls_back() {
        let config = StoreConfig::new("records", Duration::ZERO);
        assert_eq!(config.data_dir, PathBuf::from("records"));
        assert_eq!(config.persist_timeout, DEFAULT_PERSIST_TIMEOUT);
    }

    #[test]
    fn test_custom_timeout_kept() {
        let config = StoreConfig::new("records", Duration::from_millis(250));
        assert_eq!(config.persist_timeout, Duration::from_millis(250));
    }
}
