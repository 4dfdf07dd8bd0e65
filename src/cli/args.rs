use crate::config::{StoreConfig, DEFAULT_DATA_DIR, DEFAULT_PERSIST_TIMEOUT};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Book train seats from a terminal menu
#[derive(Parser, Debug)]
#[command(name = "train-booking")]
#[command(about = "Search trains, book seats and cancel bookings from a terminal menu", long_about = None)]
pub struct CliArgs {
    /// Directory holding users.json and trains.json
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        default_value = DEFAULT_DATA_DIR,
        help = "Directory holding users.json and trains.json (created if missing)"
    )]
    pub data_dir: PathBuf,

    /// Upper bound for a single load or save, in milliseconds
    #[arg(
        long = "timeout-ms",
        value_name = "MILLIS",
        help = "Timeout for each persistence call in milliseconds (default: 5000)"
    )]
    pub timeout_ms: Option<u64>,

    /// JSON file of trains to add to the catalog at start-up
    #[arg(
        long = "seed",
        value_name = "FILE",
        help = "JSON array of trains; only ids missing from the catalog are added"
    )]
    pub seed: Option<PathBuf>,
}

impl CliArgs {
    /// Create a StoreConfig from CLI arguments
    ///
    /// Falls back to the default timeout when none is given. Invalid values
    /// are corrected (with a warning) by `StoreConfig::new`.
    pub fn to_store_config(&self) -> StoreConfig {
        let timeout = self
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PERSIST_TIMEOUT);
        StoreConfig::new(&self.data_dir, timeout)
    }
}
