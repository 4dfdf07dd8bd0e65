// CLI module
// Argument parsing, start-up wiring and the interactive menu

mod args;
mod menu;

pub use args::CliArgs;
pub use menu::Menu;

use crate::config::StoreConfig;
use crate::core::{BookingEngine, BookingService, Sha256PasswordHasher};
use crate::io::{read_train_seed, JsonFileStore};
use crate::types::BookingError;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "train_booking_engine=warn";

/// Parse command-line arguments using clap
///
/// If parsing fails (e.g., invalid arguments or the --help flag), clap
/// displays an error message or help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Install the global tracing subscriber
///
/// Logs go to stderr so they never mix with menu output on stdout.
/// `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`].
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Open the JSON store, load the engine and apply an optional seed file
///
/// # Arguments
///
/// * `config` - Data directory and persistence timeout
/// * `seed` - Optional JSON file of trains; only unknown train ids are added
///
/// # Returns
///
/// An anonymous [`BookingService`] ready for the menu.
///
/// # Errors
///
/// `PersistenceFailure` if the record files or the seed cannot be read.
pub async fn open_service(
    config: &StoreConfig,
    seed: Option<&Path>,
) -> Result<BookingService<JsonFileStore>, BookingError> {
    let store = Arc::new(JsonFileStore::from_config(config));
    let engine = BookingEngine::open(store, Box::new(Sha256PasswordHasher::default()), config).await?;

    if let Some(path) = seed {
        let trains = read_train_seed(path).await?;
        let added = engine.seed_trains(trains).await?;
        info!(seed = %path.display(), added, "seeded train catalog");
    }

    info!(
        data_dir = %config.data_dir.display(),
        trains = engine.catalog().len(),
        users = engine.directory().len().await,
        "booking engine ready"
    );
    Ok(BookingService::new(Arc::new(engine)))
}
