//! Train booking CLI
//!
//! Interactive menu for signing up, searching trains and booking or
//! cancelling seats. Records live as JSON files in a data directory.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- --data-dir /var/lib/trains
//! cargo run -- --seed demos/trains.json --timeout-ms 2000
//! RUST_LOG=train_booking_engine=info cargo run
//! ```
//!
//! The menu reads commands from stdin and writes to stdout. Logs go to
//! stderr.
//!
//! # Exit Codes
//!
//! - 0: Exit chosen from the menu, or end of input
//! - 1: Start-up failure (unreadable data directory, bad seed file, etc.)

use std::io;
use std::process;
use train_booking_engine::cli::{self, Menu};

fn main() {
    cli::init_tracing();
    let args = cli::parse_args();
    let config = args.to_store_config();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let service = match runtime.block_on(cli::open_service(&config, args.seed.as_deref())) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut menu = Menu::new(runtime.handle().clone(), service, stdin.lock(), io::stdout());
    if let Err(e) = menu.run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
