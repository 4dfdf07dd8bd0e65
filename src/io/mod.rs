//! I/O module
//!
//! Handles durable records and text output.
//!
//! # Components
//!
//! - `json_store` - JSON flat-file `PersistenceStore`
//! - `memory_store` - In-memory `PersistenceStore`
//! - `csv_format` - Ticket CSV output and seat map rendering

pub mod csv_format;
pub mod json_store;
pub mod memory_store;

pub use csv_format::{format_seat_map, format_train, write_tickets_csv};
pub use json_store::{read_train_seed, JsonFileStore};
pub use memory_store::InMemoryStore;
