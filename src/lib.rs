//! Train Booking Engine Library
//! # Overview
//!
//! This library provides a seat reservation core for trains: users sign up
//! and log in, search trains by station pair, and book or cancel seats on a
//! fixed-size seat grid. Every change is written through to a pluggable
//! persistence store.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (SeatGrid, Train, User, Ticket, BookingError)
//! - [`config`] - Data directory and persistence timeout
//! - [`cli`] - CLI arguments, start-up wiring and the text menu
//! - [`core`] - Business logic components:
//!   - [`core::catalog`] - Known trains with one lock per train
//!   - [`core::directory`] - Users and their tickets
//!   - [`core::engine`] - Booking and cancellation across both
//!   - [`core::session`] - Per-user session state over the shared engine
//!   - [`core::audit`] - Consistency check between seat grids and tickets
//! - [`io`] - JSON and in-memory stores, text output
//!
//! # Booking Rules
//!
//! - A seat goes from free to booked only if it was free, under the train's lock
//! - Out-of-range seats are rejected before anything changes
//! - Every booked seat is referenced by exactly one ticket, except after a
//!   failed write, in which case the audit reports an orphaned seat
//! - Usernames are unique ignoring case; only password digests are stored

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod types;

pub use config::StoreConfig;
pub use core::{
    BookingEngine, BookingService, ConsistencyReport, PasswordHasher, PersistenceStore, Session,
    Sha256PasswordHasher,
};
pub use io::{InMemoryStore, JsonFileStore};
pub use types::{
    BookingError, OccupancyState, SeatGrid, Stop, Ticket, TicketId, Train, TrainId, User,
};
