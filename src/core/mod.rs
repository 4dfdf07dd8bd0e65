//! Core business logic module
//!
//! This module contains the seat booking components:
//! - `traits` - Persistence and password hashing abstractions
//! - `catalog` - Train catalog with per-train locks and route search
//! - `directory` - Write-through user directory
//! - `engine` - Booking and cancellation orchestration
//! - `session` - Session state machine used by front ends
//! - `audit` - Grid/ticket consistency report
//! - `password` - Default salted SHA-256 password hasher

pub mod audit;
pub mod catalog;
pub mod directory;
pub mod engine;
pub mod password;
pub mod session;
pub mod traits;

pub use audit::{ConsistencyReport, DanglingReason, DanglingTicket, SeatRef};
pub use catalog::TrainCatalog;
pub use directory::UserDirectory;
pub use engine::BookingEngine;
pub use password::Sha256PasswordHasher;
pub use session::{BookingService, Session};
pub use traits::{PasswordHasher, PersistenceStore};
