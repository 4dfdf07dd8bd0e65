//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `seat`: Seat grid and occupancy types
//! - `train`: Trains and their stops
//! - `user`: Users and tickets
//! - `error`: Error types for the booking engine

pub mod error;
pub mod seat;
pub mod train;
pub mod user;

pub use error::BookingError;
pub use seat::{OccupancyState, SeatGrid};
pub use train::{Stop, Train, TrainId};
pub use user::{username_key, Ticket, TicketId, User};
