//! Error types for the train booking engine
//!
//! This module defines every error that booking, authentication and
//! persistence operations can return. Errors are descriptive enough to be
//! shown directly by the menu front end.
//!
//! # Error Categories
//!
//! - **Session Errors**: duplicate usernames, bad credentials, missing login
//! - **Lookup Errors**: unknown trains or tickets
//! - **Seat Errors**: out-of-bounds indices, seats that are already booked
//! - **Persistence Errors**: I/O, serialization and timeout failures
//!
//! None of these errors are fatal. The front end reports them and keeps
//! running its loop.

use std::time::Duration;
use thiserror::Error;

/// Main error type for the booking engine
///
/// Each variant carries enough context to explain the failure without
/// consulting logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// A user with the same name (compared case-insensitively) already exists
    #[error("Username '{username}' is already taken")]
    DuplicateUsername {
        /// The rejected username as supplied
        username: String,
    },

    /// Unknown username or wrong password
    ///
    /// The two cases are deliberately indistinguishable.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The operation requires a logged-in session
    #[error("Please login first")]
    NotAuthenticated,

    /// A train or ticket could not be found
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// What was looked up ("Train" or "Ticket")
        kind: &'static str,
        /// The identifier that was not found
        id: String,
    },

    /// Row or column outside the seat grid
    ///
    /// Raised before any mutation is attempted.
    #[error("Seat ({row}, {col}) is outside the {rows}x{cols} seat grid")]
    OutOfBounds {
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
        /// Number of rows in the grid
        rows: usize,
        /// Number of columns in the grid
        cols: usize,
    },

    /// The requested seat is already booked
    ///
    /// This is an expected outcome, not a fault. The grid is left unchanged.
    #[error("Seat ({row}, {col}) on train {train_id} is already booked")]
    SeatUnavailable {
        /// Train the seat belongs to
        train_id: String,
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
    },

    /// Reading or writing durable records failed or timed out
    ///
    /// A timed-out write has an unknown outcome: it may still reach the
    /// store after the caller stopped waiting.
    #[error("Persistence failure: {message}")]
    PersistenceFailure {
        /// Description of the underlying failure
        message: String,
        /// Whether the call was abandoned at its deadline
        timed_out: bool,
    },

    /// Input rejected before reaching the core (empty names, etc.)
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Why the input was rejected
        message: String,
    },
}

// Conversion from io::Error to BookingError
impl From<std::io::Error> for BookingError {
    fn from(error: std::io::Error) -> Self {
        BookingError::PersistenceFailure {
            message: error.to_string(),
            timed_out: false,
        }
    }
}

// Conversion from serde_json::Error to BookingError
impl From<serde_json::Error> for BookingError {
    fn from(error: serde_json::Error) -> Self {
        BookingError::PersistenceFailure {
            message: format!("malformed record at line {}: {}", error.line(), error),
            timed_out: false,
        }
    }
}

// Helper functions for creating common errors

impl BookingError {
    /// Create a DuplicateUsername error
    pub fn duplicate_username(username: &str) -> Self {
        BookingError::DuplicateUsername {
            username: username.to_string(),
        }
    }

    /// Create a NotFound error for a train
    pub fn train_not_found(train_id: &str) -> Self {
        BookingError::NotFound {
            kind: "Train",
            id: train_id.to_string(),
        }
    }

    /// Create a NotFound error for a ticket
    pub fn ticket_not_found(ticket_id: &str) -> Self {
        BookingError::NotFound {
            kind: "Ticket",
            id: ticket_id.to_string(),
        }
    }

    /// Create an OutOfBounds error
    pub fn out_of_bounds(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        BookingError::OutOfBounds {
            row,
            col,
            rows,
            cols,
        }
    }

    /// Create a SeatUnavailable error
    pub fn seat_unavailable(train_id: &str, row: usize, col: usize) -> Self {
        BookingError::SeatUnavailable {
            train_id: train_id.to_string(),
            row,
            col,
        }
    }

    /// Create a PersistenceFailure error
    pub fn persistence(message: impl Into<String>) -> Self {
        BookingError::PersistenceFailure {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Create a PersistenceFailure for a call that hit its deadline
    pub fn persistence_timeout(operation: &str, timeout: Duration) -> Self {
        BookingError::PersistenceFailure {
            message: format!("{} timed out after {}ms", operation, timeout.as_millis()),
            timed_out: true,
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        BookingError::InvalidInput {
            message: message.into(),
        }
    }

    /// Whether this error means the train or ticket does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, BookingError::NotFound { .. })
    }

    /// Whether this error is a persistence call abandoned at its deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self, BookingError::PersistenceFailure { timed_out: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::duplicate_username(
        BookingError::DuplicateUsername { username: "alice".to_string() },
        "Username 'alice' is already taken"
    )]
    #[case::invalid_credentials(BookingError::InvalidCredentials, "Invalid username or password")]
    #[case::not_authenticated(BookingError::NotAuthenticated, "Please login first")]
    #[case::train_not_found(
        BookingError::NotFound { kind: "Train", id: "T9".to_string() },
        "Train 'T9' not found"
    )]
    #[case::out_of_bounds(
        BookingError::OutOfBounds { row: 3, col: 0, rows: 2, cols: 2 },
        "Seat (3, 0) is outside the 2x2 seat grid"
    )]
    #[case::seat_unavailable(
        BookingError::SeatUnavailable { train_id: "T1".to_string(), row: 0, col: 1 },
        "Seat (0, 1) on train T1 is already booked"
    )]
    #[case::persistence(
        BookingError::PersistenceFailure { message: "disk full".to_string(), timed_out: false },
        "Persistence failure: disk full"
    )]
    #[case::invalid_input(
        BookingError::InvalidInput { message: "username cannot be empty".to_string() },
        "Invalid input: username cannot be empty"
    )]
    fn test_error_display(#[case] error: BookingError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::duplicate_username(
        BookingError::duplicate_username("Bob"),
        BookingError::DuplicateUsername { username: "Bob".to_string() }
    )]
    #[case::train_not_found(
        BookingError::train_not_found("T1"),
        BookingError::NotFound { kind: "Train", id: "T1".to_string() }
    )]
    #[case::ticket_not_found(
        BookingError::ticket_not_found("abc"),
        BookingError::NotFound { kind: "Ticket", id: "abc".to_string() }
    )]
    #[case::seat_unavailable(
        BookingError::seat_unavailable("T1", 1, 2),
        BookingError::SeatUnavailable { train_id: "T1".to_string(), row: 1, col: 2 }
    )]
    fn test_helper_functions(#[case] result: BookingError, #[case] expected: BookingError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: BookingError = io_error.into();
        assert!(matches!(error, BookingError::PersistenceFailure { .. }));
        assert_eq!(error.to_string(), "Persistence failure: Permission denied");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<Vec<u8>>("[1, 2").unwrap_err();
        let error: BookingError = json_error.into();
        assert!(matches!(error, BookingError::PersistenceFailure { .. }));
    }

    #[test]
    fn test_is_not_found() {
        assert!(BookingError::ticket_not_found("x").is_not_found());
        assert!(!BookingError::NotAuthenticated.is_not_found());
    }

    #[test]
    fn test_timeout_is_marked() {
        let timeout = BookingError::persistence_timeout("save train", Duration::from_millis(250));
        assert!(timeout.is_timeout());
        assert_eq!(
            timeout.to_string(),
            "Persistence failure: save train timed out after 250ms"
        );
        assert!(!BookingError::persistence("disk full").is_timeout());
    }
}
