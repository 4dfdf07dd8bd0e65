//! Core traits for persistence and password hashing
//!
//! The booking core only talks to durable storage and credential digests
//! through these traits, so the storage medium and hashing scheme can be
//! swapped without touching business logic.

use crate::types::{BookingError, Train, User};
use std::future::Future;
use std::time::Duration;

/// Durable storage for user and train records
///
/// Implementations own the underlying medium exclusively. Loading from a
/// store that has never been written must yield an empty collection rather
/// than an error.
pub trait PersistenceStore: Send + Sync + 'static {
    /// Load every user record
    fn load_users(&self) -> impl Future<Output = Result<Vec<User>, BookingError>> + Send;

    /// Replace the full set of user records
    fn save_users(&self, users: Vec<User>)
        -> impl Future<Output = Result<(), BookingError>> + Send;

    /// Load every train record in storage order
    fn load_trains(&self) -> impl Future<Output = Result<Vec<Train>, BookingError>> + Send;

    /// Insert or overwrite one train record, keyed by its id
    fn save_train(&self, train: Train) -> impl Future<Output = Result<(), BookingError>> + Send;
}

/// One-way password digests
///
/// The core never stores or compares plaintext passwords; it only hands them
/// to the hasher.
pub trait PasswordHasher: Send + Sync {
    /// Produce a digest suitable for storage
    fn hash(&self, plaintext: &str) -> String;

    /// Check a plaintext candidate against a stored digest
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Run a persistence call under a time bound
///
/// Expiry is reported as a timed-out `PersistenceFailure` naming the
/// operation. The abandoned call may still complete in the store.
pub(crate) async fn persist_within<T, F>(
    timeout: Duration,
    operation: &str,
    fut: F,
) -> Result<T, BookingError>
where
    F: Future<Output = Result<T, BookingError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(BookingError::persistence_timeout(operation, timeout)),
    }
}
