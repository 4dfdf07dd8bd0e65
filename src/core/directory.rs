//! User directory
//!
//! This module provides the `UserDirectory`, the write-through map from
//! usernames to credentials and ticket history.
//!
//! The directory is responsible for:
//! - Enforcing case-insensitive username uniqueness
//! - Appending and removing tickets on behalf of the booking engine
//! - Persisting the full user set after every mutation, undoing the
//!   in-memory change if the write fails
//!
//! All users sit behind one mutex. Every mutation of any user's ticket list
//! is therefore serialized, which also covers concurrent sessions for the
//! same user.

use crate::core::audit::duplicate_usernames;
use crate::core::traits::{persist_within, PersistenceStore};
use crate::types::{BookingError, Ticket, User};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Write-through store of registered users
pub struct UserDirectory<S> {
    store: Arc<S>,
    timeout: Duration,
    /// Users in registration order
    users: Mutex<Vec<User>>,
}

impl<S: PersistenceStore> UserDirectory<S> {
    /// Build a directory from users already loaded
    pub fn new(store: Arc<S>, timeout: Duration, users: Vec<User>) -> Self {
        UserDirectory {
            store,
            timeout,
            users: Mutex::new(users),
        }
    }

    /// Load every persisted user into a new directory
    pub async fn load(store: Arc<S>, timeout: Duration) -> Result<Self, BookingError> {
        let users = persist_within(timeout, "load users", store.load_users()).await?;
        for username in duplicate_usernames(&users) {
            warn!(username = %username, "stored username collides with another ignoring case");
        }
        debug!(count = users.len(), "loaded user directory");
        Ok(Self::new(store, timeout, users))
    }

    async fn persist(&self, users: &[User]) -> Result<(), BookingError> {
        persist_within(
            self.timeout,
            "save users",
            self.store.save_users(users.to_vec()),
        )
        .await
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// - `DuplicateUsername` if the name matches an existing user, ignoring case
    /// - `PersistenceFailure` if the write fails; the user is not registered
    pub async fn insert(&self, user: User) -> Result<User, BookingError> {
        let mut users = self.users.lock().await;

        if users.iter().any(|u| u.has_name(&user.username)) {
            return Err(BookingError::duplicate_username(&user.username));
        }

        users.push(user.clone());
        if let Err(e) = self.persist(&users).await {
            users.pop();
            return Err(e);
        }
        Ok(user)
    }

    /// Snapshot of one user, looked up case-insensitively
    pub async fn find(&self, username: &str) -> Option<User> {
        let users = self.users.lock().await;
        users.iter().find(|u| u.has_name(username)).cloned()
    }

    /// Snapshot of one of a user's tickets
    pub async fn ticket(&self, username: &str, ticket_id: &str) -> Option<Ticket> {
        let users = self.users.lock().await;
        users
            .iter()
            .find(|u| u.has_name(username))
            .and_then(|u| u.ticket(ticket_id))
            .cloned()
    }

    /// Append a ticket to a user and persist
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` if the user no longer exists
    /// - `PersistenceFailure` if the write fails; the ticket is not kept
    pub async fn append_ticket(&self, username: &str, ticket: Ticket) -> Result<(), BookingError> {
        let mut users = self.users.lock().await;
        let idx = users
            .iter()
            .position(|u| u.has_name(username))
            .ok_or(BookingError::InvalidCredentials)?;

        users[idx].tickets.push(ticket);
        if let Err(e) = self.persist(&users).await {
            users[idx].tickets.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Remove a ticket from a user and persist
    ///
    /// Returns the removed ticket and the position it occupied, so a caller
    /// can put it back with [`restore_ticket`](Self::restore_ticket).
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user holds no ticket with this id
    /// - `PersistenceFailure` if the write fails; the ticket stays in place
    pub async fn remove_ticket(
        &self,
        username: &str,
        ticket_id: &str,
    ) -> Result<(usize, Ticket), BookingError> {
        let mut users = self.users.lock().await;
        let idx = users
            .iter()
            .position(|u| u.has_name(username))
            .ok_or_else(|| BookingError::ticket_not_found(ticket_id))?;

        let (position, ticket) = users[idx]
            .remove_ticket(ticket_id)
            .ok_or_else(|| BookingError::ticket_not_found(ticket_id))?;

        if let Err(e) = self.persist(&users).await {
            users[idx].tickets.insert(position, ticket);
            return Err(e);
        }
        Ok((position, ticket))
    }

    /// Put a previously removed ticket back at its old position
    ///
    /// The in-memory restore always happens; the returned result only
    /// reports whether it also reached the store.
    pub async fn restore_ticket(
        &self,
        username: &str,
        position: usize,
        ticket: Ticket,
    ) -> Result<(), BookingError> {
        let mut users = self.users.lock().await;
        let idx = users
            .iter()
            .position(|u| u.has_name(username))
            .ok_or(BookingError::InvalidCredentials)?;

        let tickets = &mut users[idx].tickets;
        tickets.insert(position.min(tickets.len()), ticket);
        self.persist(&users).await
    }

    /// Snapshot of every user
    pub async fn all(&self) -> Vec<User> {
        self.users.lock().await.clone()
    }

    /// Number of registered users
    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    /// Whether no user is registered yet
    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}
