//! Booking engine
//!
//! This module provides the `BookingEngine`, which orchestrates seat
//! bookings by coordinating the `TrainCatalog` and the `UserDirectory`. It
//! is the only code path that changes a seat grid and a ticket list
//! together.
//!
//! The engine enforces these rules:
//! - Seat indices are validated before any mutation
//! - A seat moves Free → Booked only through `SeatGrid::try_occupy`, under
//!   the train's exclusive lock
//! - Booking persists the train first, then the users
//! - Cancellation persists the users first, then the train
//! - A failed write rolls back the in-memory change; a failed rollback is
//!   logged as an orphaned seat
//! - A timed-out write is never rolled back against a later write that it
//!   could still overtake. At worst this leaves an orphaned seat, never a
//!   ticket for a free seat
//!
//! The engine takes explicit usernames and holds no session state. See
//! [`BookingService`](crate::core::BookingService) for the session layer.

use crate::config::StoreConfig;
use crate::core::audit::{reconcile, ConsistencyReport};
use crate::core::catalog::TrainCatalog;
use crate::core::directory::UserDirectory;
use crate::core::traits::{PasswordHasher, PersistenceStore};
use crate::types::{BookingError, OccupancyState, Ticket, Train, User};
use std::sync::Arc;
use tracing::{info, warn};

/// Seat booking engine shared by every session
pub struct BookingEngine<S> {
    catalog: TrainCatalog<S>,
    directory: UserDirectory<S>,
    hasher: Box<dyn PasswordHasher>,
}

impl<S: PersistenceStore> BookingEngine<S> {
    /// Load trains and users from the store and build an engine
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if either record set cannot be loaded.
    pub async fn open(
        store: Arc<S>,
        hasher: Box<dyn PasswordHasher>,
        config: &StoreConfig,
    ) -> Result<Self, BookingError> {
        let catalog = TrainCatalog::load(store.clone(), config.persist_timeout).await?;
        let directory = UserDirectory::load(store, config.persist_timeout).await?;
        Ok(Self::from_parts(catalog, directory, hasher))
    }

    /// Assemble an engine from an existing catalog and directory
    pub fn from_parts(
        catalog: TrainCatalog<S>,
        directory: UserDirectory<S>,
        hasher: Box<dyn PasswordHasher>,
    ) -> Self {
        BookingEngine {
            catalog,
            directory,
            hasher,
        }
    }

    pub fn catalog(&self) -> &TrainCatalog<S> {
        &self.catalog
    }

    pub fn directory(&self) -> &UserDirectory<S> {
        &self.directory
    }

    /// Register a new user with an empty ticket list
    ///
    /// The username is trimmed; the password is only handed to the hasher.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty username or password
    /// - `DuplicateUsername` if the name is taken, ignoring case
    /// - `PersistenceFailure` if the user could not be saved
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<User, BookingError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(BookingError::invalid_input("username cannot be empty"));
        }
        if password.is_empty() {
            return Err(BookingError::invalid_input("password cannot be empty"));
        }
        if self.directory.find(username).await.is_some() {
            return Err(BookingError::duplicate_username(username));
        }

        let user = self
            .directory
            .insert(User::new(username, self.hasher.hash(password)))
            .await?;
        info!(username = %user.username, "registered user");
        Ok(user)
    }

    /// Check credentials and return the stored user
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for an unknown name or a wrong password.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, BookingError> {
        let user = self
            .directory
            .find(username.trim())
            .await
            .ok_or(BookingError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash) {
            return Err(BookingError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Book one seat for a user
    ///
    /// Runs entirely under the train's lock: occupy the cell, persist the
    /// train, append the ticket and persist the users.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` if the user does not exist
    /// - `NotFound` if the train does not exist
    /// - `OutOfBounds` for indices outside the grid (nothing is mutated)
    /// - `SeatUnavailable` if the seat is already booked (nothing is mutated)
    /// - `PersistenceFailure` if either write fails; the booking is undone.
    ///   If the users write timed out the seat stays booked without a
    ///   ticket, since that write may still complete
    pub async fn book_seat(
        &self,
        username: &str,
        train_id: &str,
        row: usize,
        col: usize,
    ) -> Result<Ticket, BookingError> {
        if self.directory.find(username).await.is_none() {
            return Err(BookingError::InvalidCredentials);
        }

        let mut train = self.catalog.lock(train_id).await?;

        if !train.seats.try_occupy(row, col)? {
            return Err(BookingError::seat_unavailable(train_id, row, col));
        }

        if let Err(e) = self.catalog.persist(&train).await {
            train.seats.release(row, col)?;
            warn!(train_id, row, col, error = %e, "train write failed, booking undone");
            return Err(e);
        }

        let ticket = Ticket::issue(train.train_id.clone(), row, col);
        if let Err(e) = self.directory.append_ticket(username, ticket.clone()).await {
            if e.is_timeout() {
                // The users write may still land; the seat stays booked
                warn!(
                    train_id,
                    row,
                    col,
                    error = %e,
                    "orphaned seat: user write timed out, seat kept booked"
                );
                return Err(e);
            }
            train.seats.release(row, col)?;
            match self.catalog.persist(&train).await {
                Ok(()) => warn!(train_id, row, col, error = %e, "user write failed, booking undone"),
                Err(revert) => warn!(
                    train_id,
                    row,
                    col,
                    error = %e,
                    revert_error = %revert,
                    "orphaned seat: booked on disk with no ticket"
                ),
            }
            return Err(e);
        }

        info!(
            username,
            train_id,
            row,
            col,
            ticket_id = %ticket.ticket_id,
            "seat booked"
        );
        Ok(ticket)
    }

    /// Cancel one of a user's tickets and free its seat
    ///
    /// A seat that is already free is tolerated: it points at an earlier
    /// partial failure, not at a caller error. A ticket whose train no
    /// longer exists is simply removed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user holds no ticket with this id
    /// - `PersistenceFailure` if either write fails; the ticket is restored.
    ///   If the train write timed out the ticket stays cancelled, since that
    ///   write may still complete
    pub async fn cancel_booking(
        &self,
        username: &str,
        ticket_id: &str,
    ) -> Result<Ticket, BookingError> {
        let ticket = self
            .directory
            .ticket(username, ticket_id)
            .await
            .ok_or_else(|| BookingError::ticket_not_found(ticket_id))?;

        let mut train = match self.catalog.lock(&ticket.train_id).await {
            Ok(guard) => Some(guard),
            Err(e) if e.is_not_found() => {
                warn!(ticket_id, train_id = %ticket.train_id, "ticket refers to unknown train");
                None
            }
            Err(e) => return Err(e),
        };

        let (position, ticket) = self.directory.remove_ticket(username, ticket_id).await?;

        let Some(train) = train.as_mut() else {
            return Ok(ticket);
        };

        match train.seats.release(ticket.row, ticket.col) {
            Ok(true) => {}
            Ok(false) => {
                warn!(ticket_id, row = ticket.row, col = ticket.col, "seat was already free");
                return Ok(ticket);
            }
            Err(e) => {
                warn!(ticket_id, error = %e, "ticket seat outside grid");
                return Ok(ticket);
            }
        }

        if let Err(e) = self.catalog.persist(train).await {
            if e.is_timeout() {
                // The freed seat may still land on disk; the ticket stays cancelled
                warn!(
                    train_id = %ticket.train_id,
                    row = ticket.row,
                    col = ticket.col,
                    error = %e,
                    "train write timed out, cancellation kept"
                );
                return Err(e);
            }
            train.seats.try_occupy(ticket.row, ticket.col)?;
            if let Err(restore) = self
                .directory
                .restore_ticket(username, position, ticket.clone())
                .await
            {
                warn!(
                    train_id = %ticket.train_id,
                    row = ticket.row,
                    col = ticket.col,
                    error = %e,
                    restore_error = %restore,
                    "orphaned seat: ticket removed on disk but seat still booked"
                );
            }
            return Err(e);
        }

        info!(username, ticket_id, train_id = %ticket.train_id, "booking cancelled");
        Ok(ticket)
    }

    /// Snapshot of a user
    pub async fn user(&self, username: &str) -> Option<User> {
        self.directory.find(username).await
    }

    /// A user's tickets in booking order
    pub async fn tickets(&self, username: &str) -> Result<Vec<Ticket>, BookingError> {
        self.directory
            .find(username)
            .await
            .map(|user| user.tickets)
            .ok_or(BookingError::InvalidCredentials)
    }

    /// Trains from `source` to `destination`
    pub async fn find_route(&self, source: &str, destination: &str) -> Vec<Train> {
        self.catalog.find_route(source, destination).await
    }

    /// Snapshot of one train
    pub async fn train(&self, train_id: &str) -> Result<Train, BookingError> {
        self.catalog.by_id(train_id).await
    }

    /// Seat occupancy rows of one train
    pub async fn seat_map(&self, train_id: &str) -> Result<Vec<Vec<OccupancyState>>, BookingError> {
        Ok(self.catalog.by_id(train_id).await?.seats.snapshot())
    }

    /// Insert or overwrite a train
    pub async fn add_train(&self, train: Train) -> Result<(), BookingError> {
        let train_id = train.train_id.clone();
        self.catalog.upsert(train).await?;
        info!(train_id = %train_id, "train registered");
        Ok(())
    }

    /// Register seed trains whose ids are not known yet
    ///
    /// Existing trains keep their current seat state.
    ///
    /// # Returns
    ///
    /// The number of trains added.
    pub async fn seed_trains(&self, trains: Vec<Train>) -> Result<usize, BookingError> {
        let mut added = 0;
        for train in trains {
            if self.catalog.contains(&train.train_id) {
                continue;
            }
            self.add_train(train).await?;
            added += 1;
        }
        Ok(added)
    }

    /// Compare every seat grid with every ticket
    ///
    /// Takes a snapshot of each side separately, so under concurrent
    /// bookings the report may include transient differences.
    pub async fn audit(&self) -> ConsistencyReport {
        let mut trains = Vec::with_capacity(self.catalog.len());
        for train_id in self.catalog.train_ids() {
            if let Ok(train) = self.catalog.by_id(&train_id).await {
                trains.push(train);
            }
        }
        let users = self.directory.all().await;

        let report = reconcile(&trains, &users);
        for seat in &report.orphaned_seats {
            warn!(seat = %seat, "orphaned seat");
        }
        for username in &report.duplicate_usernames {
            warn!(username = %username, "duplicate username");
        }
        report
    }
}
