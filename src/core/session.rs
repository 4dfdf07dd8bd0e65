//! Session state machine over the booking engine
//!
//! `BookingService` is what a front end talks to. It pairs a shared
//! [`BookingEngine`] with the authentication state of one interactive
//! user:
//!
//! ```text
//!            login ok
//! Anonymous ─────────▶ Authenticated(user)
//!     ▲                     │
//!     └──────── logout ─────┘
//! ```
//!
//! Sign-up never changes the state. A failed login leaves it as it was.

use crate::core::audit::ConsistencyReport;
use crate::core::engine::BookingEngine;
use crate::core::traits::PersistenceStore;
use crate::types::{BookingError, OccupancyState, Ticket, Train, User};
use std::sync::Arc;
use tracing::info;

/// Authentication state of the current interactive user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    /// Logged in; holds a snapshot refreshed after every booking change
    Authenticated(User),
}

/// Session-scoped facade over a shared [`BookingEngine`]
pub struct BookingService<S> {
    engine: Arc<BookingEngine<S>>,
    session: Session,
}

impl<S: PersistenceStore> BookingService<S> {
    /// Start an anonymous session
    pub fn new(engine: Arc<BookingEngine<S>>) -> Self {
        BookingService {
            engine,
            session: Session::Anonymous,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn engine(&self) -> &Arc<BookingEngine<S>> {
        &self.engine
    }

    /// The logged-in user, if any
    pub fn current_user(&self) -> Option<&User> {
        match &self.session {
            Session::Authenticated(user) => Some(user),
            Session::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    fn username(&self) -> Result<String, BookingError> {
        self.current_user()
            .map(|user| user.username.clone())
            .ok_or(BookingError::NotAuthenticated)
    }

    /// Reload the session snapshot after the user's tickets changed
    async fn refresh(&mut self, username: &str) {
        if let Some(user) = self.engine.user(username).await {
            self.session = Session::Authenticated(user);
        }
    }

    /// Register a new user without logging in
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<User, BookingError> {
        self.engine.sign_up(username, password).await
    }

    /// Log in, replacing any current session on success
    pub async fn login(&mut self, username: &str, password: &str) -> Result<User, BookingError> {
        let user = self.engine.authenticate(username, password).await?;
        info!(username = %user.username, "login");
        self.session = Session::Authenticated(user.clone());
        Ok(user)
    }

    /// End the session; nothing is persisted
    pub fn logout(&mut self) {
        if let Session::Authenticated(user) = &self.session {
            info!(username = %user.username, "logout");
        }
        self.session = Session::Anonymous;
    }

    /// Book a seat for the logged-in user
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a session, otherwise whatever
    /// [`BookingEngine::book_seat`] reports.
    pub async fn book_seat(
        &mut self,
        train_id: &str,
        row: usize,
        col: usize,
    ) -> Result<Ticket, BookingError> {
        let username = self.username()?;
        let result = self.engine.book_seat(&username, train_id, row, col).await;
        self.refresh(&username).await;
        result
    }

    /// Cancel one of the logged-in user's tickets
    pub async fn cancel_booking(&mut self, ticket_id: &str) -> Result<Ticket, BookingError> {
        let username = self.username()?;
        let ticket_id = ticket_id.trim();
        if ticket_id.is_empty() {
            return Err(BookingError::invalid_input("ticket id cannot be empty"));
        }
        let result = self.engine.cancel_booking(&username, ticket_id).await;
        self.refresh(&username).await;
        result
    }

    /// The logged-in user's tickets in booking order
    pub async fn fetch_bookings(&self) -> Result<Vec<Ticket>, BookingError> {
        let username = self.username()?;
        self.engine.tickets(&username).await
    }

    /// Trains from `source` to `destination`; no login needed
    pub async fn search_trains(&self, source: &str, destination: &str) -> Vec<Train> {
        self.engine.find_route(source, destination).await
    }

    /// Seat occupancy rows of a train; no login needed
    pub async fn seat_map(&self, train_id: &str) -> Result<Vec<Vec<OccupancyState>>, BookingError> {
        self.engine.seat_map(train_id).await
    }

    /// Grid/ticket consistency report
    pub async fn audit(&self) -> ConsistencyReport {
        self.engine.audit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::core::password::Sha256PasswordHasher;
    use crate::io::InMemoryStore;
    use crate::types::{SeatGrid, Stop};
    use std::time::Duration;

    async fn service() -> BookingService<InMemoryStore> {
        let engine = BookingEngine::open(
            Arc::new(InMemoryStore::new()),
            Box::new(Sha256PasswordHasher::with_iterations(4)),
            &StoreConfig::new("unused", Duration::from_secs(1)),
        )
        .await
        .unwrap();
        engine
            .add_train(Train::new(
                "T1",
                vec![Stop::new("A", "08:00"), Stop::new("C", "10:00")],
                SeatGrid::new(2, 2),
            ))
            .await
            .unwrap();
        BookingService::new(Arc::new(engine))
    }

    #[tokio::test]
    async fn test_anonymous_session_is_rejected() {
        let mut service = service().await;

        assert_eq!(
            service.book_seat("T1", 0, 0).await,
            Err(BookingError::NotAuthenticated)
        );
        assert_eq!(
            service.cancel_booking("t").await,
            Err(BookingError::NotAuthenticated)
        );
        assert_eq!(
            service.fetch_bookings().await,
            Err(BookingError::NotAuthenticated)
        );
        // Browsing does not need a session
        assert_eq!(service.search_trains("A", "C").await.len(), 1);
        assert!(service.seat_map("T1").await.is_ok());
    }

    #[tokio::test]
    async fn test_sign_up_does_not_log_in() {
        let service = service().await;
        service.sign_up("Alice", "pw").await.unwrap();
        assert_eq!(service.session(), &Session::Anonymous);
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_ignores_case() {
        let service = service().await;
        service.sign_up("Alice", "pw").await.unwrap();
        assert_eq!(
            service.sign_up("alice", "other").await,
            Err(BookingError::duplicate_username("alice"))
        );
    }

    #[tokio::test]
    async fn test_login_logout_transitions() {
        let mut service = service().await;
        service.sign_up("alice", "pw").await.unwrap();

        assert_eq!(
            service.login("alice", "nope").await,
            Err(BookingError::InvalidCredentials)
        );
        assert!(!service.is_authenticated());

        service.login("Alice", "pw").await.unwrap();
        assert_eq!(service.current_user().unwrap().username, "alice");

        service.logout();
        assert_eq!(service.session(), &Session::Anonymous);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let mut service = service().await;
        service.sign_up("alice", "pw").await.unwrap();
        service.login("alice", "pw").await.unwrap();

        assert!(service.login("bob", "pw").await.is_err());
        assert_eq!(service.current_user().unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_booking_scenario() {
        let mut service = service().await;
        service.sign_up("alice", "pw").await.unwrap();
        service.login("alice", "pw").await.unwrap();

        let ticket = service.book_seat("T1", 0, 0).await.unwrap();
        assert_eq!(service.current_user().unwrap().tickets, vec![ticket.clone()]);

        assert_eq!(
            service.book_seat("T1", 0, 0).await,
            Err(BookingError::seat_unavailable("T1", 0, 0))
        );
        assert_eq!(service.fetch_bookings().await.unwrap().len(), 1);

        service.cancel_booking(&ticket.ticket_id).await.unwrap();
        assert!(service.current_user().unwrap().tickets.is_empty());
        assert_eq!(
            service.seat_map("T1").await.unwrap(),
            vec![vec![OccupancyState::Free; 2]; 2]
        );
    }

    #[tokio::test]
    async fn test_cancel_rejects_blank_ticket_id() {
        let mut service = service().await;
        service.sign_up("alice", "pw").await.unwrap();
        service.login("alice", "pw").await.unwrap();

        assert!(matches!(
            service.cancel_booking("  ").await,
            Err(BookingError::InvalidInput { .. })
        ));
    }
}
