//! User and ticket types for the train booking engine
//!
//! Users own an ordered list of tickets; insertion order is booking order.
//! Usernames are unique when compared case-insensitively, so every lookup
//! goes through [`username_key`].

use super::train::TrainId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ticket identifier (UUID v4 rendered as a string)
pub type TicketId = String;

/// Normalized key used for case-insensitive username comparison
pub fn username_key(username: &str) -> String {
    username.to_lowercase()
}

/// A booked seat owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique ticket identifier, generated at booking time
    pub ticket_id: TicketId,

    /// Train the seat belongs to
    pub train_id: TrainId,

    /// Seat row
    pub row: usize,

    /// Seat column
    pub col: usize,
}

impl Ticket {
    /// Issue a ticket with a freshly generated id
    pub fn issue(train_id: impl Into<TrainId>, row: usize, col: usize) -> Self {
        Ticket {
            ticket_id: Uuid::new_v4().to_string(),
            train_id: train_id.into(),
            row,
            col,
        }
    }
}

/// A registered user
///
/// Only the password digest is stored; plaintext never reaches this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Display name as entered at signup
    pub username: String,

    /// Digest produced by the configured password hasher
    pub password_hash: String,

    /// Booked tickets in booking order
    #[serde(default)]
    pub tickets: Vec<Ticket>,
}

impl User {
    /// Create a user with no tickets
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        User {
            username: username.into(),
            password_hash: password_hash.into(),
            tickets: Vec::new(),
        }
    }

    /// Case-insensitive name match
    pub fn has_name(&self, username: &str) -> bool {
        username_key(&self.username) == username_key(username)
    }

    /// Look up one of this user's tickets
    pub fn ticket(&self, ticket_id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.ticket_id == ticket_id)
    }

    /// Remove a ticket, returning it together with its former position
    pub fn remove_ticket(&mut self, ticket_id: &str) -> Option<(usize, Ticket)> {
        let position = self.tickets.iter().position(|t| t.ticket_id == ticket_id)?;
        Some((position, self.tickets.remove(position)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_generates_unique_ids() {
        let a = Ticket::issue("T1", 0, 0);
        let b = Ticket::issue("T1", 0, 0);
        assert_ne!(a.ticket_id, b.ticket_id);
        assert_eq!((a.train_id.as_str(), a.row, a.col), ("T1", 0, 0));
    }

    #[test]
    fn test_has_name_ignores_case() {
        let user = User::new("Alice", "digest");
        assert!(user.has_name("alice"));
        assert!(user.has_name("ALICE"));
        assert!(!user.has_name("alicia"));
    }

    #[test]
    fn test_remove_ticket_preserves_order() {
        let mut user = User::new("alice", "digest");
        let first = Ticket::issue("T1", 0, 0);
        let second = Ticket::issue("T1", 0, 1);
        let third = Ticket::issue("T2", 1, 1);
        user.tickets = vec![first.clone(), second.clone(), third.clone()];

        let removed = user.remove_ticket(&second.ticket_id);
        assert_eq!(removed, Some((1, second.clone())));
        assert_eq!(user.tickets, vec![first, third]);
        assert_eq!(user.remove_ticket(&second.ticket_id), None);
    }

    #[test]
    fn test_persisted_shape() {
        let mut user = User::new("alice", "digest");
        user.tickets.push(Ticket {
            ticket_id: "t-1".to_string(),
            train_id: "T1".to_string(),
            row: 0,
            col: 1,
        });

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["username"], "alice");
        assert_eq!(value["passwordHash"], "digest");
        assert_eq!(value["tickets"][0]["ticketId"], "t-1");
        assert_eq!(value["tickets"][0]["trainId"], "T1");
        assert_eq!(value["tickets"][0]["col"], 1);
    }

    #[test]
    fn test_missing_tickets_defaults_to_empty() {
        let user: User =
            serde_json::from_str(r#"{"username":"bob","passwordHash":"x"}"#).unwrap();
        assert!(user.tickets.is_empty());
    }
}
