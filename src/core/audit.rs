//! Consistency audit between seat grids and tickets
//!
//! Booking writes the train before the users, and cancellation writes the
//! users before the train, so a crash between two writes can leave a
//! booked seat that no ticket refers to. This module finds such
//! anomalies and reports them. It never repairs anything.
//!
//! Usernames that only differ by case can only come from records edited
//! outside the engine, since sign-up rejects them. They are reported too.

use crate::types::{username_key, OccupancyState, Ticket, Train, TrainId, User};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One seat on one train
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatRef {
    pub train_id: TrainId,
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for SeatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.train_id, self.row, self.col)
    }
}

/// A ticket that does not match a booked seat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingTicket {
    pub username: String,
    pub ticket: Ticket,
    pub reason: DanglingReason,
}

/// Why a ticket is dangling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanglingReason {
    UnknownTrain,
    OutOfBounds,
    SeatFree,
}

impl fmt::Display for DanglingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DanglingReason::UnknownTrain => "train does not exist",
            DanglingReason::OutOfBounds => "seat is outside the grid",
            DanglingReason::SeatFree => "seat is not booked",
        };
        f.write_str(text)
    }
}

/// Result of comparing every seat grid with every ticket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Booked seats no ticket refers to
    pub orphaned_seats: Vec<SeatRef>,
    /// Tickets whose seat is missing or free
    pub dangling_tickets: Vec<DanglingTicket>,
    /// Seats claimed by more than one ticket
    pub contested_seats: Vec<SeatRef>,
    /// Stored usernames that collide with an earlier one, ignoring case
    pub duplicate_usernames: Vec<String>,
}

impl ConsistencyReport {
    /// Whether grids and tickets agree completely
    pub fn is_consistent(&self) -> bool {
        self.orphaned_seats.is_empty()
            && self.dangling_tickets.is_empty()
            && self.contested_seats.is_empty()
            && self.duplicate_usernames.is_empty()
    }
}

/// Compare train grids against user tickets
pub fn reconcile(trains: &[Train], users: &[User]) -> ConsistencyReport {
    let by_id: HashMap<&str, &Train> = trains.iter().map(|t| (t.train_id.as_str(), t)).collect();
    let mut claims: HashMap<SeatRef, usize> = HashMap::new();
    let mut report = ConsistencyReport::default();

    for user in users {
        for ticket in &user.tickets {
            let reason = match by_id.get(ticket.train_id.as_str()) {
                None => Some(DanglingReason::UnknownTrain),
                Some(train) => match train.seats.occupancy_at(ticket.row, ticket.col) {
                    Err(_) => Some(DanglingReason::OutOfBounds),
                    Ok(OccupancyState::Free) => Some(DanglingReason::SeatFree),
                    Ok(OccupancyState::Booked) => None,
                },
            };

            match reason {
                Some(reason) => report.dangling_tickets.push(DanglingTicket {
                    username: user.username.clone(),
                    ticket: ticket.clone(),
                    reason,
                }),
                None => {
                    *claims
                        .entry(SeatRef {
                            train_id: ticket.train_id.clone(),
                            row: ticket.row,
                            col: ticket.col,
                        })
                        .or_default() += 1;
                }
            }
        }
    }

    let claimed: HashSet<&SeatRef> = claims.keys().collect();
    for train in trains {
        for (row, col) in train.seats.booked_cells() {
            let seat = SeatRef {
                train_id: train.train_id.clone(),
                row,
                col,
            };
            if !claimed.contains(&seat) {
                report.orphaned_seats.push(seat);
            }
        }
    }

    report.contested_seats = claims
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(seat, _)| seat.clone())
        .collect();
    report.contested_seats.sort();
    report.duplicate_usernames = duplicate_usernames(users);

    report
}

/// Usernames that repeat an earlier one ignoring case, in storage order
pub fn duplicate_usernames(users: &[User]) -> Vec<String> {
    let mut seen = HashSet::new();
    users
        .iter()
        .filter(|user| !seen.insert(username_key(&user.username)))
        .map(|user| user.username.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SeatGrid, Stop};

    fn train(id: &str) -> Train {
        Train::new(
            id,
            vec![Stop::new("A", "08:00"), Stop::new("B", "09:00")],
            SeatGrid::new(2, 2),
        )
    }

    fn user_with(tickets: Vec<Ticket>) -> User {
        let mut user = User::new("alice", "d");
        user.tickets = tickets;
        user
    }

    #[test]
    fn test_consistent_state() {
        let mut t1 = train("T1");
        t1.seats.try_occupy(0, 1).unwrap();
        let users = vec![user_with(vec![Ticket::issue("T1", 0, 1)])];

        assert!(reconcile(&[t1], &users).is_consistent());
    }

    #[test]
    fn test_orphaned_seat() {
        let mut t1 = train("T1");
        t1.seats.try_occupy(1, 0).unwrap();

        let report = reconcile(&[t1], &[user_with(vec![])]);
        assert_eq!(
            report.orphaned_seats,
            vec![SeatRef {
                train_id: "T1".to_string(),
                row: 1,
                col: 0
            }]
        );
        assert!(!report.is_consistent());
    }

    #[test]
    fn test_dangling_tickets() {
        let t1 = train("T1");
        let users = vec![user_with(vec![
            Ticket::issue("T1", 0, 0),
            Ticket::issue("T1", 9, 9),
            Ticket::issue("T404", 0, 0),
        ])];

        let reasons: Vec<_> = reconcile(&[t1], &users)
            .dangling_tickets
            .into_iter()
            .map(|d| d.reason)
            .collect();
        assert_eq!(
            reasons,
            vec![
                DanglingReason::SeatFree,
                DanglingReason::OutOfBounds,
                DanglingReason::UnknownTrain
            ]
        );
    }

    #[test]
    fn test_duplicate_usernames_ignore_case() {
        let users = vec![
            User::new("alice", "d"),
            User::new("bob", "d"),
            User::new("Alice", "d"),
            User::new("ALICE", "d"),
        ];

        let report = reconcile(&[], &users);
        assert_eq!(report.duplicate_usernames, vec!["Alice", "ALICE"]);
        assert!(!report.is_consistent());
        assert!(duplicate_usernames(&users[..2]).is_empty());
    }

    #[test]
    fn test_contested_seat() {
        let mut t1 = train("T1");
        t1.seats.try_occupy(0, 0).unwrap();
        let mut bob = User::new("bob", "d");
        bob.tickets.push(Ticket::issue("T1", 0, 0));
        let users = vec![user_with(vec![Ticket::issue("T1", 0, 0)]), bob];

        let report = reconcile(&[t1], &users);
        assert_eq!(report.contested_seats.len(), 1);
        assert!(report.orphaned_seats.is_empty());
    }
}
