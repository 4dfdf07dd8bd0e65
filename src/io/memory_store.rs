//! In-memory persistence
//!
//! A `PersistenceStore` that keeps records in process memory. Used by
//! tests, benchmarks and anywhere durable storage is not wanted.

use crate::core::traits::PersistenceStore;
use crate::types::{BookingError, Train, User};
use tokio::sync::RwLock;

/// `PersistenceStore` holding records in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    trains: RwLock<Vec<Train>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing records
    pub fn with_records(users: Vec<User>, trains: Vec<Train>) -> Self {
        InMemoryStore {
            users: RwLock::new(users),
            trains: RwLock::new(trains),
        }
    }
}

impl PersistenceStore for InMemoryStore {
    async fn load_users(&self) -> Result<Vec<User>, BookingError> {
        Ok(self.users.read().await.clone())
    }

    async fn save_users(&self, users: Vec<User>) -> Result<(), BookingError> {
        *self.users.write().await = users;
        Ok(())
    }

    async fn load_trains(&self) -> Result<Vec<Train>, BookingError> {
        Ok(self.trains.read().await.clone())
    }

    async fn save_train(&self, train: Train) -> Result<(), BookingError> {
        let mut trains = self.trains.write().await;
        match trains.iter_mut().find(|t| t.train_id == train.train_id) {
            Some(existing) => *existing = train,
            None => trains.push(train),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SeatGrid;

    #[tokio::test]
    async fn test_starts_empty() {
        let store = InMemoryStore::new();
        assert!(store.load_users().await.unwrap().is_empty());
        assert!(store.load_trains().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_train_replaces_by_id() {
        let store = InMemoryStore::with_records(
            Vec::new(),
            vec![Train::new("T1", Vec::new(), SeatGrid::new(1, 1))],
        );

        let mut booked = Train::new("T1", Vec::new(), SeatGrid::new(1, 1));
        booked.seats.try_occupy(0, 0).unwrap();
        store.save_train(booked.clone()).await.unwrap();
        store
            .save_train(Train::new("T2", Vec::new(), SeatGrid::new(1, 1)))
            .await
            .unwrap();

        let trains = store.load_trains().await.unwrap();
        assert_eq!(trains.len(), 2);
        assert_eq!(trains[0], booked);
    }
}
