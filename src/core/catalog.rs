//! Train catalog
//!
//! This module provides the `TrainCatalog`, which owns every known train and
//! hands out the per-train locks that booking and cancellation run under.
//!
//! # Design
//!
//! Trains live in a `DashMap` keyed by train id. Each value wraps the train
//! in its own `tokio::sync::Mutex`, so operations on different trains never
//! contend and a seat-state transition holds exactly one train's lock for
//! the whole read-mutate-persist sequence.
//!
//! Storage order is tracked with a per-entry position so route search
//! returns trains in the order they were first added.

use crate::core::traits::{persist_within, PersistenceStore};
use crate::types::{BookingError, Train, TrainId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

#[derive(Debug, Clone)]
struct CatalogEntry {
    position: usize,
    train: Arc<Mutex<Train>>,
}

/// The set of known trains
pub struct TrainCatalog<S> {
    store: Arc<S>,
    timeout: Duration,
    entries: DashMap<TrainId, CatalogEntry>,
    next_position: AtomicUsize,
    /// Serializes upserts so two registrations of one new id cannot race
    upsert_lock: Mutex<()>,
}

impl<S: PersistenceStore> TrainCatalog<S> {
    /// Build a catalog from trains already loaded, keeping their order
    ///
    /// A repeated train id keeps its first position and its last record.
    pub fn new(store: Arc<S>, timeout: Duration, trains: Vec<Train>) -> Self {
        let catalog = TrainCatalog {
            store,
            timeout,
            entries: DashMap::new(),
            next_position: AtomicUsize::new(0),
            upsert_lock: Mutex::new(()),
        };
        for train in trains {
            catalog.install(train);
        }
        catalog
    }

    /// Load every persisted train into a new catalog
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the store cannot be read in time.
    pub async fn load(store: Arc<S>, timeout: Duration) -> Result<Self, BookingError> {
        let trains = persist_within(timeout, "load trains", store.load_trains()).await?;
        debug!(count = trains.len(), "loaded train catalog");
        Ok(Self::new(store, timeout, trains))
    }

    fn install(&self, train: Train) {
        let id = train.train_id.clone();
        if let Some(existing) = self.entries.get(&id).map(|e| e.train.clone()) {
            if let Ok(mut slot) = existing.try_lock() {
                *slot = train;
            }
            return;
        }
        let position = self.next_position.fetch_add(1, Ordering::SeqCst);
        self.entries.insert(
            id,
            CatalogEntry {
                position,
                train: Arc::new(Mutex::new(train)),
            },
        );
    }

    fn slot(&self, train_id: &str) -> Result<Arc<Mutex<Train>>, BookingError> {
        self.entries
            .get(train_id)
            .map(|entry| entry.train.clone())
            .ok_or_else(|| BookingError::train_not_found(train_id))
    }

    /// Train slots in storage order
    ///
    /// Only `Arc`s are collected, so no map guard is held across an await.
    fn ordered_slots(&self) -> Vec<Arc<Mutex<Train>>> {
        let mut slots: Vec<(usize, Arc<Mutex<Train>>)> = self
            .entries
            .iter()
            .map(|entry| (entry.value().position, entry.value().train.clone()))
            .collect();
        slots.sort_by_key(|(position, _)| *position);
        slots.into_iter().map(|(_, slot)| slot).collect()
    }

    /// Trains travelling from `source` to `destination`, in storage order
    ///
    /// A train matches when both stations are on its route and `source`
    /// comes strictly first. Station names are matched exactly. No match is
    /// an empty result, not an error.
    pub async fn find_route(&self, source: &str, destination: &str) -> Vec<Train> {
        let mut matches = Vec::new();
        for slot in self.ordered_slots() {
            let train = slot.lock().await;
            if train.serves(source, destination) {
                matches.push(train.clone());
            }
        }
        matches
    }

    /// Snapshot of one train
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no train has this id.
    pub async fn by_id(&self, train_id: &str) -> Result<Train, BookingError> {
        let slot = self.slot(train_id)?;
        let train = slot.lock().await;
        Ok(train.clone())
    }

    /// Acquire the exclusive lock for one train
    ///
    /// The guard owns its `Arc`, so it can be held across persistence calls.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no train has this id.
    pub async fn lock(&self, train_id: &str) -> Result<OwnedMutexGuard<Train>, BookingError> {
        let slot = self.slot(train_id)?;
        Ok(slot.lock_owned().await)
    }

    /// Write one train record through to the store
    pub async fn persist(&self, train: &Train) -> Result<(), BookingError> {
        persist_within(
            self.timeout,
            "save train",
            self.store.save_train(train.clone()),
        )
        .await?;
        debug!(train_id = %train.train_id, "persisted train");
        Ok(())
    }

    /// Persist a full train record and make it the in-memory state
    ///
    /// An existing train keeps its storage position and is only replaced
    /// once the write succeeded. A new train is appended.
    pub async fn upsert(&self, train: Train) -> Result<(), BookingError> {
        let _registration = self.upsert_lock.lock().await;

        match self.slot(&train.train_id) {
            Ok(slot) => {
                let mut current = slot.lock().await;
                self.persist(&train).await?;
                *current = train;
            }
            Err(_) => {
                self.persist(&train).await?;
                self.install(train);
            }
        }
        Ok(())
    }

    /// Whether a train with this id is known
    pub fn contains(&self, train_id: &str) -> bool {
        self.entries.contains_key(train_id)
    }

    /// Known train ids in storage order
    pub fn train_ids(&self) -> Vec<TrainId> {
        let mut ids: Vec<(usize, TrainId)> = self
            .entries
            .iter()
            .map(|entry| (entry.value().position, entry.key().clone()))
            .collect();
        ids.sort_by_key(|(position, _)| *position);
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Number of known trains
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog holds no trains
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
