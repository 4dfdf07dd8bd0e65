//! JSON flat-file persistence
//!
//! Stores users and trains as two JSON arrays, `users.json` and
//! `trains.json`, inside an injectable data directory.
//!
//! # Design
//!
//! - Missing files are created as empty arrays on first load
//! - Every write goes to a fresh temporary file in the same directory which
//!   is then renamed over the target, so readers never observe a
//!   half-written file
//! - Each file has its own async mutex. A write runs on the blocking pool
//!   and keeps holding that mutex until the rename is done, even if the
//!   caller stopped waiting. A later write to the same file therefore
//!   always lands after an abandoned one
//!
//! ```text
//! data/
//!   users.json    [{ username, passwordHash, tickets: [...] }, ...]
//!   trains.json   [{ trainId, stops: [...], seats: [[0,1],...] }, ...]
//! ```

use crate::config::StoreConfig;
use crate::core::traits::PersistenceStore;
use crate::types::{BookingError, Train, User};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

pub const USERS_FILE: &str = "users.json";
pub const TRAINS_FILE: &str = "trains.json";

/// `PersistenceStore` backed by JSON files on local disk
#[derive(Debug)]
pub struct JsonFileStore {
    users_path: PathBuf,
    trains_path: PathBuf,
    users_lock: Arc<Mutex<()>>,
    trains_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Create a store rooted at `data_dir`
    ///
    /// Nothing is touched on disk until the first load or save.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        JsonFileStore {
            users_path: data_dir.join(USERS_FILE),
            trains_path: data_dir.join(TRAINS_FILE),
            users_lock: Arc::new(Mutex::new(())),
            trains_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.data_dir)
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    pub fn trains_path(&self) -> &Path {
        &self.trains_path
    }
}

/// Read a JSON array; `None` if the file does not exist
async fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>, BookingError> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Some(Vec::new())),
        Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            BookingError::persistence(format!("{}: {}", path.display(), BookingError::from(e)))
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BookingError::persistence(format!(
            "{}: {}",
            path.display(),
            e
        ))),
    }
}

/// Read a JSON array, creating an empty one if the file does not exist
async fn read_or_init<T>(guard: OwnedMutexGuard<()>, path: &Path) -> Result<Vec<T>, BookingError>
where
    T: DeserializeOwned + Serialize,
{
    match read_records(path).await? {
        Some(records) => Ok(records),
        None => {
            debug!(path = %path.display(), "creating empty record file");
            write_atomic::<T>(guard, path, &[]).await?;
            Ok(Vec::new())
        }
    }
}

/// Replace `path` with the JSON encoding of `records`
///
/// The file lock moves into the blocking task and is released only once
/// the rename finished or failed.
async fn write_atomic<T: Serialize>(
    guard: OwnedMutexGuard<()>,
    path: &Path,
    records: &[T],
) -> Result<(), BookingError> {
    let bytes = serde_json::to_vec_pretty(records)?;
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let _guard = guard;
        replace_file(&path, &bytes)
    })
    .await
    .map_err(|e| BookingError::persistence(format!("write task failed: {}", e)))?
}

fn replace_file(path: &Path, bytes: &[u8]) -> Result<(), BookingError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| BookingError::from(e.error))?;
    Ok(())
}

impl PersistenceStore for JsonFileStore {
    async fn load_users(&self) -> Result<Vec<User>, BookingError> {
        let guard = self.users_lock.clone().lock_owned().await;
        read_or_init(guard, &self.users_path).await
    }

    async fn save_users(&self, users: Vec<User>) -> Result<(), BookingError> {
        let guard = self.users_lock.clone().lock_owned().await;
        write_atomic(guard, &self.users_path, &users).await?;
        debug!(count = users.len(), "wrote users file");
        Ok(())
    }

    async fn load_trains(&self) -> Result<Vec<Train>, BookingError> {
        let guard = self.trains_lock.clone().lock_owned().await;
        read_or_init(guard, &self.trains_path).await
    }

    async fn save_train(&self, train: Train) -> Result<(), BookingError> {
        let guard = self.trains_lock.clone().lock_owned().await;
        let mut trains: Vec<Train> = read_records(&self.trains_path).await?.unwrap_or_default();

        match trains.iter_mut().find(|t| t.train_id == train.train_id) {
            Some(existing) => *existing = train,
            None => trains.push(train),
        }

        write_atomic(guard, &self.trains_path, &trains).await
    }
}

/// Read a seed file: a JSON array of trains in the `trains.json` shape
pub async fn read_train_seed(path: &Path) -> Result<Vec<Train>, BookingError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| BookingError::persistence(format!("{}: {}", path.display(), e)))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        BookingError::persistence(format!("{}: {}", path.display(), BookingError::from(e)))
    })
}
