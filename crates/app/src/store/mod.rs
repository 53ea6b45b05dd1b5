//! Persistence collaborators for signature records
//!
//! - [`MemoryStore`]: process-local, used by tests and when no store path is configured
//! - [`JsonFileStore`]: JSON array on disk, rewritten atomically on every create

mod file;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use signboard_ipc::{NewSignature, Signature};
use thiserror::Error;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Signature id already stored: {0}")]
    DuplicateId(String),
}

/// Backend that owns signature records
///
/// The store assigns `id` and `timestamp`. Listing is newest first.
#[async_trait]
pub trait SignatureStore: Send + Sync {
    /// Persist a new signature and return the complete record
    async fn create(&self, signature: NewSignature) -> Result<Signature, StoreError>;

    /// One page of records, newest first
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Signature>, StoreError>;

    /// Persist an already complete record, keeping its id and timestamp
    async fn insert(&self, signature: Signature) -> Result<(), StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// Hands out `(id, timestamp)` pairs for new records
///
/// Ids are the creation time in epoch milliseconds, bumped past the last
/// one issued so that two creates in the same millisecond stay distinct.
#[derive(Debug, Default)]
pub struct IdClock {
    last: Mutex<i64>,
}

impl IdClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> (String, String) {
        self.next_at(Utc::now())
    }

    fn next_at(&self, now: DateTime<Utc>) -> (String, String) {
        let mut last = self.last.lock();
        let id = now.timestamp_millis().max(*last + 1);
        *last = id;
        (id.to_string(), now.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Build the stored record, skipping any id already taken
pub(crate) fn complete(clock: &IdClock, signature: NewSignature, existing: &[Signature]) -> Signature {
    let (mut id, timestamp) = clock.next();
    while existing.iter().any(|stored| stored.id == id) {
        id = clock.next().0;
    }
    signature.into_signature(id, timestamp)
}

/// Order records newest first by parsed timestamp
///
/// Records with unparsable timestamps sort last. Equal timestamps fall back
/// to the id, highest first: [`IdClock`] ids grow with creation order even
/// when two records share a millisecond.
pub fn sort_newest_first(records: &mut [Signature]) {
    let key = |signature: &Signature| {
        DateTime::parse_from_rfc3339(&signature.timestamp)
            .ok()
            .map(|timestamp| timestamp.timestamp_millis())
    };
    let id_key = |signature: &Signature| signature.id.parse::<i64>().ok();
    records.sort_by(|a, b| {
        key(b)
            .cmp(&key(a))
            .then_with(|| id_key(b).cmp(&id_key(a)))
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Newest-first page of `records`
pub(crate) fn page(records: &[Signature], limit: usize, offset: usize) -> Vec<Signature> {
    let mut sorted = records.to_vec();
    sort_newest_first(&mut sorted);
    sorted.into_iter().skip(offset).take(limit).collect()
}
