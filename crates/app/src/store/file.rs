use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use signboard_ipc::{NewSignature, Signature};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{IdClock, SignatureStore, StoreError, complete, page};

/// Signatures kept as a JSON array in a single file
///
/// Every write goes to a temporary file that is then renamed over the
/// store, so a failed write leaves the previous contents and the in-memory
/// view untouched.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<Vec<Signature>>,
    clock: IdClock,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = match fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        info!("Opened signature store {} ({} records)", path.display(), records.len());
        Ok(Self {
            path,
            records: Mutex::new(records),
            clock: IdClock::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &[Signature]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(records)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        fs::write(&temp, json).await?;
        fs::rename(&temp, &self.path).await?;
        debug!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Write `records` plus `signature`, then keep it in memory
    async fn append(&self, records: &mut Vec<Signature>, signature: Signature) -> Result<(), StoreError> {
        records.push(signature);
        if let Err(e) = self.persist(records).await {
            records.pop();
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl SignatureStore for JsonFileStore {
    async fn create(&self, signature: NewSignature) -> Result<Signature, StoreError> {
        let mut records = self.records.lock().await;
        let signature = complete(&self.clock, signature, &records);
        self.append(&mut records, signature.clone()).await?;
        Ok(signature)
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Signature>, StoreError> {
        Ok(page(&self.records.lock().await, limit, offset))
    }

    async fn insert(&self, signature: Signature) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        if records.iter().any(|stored| stored.id == signature.id) {
            return Err(StoreError::DuplicateId(signature.id));
        }
        self.append(&mut records, signature).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.lock().await.len())
    }
}
