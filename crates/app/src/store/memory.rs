use async_trait::async_trait;
use parking_lot::RwLock;
use signboard_ipc::{NewSignature, Signature};

use super::{IdClock, SignatureStore, StoreError, complete, page};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Signature>>,
    clock: IdClock,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignatureStore for MemoryStore {
    async fn create(&self, signature: NewSignature) -> Result<Signature, StoreError> {
        let mut records = self.records.write();
        let signature = complete(&self.clock, signature, &records);
        records.push(signature.clone());
        Ok(signature)
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Signature>, StoreError> {
        Ok(page(&self.records.read(), limit, offset))
    }

    async fn insert(&self, signature: Signature) -> Result<(), StoreError> {
        let mut records = self.records.write();
        if records.iter().any(|stored| stored.id == signature.id) {
            return Err(StoreError::DuplicateId(signature.id));
        }
        records.push(signature);
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{new_signature, stored};

    #[tokio::test]
    async fn test_create_assigns_identity() {
        let store = MemoryStore::new();
        let first = store.create(new_signature(0, 0)).await.unwrap();
        let second = store.create(new_signature(1, 0)).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.location.as_deref(), Some("Unknown"));
        assert!(first.timestamp.ends_with('Z'));
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryStore::new();
        store.insert(stored("old", "2024-04-24T11:47:34-04:00")).await.unwrap();
        store.insert(stored("new", "2024-04-24T11:53:34-04:00")).await.unwrap();

        let ids: Vec<String> = store.list(10, 0).await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(store.list(1, 1).await.unwrap()[0].id, "old");
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store = MemoryStore::new();
        store.insert(stored("1", "2024-04-24T11:47:34-04:00")).await.unwrap();
        let result = store.insert(stored("1", "2024-04-24T11:48:34-04:00")).await;
        assert!(matches!(result, Err(StoreError::DuplicateId(id)) if id == "1"));
    }
}
