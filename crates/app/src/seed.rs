//! Example signatures inserted into an empty store on request

use signboard_config::{DEFAULT_SIGNATURE_HEIGHT, DEFAULT_SIGNATURE_WIDTH};
use signboard_ipc::{GridPosition, Signature, SignatureColor};
use tracing::info;

use crate::store::{SignatureStore, StoreError};

const EXAMPLES: [(i32, i32, SignatureColor, &str); 7] = [
    (0, 0, SignatureColor::Red, "2024-04-24T11:47:34-04:00"),
    (1, 0, SignatureColor::Blue, "2024-04-24T11:48:34-04:00"),
    (2, 0, SignatureColor::Green, "2024-04-24T11:49:34-04:00"),
    (0, 1, SignatureColor::Yellow, "2024-04-24T11:50:34-04:00"),
    (2, 1, SignatureColor::Pink, "2024-04-24T11:51:34-04:00"),
    (1, 2, SignatureColor::Purple, "2024-04-24T11:52:34-04:00"),
    (3, 2, SignatureColor::Red, "2024-04-24T11:53:34-04:00"),
];

/// The example signatures, ids "1" to "7"
pub fn example_signatures() -> Vec<Signature> {
    EXAMPLES
        .iter()
        .enumerate()
        .map(|(i, (col, row, color, timestamp))| Signature {
            id: (i + 1).to_string(),
            grid_position: GridPosition::new(*col, *row),
            width: DEFAULT_SIGNATURE_WIDTH,
            height: DEFAULT_SIGNATURE_HEIGHT,
            color: *color,
            timestamp: timestamp.to_string(),
            data: String::new(),
            location: None,
            device_id: None,
        })
        .collect()
}

/// Insert the examples when the store holds nothing yet; returns how many were added
pub async fn seed_if_empty(store: &dyn SignatureStore) -> Result<usize, StoreError> {
    if store.count().await? > 0 {
        return Ok(0);
    }
    let examples = example_signatures();
    let count = examples.len();
    for signature in examples {
        store.insert(signature).await?;
    }
    info!("Seeded {} example signatures", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seed_only_into_empty_store() {
        let store = MemoryStore::new();
        assert_eq!(seed_if_empty(&store).await.unwrap(), 7);
        assert_eq!(seed_if_empty(&store).await.unwrap(), 0);

        let newest = store.list(1, 0).await.unwrap();
        assert_eq!(newest[0].id, "7");
        assert_eq!(newest[0].grid_position, GridPosition::new(3, 2));
    }
}
