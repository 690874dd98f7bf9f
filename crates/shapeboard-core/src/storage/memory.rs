//! In-memory storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Keeps documents in a map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error<T>(err: PoisonError<T>) -> StorageError {
    StorageError::Other(format!("Lock error: {err}"))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, json: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let json = json.to_string();
        Box::pin(async move {
            self.documents.write().map_err(lock_error)?.insert(key, json);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.documents.read().map_err(lock_error)?.get(&key).cloned()) })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            self.documents.write().map_err(lock_error)?.remove(&key);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            let mut keys: Vec<String> = docs.keys().cloned().collect();
            keys.sort();
            Ok(keys)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        block_on(storage.save("doc", r#"{"a":1}"#)).unwrap();
        assert_eq!(block_on(storage.load("doc")).unwrap().as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(block_on(storage.load("nothing")).unwrap(), None);
    }

    #[test]
    fn test_overwrite_and_delete() {
        let storage = MemoryStorage::new();
        block_on(storage.save("doc", "1")).unwrap();
        block_on(storage.save("doc", "2")).unwrap();
        assert_eq!(block_on(storage.load("doc")).unwrap().as_deref(), Some("2"));
        block_on(storage.delete("doc")).unwrap();
        block_on(storage.delete("doc")).unwrap();
        assert_eq!(block_on(storage.load("doc")).unwrap(), None);
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        block_on(storage.save("doc2", "{}")).unwrap();
        block_on(storage.save("doc1", "{}")).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["doc1", "doc2"]);
    }
}
