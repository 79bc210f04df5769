//! In-memory record store.
//!
//! Stand-in for the host framework's record persistence. Records live only
//! as long as the process; no validation or querying beyond lookup by id.

use dashmap::DashMap;
use serde_json::Value;

use crate::records::exclude::Record;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("record '{id}' not found in '{collection}'")]
    RecordNotFound { collection: String, id: String },

    #[error("record '{id}' already exists in '{collection}'")]
    DuplicateId { collection: String, id: String },
}

/// Record persistence used by the record routes.
pub trait RecordStore: Send + Sync {
    fn list(&self, collection: &str) -> Result<Vec<Record>, StoreError>;

    fn view(&self, collection: &str, id: &str) -> Result<Record, StoreError>;

    /// Insert a record, generating an `id` when the record has none.
    fn create(&self, collection: &str, record: Record) -> Result<Record, StoreError>;

    /// Merge `patch` into an existing record. The `id` field cannot change.
    fn update(&self, collection: &str, id: &str, patch: Record) -> Result<Record, StoreError>;

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Records grouped by collection, kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Record>>,
}

impl MemoryStore {
    pub fn new<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::default();
        for name in collections {
            store.collections.insert(name.into(), Vec::new());
        }
        store
    }

    fn not_found(collection: &str, id: &str) -> StoreError {
        StoreError::RecordNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

impl RecordStore for MemoryStore {
    fn list(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        self.collections
            .get(collection)
            .map(|records| records.clone())
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))
    }

    fn view(&self, collection: &str, id: &str) -> Result<Record, StoreError> {
        let records = self
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        records
            .iter()
            .find(|r| record_id(r) == Some(id))
            .cloned()
            .ok_or_else(|| Self::not_found(collection, id))
    }

    fn create(&self, collection: &str, mut record: Record) -> Result<Record, StoreError> {
        let mut records = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        let id = match record_id(&record) {
            Some(id) => id.to_string(),
            None => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                record.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };

        if records.iter().any(|r| record_id(r) == Some(id.as_str())) {
            return Err(StoreError::DuplicateId {
                collection: collection.to_string(),
                id,
            });
        }

        records.push(record.clone());
        Ok(record)
    }

    fn update(&self, collection: &str, id: &str, patch: Record) -> Result<Record, StoreError> {
        let mut records = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        let record = records
            .iter_mut()
            .find(|r| record_id(r) == Some(id))
            .ok_or_else(|| Self::not_found(collection, id))?;

        for (field, value) in patch {
            if field != "id" {
                record.insert(field, value);
            }
        }
        Ok(record.clone())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut records = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        let index = records
            .iter()
            .position(|r| record_id(r) == Some(id))
            .ok_or_else(|| Self::not_found(collection, id))?;
        records.remove(index);
        Ok(())
    }
}
