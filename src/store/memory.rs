use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

use super::{Entity, RecordStore, StoreError};

/// In-memory store. Shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct MemoryStore<T> {
    records: RwLock<HashMap<Uuid, T>>,
}

impl<T: Entity> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> RecordStore<T> for MemoryStore<T> {
    fn get(&self, id: Uuid) -> Result<T, StoreError> {
        self.records
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn add(&self, record: T) -> Result<(), StoreError> {
        let id = record.id();
        if id.is_nil() {
            return Err(StoreError::NilId);
        }

        let mut records = self.records.write();
        if records.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        records.insert(id, record);
        tracing::info!(%id, "record added");
        Ok(())
    }

    fn update(&self, record: T) -> Result<(), StoreError> {
        let id = record.id();
        let mut records = self.records.write();
        match records.get_mut(&id) {
            Some(slot) => {
                *slot = record;
                tracing::info!(%id, "record updated");
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Record, Status};

    #[test]
    fn test_add_then_get() {
        let store = MemoryStore::new();
        let record = Record::new(Uuid::new_v4(), "first");

        store.add(record.clone()).unwrap();

        assert_eq!(store.get(record.id).unwrap(), record);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let store = MemoryStore::<Record>::new();
        let id = Uuid::new_v4();

        assert_eq!(store.get(id), Err(StoreError::NotFound(id)));
    }

    #[test]
    fn test_add_nil_id_rejected() {
        let store = MemoryStore::new();

        assert_eq!(store.add(Record::new(Uuid::nil(), "nil")), Err(StoreError::NilId));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_duplicate() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        store.add(Record::new(id, "a")).unwrap();
        assert_eq!(
            store.add(Record::new(id, "b")),
            Err(StoreError::AlreadyExists(id))
        );
        assert_eq!(store.get(id).unwrap().name, "a");
    }

    #[test]
    fn test_update() {
        let store = MemoryStore::new();
        let mut record = Record::new(Uuid::new_v4(), "r");
        store.add(record.clone()).unwrap();

        record.set_processed();
        store.update(record.clone()).unwrap();

        assert_eq!(store.get(record.id).unwrap().status, Status::Processed);
    }

    #[test]
    fn test_update_missing() {
        let store = MemoryStore::new();
        let record = Record::new(Uuid::new_v4(), "ghost");

        assert_eq!(store.update(record.clone()), Err(StoreError::NotFound(record.id)));
    }
}
