//! In-memory document store.

use crate::store::{
    ChangeEvent, ChangeKind, Collection, DocumentStore, FieldFilter, StoreError, Subscription,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Changes kept for slow subscribers before they start lagging.
const CHANGE_BUFFER: usize = 256;

type Documents = HashMap<Collection, Vec<(String, Value)>>;

/// Documents kept in insertion order per collection, behind one lock.
pub struct MemoryStore {
    documents: RwLock<Documents>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            documents: RwLock::new(HashMap::new()),
            changes,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Documents>, StoreError> {
        self.documents
            .read()
            .map_err(|_| StoreError::Unavailable("lock error".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Documents>, StoreError> {
        self.documents
            .write()
            .map_err(|_| StoreError::Unavailable("lock error".to_string()))
    }

    fn publish(&self, collection: Collection, id: String, kind: ChangeKind, document: Value) {
        // No subscribers is not an error.
        let _ = self.changes.send(ChangeEvent {
            collection,
            id,
            kind,
            document,
        });
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: Collection) -> usize {
        self.read()
            .map(|g| g.get(&collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

impl DocumentStore for MemoryStore {
    fn create(&self, collection: Collection, data: Value) -> Result<String, StoreError> {
        let Value::Object(mut object) = data else {
            return Err(StoreError::Malformed(format!(
                "{} documents must be JSON objects",
                collection.name()
            )));
        };
        let id = match object.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        object.insert("id".to_string(), Value::String(id.clone()));
        let document = Value::Object(object);

        let mut g = self.write()?;
        let docs = g.entry(collection).or_default();
        if docs.iter().any(|(existing, _)| *existing == id) {
            return Err(StoreError::Malformed(format!(
                "duplicate id {} in {}",
                id,
                collection.name()
            )));
        }
        docs.push((id.clone(), document.clone()));
        drop(g);

        self.publish(collection, id.clone(), ChangeKind::Created, document);
        Ok(id)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let g = self.read()?;
        Ok(g.get(&collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(_, doc)| doc.clone()))
    }

    fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), StoreError> {
        let Value::Object(fields) = patch else {
            return Err(StoreError::Malformed("update must be a JSON object".to_string()));
        };
        let not_found = || StoreError::NotFound {
            collection,
            id: id.to_string(),
        };

        let mut g = self.write()?;
        let document = g
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| doc_id == id))
            .map(|(_, doc)| doc)
            .ok_or_else(not_found)?;
        if let Value::Object(object) = document {
            for (key, value) in fields {
                if key != "id" {
                    object.insert(key, value);
                }
            }
        }
        let updated = document.clone();
        drop(g);

        self.publish(collection, id.to_string(), ChangeKind::Updated, updated);
        Ok(())
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut g = self.write()?;
        let docs = g.entry(collection).or_default();
        let idx = docs
            .iter()
            .position(|(doc_id, _)| doc_id == id)
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;
        let (_, removed) = docs.remove(idx);
        drop(g);

        self.publish(collection, id.to_string(), ChangeKind::Deleted, removed);
        Ok(())
    }

    fn query_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let filter = FieldFilter::new(field, value.clone());
        let g = self.read()?;
        Ok(g.get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| filter.matches(doc))
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn subscribe(&self, collection: Collection, filter: Option<FieldFilter>) -> Subscription {
        Subscription::new(collection, filter, self.changes.subscribe())
    }
}
