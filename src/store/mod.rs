//! Document store collaborator: JSON documents grouped in collections, with
//! change notifications.

mod memory;
mod repository;

pub use memory::MemoryStore;
pub use repository::TournamentRepository;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Collections used by the tournament.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Tournaments,
    Players,
    /// Group and bracket matches; bracket documents carry a `round` field.
    Matches,
    Settings,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Tournaments => "tournaments",
            Collection::Players => "players",
            Collection::Matches => "matches",
            Collection::Settings => "settings",
        }
    }
}

/// Errors raised by a document store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// The backend could not be reached or is in a broken state.
    Unavailable(String),
    NotFound { collection: Collection, id: String },
    /// A document could not be written or read back.
    Malformed(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(reason) => write!(f, "Store unavailable: {}", reason),
            StoreError::NotFound { collection, id } => {
                write!(f, "No document {} in {}", id, collection.name())
            }
            StoreError::Malformed(reason) => write!(f, "Malformed document: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Malformed(e.to_string())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A single document change. `document` is the new content, or the last
/// content for deletions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub id: String,
    pub kind: ChangeKind,
    pub document: Value,
}

/// Equality filter on a top-level document field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Value) -> bool {
        document.get(&self.field) == Some(&self.value)
    }
}

/// Push-based view of changes in one collection.
pub struct Subscription {
    collection: Collection,
    filter: Option<FieldFilter>,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    pub fn new(
        collection: Collection,
        filter: Option<FieldFilter>,
        receiver: broadcast::Receiver<ChangeEvent>,
    ) -> Self {
        Self {
            collection,
            filter,
            receiver,
        }
    }

    fn accepts(&self, event: &ChangeEvent) -> bool {
        event.collection == self.collection
            && self.filter.as_ref().map_or(true, |f| f.matches(&event.document))
    }

    /// Wait for the next matching change. `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            let received = self.receiver.recv().await;
            match received {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Subscriber on {} lagged by {} change(s)", self.collection.name(), skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching change already delivered, without waiting.
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        loop {
            let received = self.receiver.try_recv();
            match received {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("Subscriber on {} lagged by {} change(s)", self.collection.name(), skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

/// Generic document store: create/get/update/delete, field queries and subscriptions.
///
/// Each single-document write is atomic; nothing spans documents.
pub trait DocumentStore: Send + Sync {
    /// Insert a JSON object. A non-empty string `id` field is kept, otherwise a
    /// fresh id is assigned and written into the document. Returns the id.
    fn create(&self, collection: Collection, data: Value) -> Result<String, StoreError>;

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError>;

    /// Shallow-merge the fields of `patch` into the document.
    fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), StoreError>;

    fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;

    /// Documents whose `field` equals `value`, in insertion order.
    fn query_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// Changes to `collection`, optionally only those matching `filter`.
    fn subscribe(&self, collection: Collection, filter: Option<FieldFilter>) -> Subscription;
}

impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    fn create(&self, collection: Collection, data: Value) -> Result<String, StoreError> {
        (**self).create(collection, data)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(collection, id)
    }

    fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), StoreError> {
        (**self).update(collection, id, patch)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        (**self).delete(collection, id)
    }

    fn query_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        (**self).query_by_field(collection, field, value)
    }

    fn subscribe(&self, collection: Collection, filter: Option<FieldFilter>) -> Subscription {
        (**self).subscribe(collection, filter)
    }
}
