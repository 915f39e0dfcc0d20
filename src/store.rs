//! Storage interface and an in-memory implementation.
//!
//! Services talk to storage only through [`Repository`]. The in-memory
//! [`MemoryRepository`] is what the binary runs with; a database-backed
//! implementation would slot in behind the same trait.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// A record a [`Repository`] can hold.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Name used in logs and errors.
    const KIND: &'static str;

    fn id(&self) -> Option<u64>;
    fn set_id(&mut self, id: u64);

    /// String value of a named field, used by [`Criteria`] lookups.
    fn field(&self, name: &str) -> Option<String>;
}

/// Field → value equality filters, all of which must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria(BTreeMap<String, String>);

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl ToString) -> Self {
        self.0.insert(field.to_owned(), value.to_string());
        self
    }

    pub fn matches<T: Entity>(&self, entity: &T) -> bool {
        self.0.iter().all(|(field, value)| entity.field(field).as_deref() == Some(value.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} {id} does not exist")]
    NotFound { kind: &'static str, id: u64 },

    #[error("{0} has no id; create it first")]
    MissingId(&'static str),
}

#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Stores a new entity and returns its assigned id.
    async fn create(&self, entity: T) -> Result<u64, StoreError>;
    async fn get_by_id(&self, id: u64) -> Result<Option<T>, StoreError>;
    async fn list_all(&self) -> Result<Vec<T>, StoreError>;
    async fn list_by(&self, criteria: &Criteria) -> Result<Vec<T>, StoreError>;
    async fn update(&self, entity: &T) -> Result<(), StoreError>;
    async fn delete(&self, id: u64) -> Result<(), StoreError>;
}

/// Rows kept in id order behind an async `RwLock`.
pub struct MemoryRepository<T> {
    rows: RwLock<BTreeMap<u64, T>>,
    next_id: AtomicU64,
}

impl<T> MemoryRepository<T> {
    pub fn new() -> Self {
        Self { rows: RwLock::new(BTreeMap::new()), next_id: AtomicU64::new(1) }
    }
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn create(&self, mut entity: T) -> Result<u64, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        entity.set_id(id);
        self.rows.write().await.insert(id, entity);
        debug!(kind = T::KIND, id, "created");
        Ok(id)
    }

    async fn get_by_id(&self, id: u64) -> Result<Option<T>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn list_by(&self, criteria: &Criteria) -> Result<Vec<T>, StoreError> {
        Ok(self.rows.read().await.values().filter(|e| criteria.matches(*e)).cloned().collect())
    }

    async fn update(&self, entity: &T) -> Result<(), StoreError> {
        let id = entity.id().ok_or(StoreError::MissingId(T::KIND))?;
        let mut rows = self.rows.write().await;
        let slot = rows.get_mut(&id).ok_or(StoreError::NotFound { kind: T::KIND, id })?;
        *slot = entity.clone();
        debug!(kind = T::KIND, id, "updated");
        Ok(())
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        self.rows
            .write()
            .await
            .remove(&id)
            .map(|_| debug!(kind = T::KIND, id, "deleted"))
            .ok_or(StoreError::NotFound { kind: T::KIND, id })
    }
}
