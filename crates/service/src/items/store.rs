use crate::errors::ServiceError;
use async_trait::async_trait;

use crate::file::item_store::{Item, ItemInput};

/// Trait abstraction for item collection storage (CRUD over the named items).
/// Implementations can be file-backed or in-memory for tests.
#[async_trait]
pub trait ItemCollectionStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Item>, ServiceError>;
    async fn create(&self, input: ItemInput) -> Result<Item, ServiceError>;
    async fn update(&self, id: i64, input: ItemInput) -> Result<Item, ServiceError>;
    async fn delete(&self, id: i64) -> Result<(), ServiceError>;
}
