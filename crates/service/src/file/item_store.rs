use std::sync::Arc;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::items::store::ItemCollectionStore;
use crate::storage::json_list_store::JsonListStore;

/// A single named item, exactly as persisted in the collection file.
/// `id` is assigned at creation time and never changes afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub name: String,
}

/// Create/update input model. `name` is required on create; on update an
/// absent or empty name keeps the stored one.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ItemInput {
    #[serde(default)]
    pub name: Option<String>,
}

impl ItemInput {
    /// Creation-time validation: the collection only accepts named items.
    pub fn validate_for_create(&self) -> Result<&str, ServiceError> {
        match self.name.as_deref() {
            Some(n) if !n.is_empty() => Ok(n),
            _ => Err(ServiceError::Validation("Name is required".into())),
        }
    }
}

/// Millisecond-epoch id, nudged past the highest id already present so a
/// burst of creates within one millisecond still yields distinct ids.
fn next_id(items: &[Item]) -> i64 {
    let now = Utc::now().timestamp_millis();
    match items.iter().map(|it| it.id).max() {
        Some(max) if now <= max => max + 1,
        _ => now,
    }
}

/// 文件存储：以 JSON 数组文件持久化 item 集合
#[derive(Clone)]
pub struct FileItemStore {
    store: Arc<JsonListStore<Item>>,
}

impl FileItemStore {
    /// Initialize the store. An absent file reads back as an empty collection.
    pub async fn new<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonListStore::<Item>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    /// List the whole collection in insertion order.
    pub async fn list(&self) -> Result<Vec<Item>, ServiceError> {
        self.store.load().await
    }

    /// Append a new item with a generated id.
    pub async fn create(&self, input: ItemInput) -> Result<Item, ServiceError> {
        let name = input.validate_for_create()?.to_string();
        self.store
            .update(move |items| {
                let item = Item { id: next_id(items), name };
                items.push(item.clone());
                Ok(item)
            })
            .await
    }

    /// Replace the name of an existing item. An absent or empty new name
    /// keeps the stored one.
    pub async fn update(&self, id: i64, input: ItemInput) -> Result<Item, ServiceError> {
        self.store
            .update(move |items| {
                let item = items
                    .iter_mut()
                    .find(|it| it.id == id)
                    .ok_or_else(|| ServiceError::not_found("item"))?;
                if let Some(name) = input.name.as_deref().filter(|n| !n.is_empty()) {
                    item.name = name.to_string();
                }
                Ok(item.clone())
            })
            .await
    }

    /// Remove every item with the given id. Reports not-found when the
    /// collection is left unchanged, without rewriting the file.
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.store
            .update(move |items| {
                let before = items.len();
                items.retain(|it| it.id != id);
                if items.len() == before {
                    return Err(ServiceError::not_found("item"));
                }
                Ok(())
            })
            .await
    }
}

#[async_trait::async_trait]
impl ItemCollectionStore for FileItemStore {
    async fn list(&self) -> Result<Vec<Item>, ServiceError> { self.list().await }
    async fn create(&self, input: ItemInput) -> Result<Item, ServiceError> { self.create(input).await }
    async fn update(&self, id: i64, input: ItemInput) -> Result<Item, ServiceError> { self.update(id, input).await }
    async fn delete(&self, id: i64) -> Result<(), ServiceError> { self.delete(id).await }
}
