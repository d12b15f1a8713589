use std::{marker::PhantomData, path::PathBuf, sync::Arc};
use tokio::{fs, sync::Mutex};
use tracing::debug;

use crate::errors::ServiceError;

/// Generic JSON file-backed ordered list store.
///
/// Persists a `Vec<T>` as a single JSON array and offers whole-collection
/// load/save plus a serialized read-modify-write helper. Nothing is cached
/// between operations; the file is the only owner of the data. Intended for
/// small collections where a database is overkill.
pub struct JsonListStore<T> {
    file_path: PathBuf,
    // serializes load-modify-save cycles so two writers cannot interleave
    // and silently drop each other's changes
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonListStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Initialize the store for a path. Parent directories are created up
    /// front; the file itself only appears on the first save, and an absent
    /// file reads back as an empty collection.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
            }
        }
        Ok(Arc::new(Self {
            file_path,
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }))
    }

    /// Read the whole collection fresh from disk. An absent file is an
    /// empty collection, not an error; unreadable or malformed content is
    /// a `Storage` error.
    pub async fn load(&self) -> Result<Vec<T>, ServiceError> {
        match fs::read(&self.file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::Storage(format!("malformed store file: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(ServiceError::Storage(e.to_string())),
        }
    }

    /// Overwrite the collection. The new array is written to a sibling temp
    /// file and renamed over the target, so a concurrent `load` never
    /// observes a partially written array.
    pub async fn save(&self, items: &[T]) -> Result<(), ServiceError> {
        let data =
            serde_json::to_vec_pretty(items).map_err(|e| ServiceError::Storage(e.to_string()))?;
        let tmp = self.file_path.with_extension("json.tmp");
        fs::write(&tmp, &data)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.file_path)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        debug!(path = %self.file_path.display(), count = items.len(), "collection persisted");
        Ok(())
    }

    /// Run a load-modify-save cycle under the write lock. The closure's
    /// return value is passed through after a successful save; an error
    /// from the closure aborts the cycle before anything is written.
    pub async fn update<R, F>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        let out = f(&mut items)?;
        self.save(&items).await?;
        Ok(out)
    }
}
