use std::{collections::HashMap, path::PathBuf, sync::Arc};

use serde_json::Value;
use tokio::{fs, sync::RwLock};

use crate::errors::StoreError;

/// Flat JSON-file-backed key-value store.
///
/// Persists a `HashMap<String, Value>` to a single JSON file and provides
/// point `get`/`set`/`delete` operations. There is no atomicity across keys:
/// two related writes can be split by a crash, and callers own that caveat.
#[derive(Clone)]
pub struct JsonKvStore {
    inner: Arc<RwLock<HashMap<String, Value>>>,
    file_path: PathBuf,
}

impl JsonKvStore {
    /// Initialize the store from the given file path. Creates the file with
    /// an empty map if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<String, Value> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => {
                let empty: HashMap<String, Value> = HashMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(|e| StoreError::Db(e.to_string()))?)
                    .await
                    .map_err(|e| StoreError::Db(e.to_string()))?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    async fn save(&self) -> Result<(), StoreError> {
        let map = self.inner.read().await;
        let data = serde_json::to_vec(&*map).map_err(|e| StoreError::Db(e.to_string()))?;
        fs::write(&self.file_path, data).await.map_err(|e| StoreError::Db(e.to_string()))?;
        Ok(())
    }

    /// Get the value stored under `key`, if any.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Set `key` to `value` and persist.
    pub async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        map.insert(key.to_owned(), value);
        drop(map);
        self.save().await
    }

    /// Remove `key` and persist; returns whether an entry existed.
    pub async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(key).is_some();
        drop(map);
        self.save().await?;
        Ok(existed)
    }
}
