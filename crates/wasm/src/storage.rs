use linebiz_storage::{KeyValueBackend, StorageError, StorageResult};
use web_sys::Storage;

use crate::error::js_details;

/// `window.localStorage` as a demo-store backend.
pub struct LocalStorageBackend {
    storage: Storage,
}

impl LocalStorageBackend {
    /// Returns `None` when the browser refuses storage access (private mode,
    /// disabled cookies).
    pub fn open(window: &web_sys::Window) -> Option<Self> {
        match window.local_storage() {
            Ok(Some(storage)) => Some(Self { storage }),
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(details = %js_details(&error), "localStorage is not accessible");
                None
            }
        }
    }
}

impl KeyValueBackend for LocalStorageBackend {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|error| StorageError::backend("local-storage-read", key, js_details(&error)))
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|error| StorageError::backend("local-storage-write", key, js_details(&error)))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|error| StorageError::backend("local-storage-remove", key, js_details(&error)))
    }
}
