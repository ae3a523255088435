//! `window.localStorage` backend

use super::{Storage, StorageError};

/// Browser LocalStorage
#[derive(Debug, Clone)]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Open the window's LocalStorage, if the browser allows it
    pub fn open() -> Result<Self, StorageError> {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { inner })
    }
}

fn backend_error(e: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Backend(format!("{e:?}"))
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key).map_err(backend_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set_item(key, value).map_err(backend_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key).map_err(backend_error)
    }
}
