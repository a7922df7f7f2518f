use bubble_engine::{SessionStore, StorageArea, StorageError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Storage;

/// `localStorage` / `sessionStorage` behind the engine's `SessionStore`.
/// Private browsing and disabled storage surface as errors, never panics.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn area(area: StorageArea) -> Result<Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = match area {
            StorageArea::Local => window.local_storage(),
            StorageArea::Session => window.session_storage(),
        };
        storage.ok().flatten().ok_or(StorageError::Unavailable)
    }
}

impl SessionStore for BrowserStorage {
    fn set_item(&mut self, area: StorageArea, key: &str, value: &str) -> Result<(), StorageError> {
        Self::area(area)?
            .set_item(key, value)
            .map_err(|e| StorageError::Rejected {
                key: key.to_owned(),
                message: describe(&e),
            })
    }

    fn get_item(&self, area: StorageArea, key: &str) -> Option<String> {
        Self::area(area).ok()?.get_item(key).ok().flatten()
    }
}

fn describe(err: &JsValue) -> String {
    if let Some(e) = err.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}
