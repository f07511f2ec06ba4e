use crate::camera::utils::js_error;
use glowish_capture::{HandoffError, PhotoStore};
use wasm_bindgen::prelude::*;

/// Handoff storage backed by `window.sessionStorage`, which the review page
/// reads from.
pub struct SessionStore {
    storage: web_sys::Storage,
}

impl SessionStore {
    pub fn open() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let storage = window.session_storage()?.ok_or("sessionStorage unavailable")?;
        Ok(Self { storage })
    }
}

impl PhotoStore for SessionStore {
    fn set_item(&self, key: &str, value: &str) -> Result<(), HandoffError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| HandoffError::Storage(js_error(&e)))
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, HandoffError> {
        self.storage
            .get_item(key)
            .map_err(|e| HandoffError::Storage(js_error(&e)))
    }

    fn remove_item(&self, key: &str) -> Result<(), HandoffError> {
        self.storage
            .remove_item(key)
            .map_err(|e| HandoffError::Storage(js_error(&e)))
    }
}
