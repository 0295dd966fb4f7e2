//! `localStorage` / `sessionStorage` as the two persistence scopes.
//!
//! The handles are looked up on every call (the window owns them), so the
//! store types themselves carry no JS objects.

use anyhow::{Result, anyhow};
use md_storage::{KeyValueStore, ScopedStorage};
use std::sync::Arc;
use wasm_bindgen::JsValue;

fn js_err(context: &str, err: JsValue) -> anyhow::Error {
    anyhow!("{context}: {err:?}")
}

fn window() -> Result<web_sys::Window> {
    web_sys::window().ok_or_else(|| anyhow!("no window available"))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageStore;

#[derive(Clone, Copy, Debug, Default)]
pub struct SessionStorageStore;

impl LocalStorageStore {
    fn raw(&self) -> Result<web_sys::Storage> {
        window()?
            .local_storage()
            .map_err(|e| js_err("localStorage access denied", e))?
            .ok_or_else(|| anyhow!("localStorage unavailable"))
    }
}

impl SessionStorageStore {
    fn raw(&self) -> Result<web_sys::Storage> {
        window()?
            .session_storage()
            .map_err(|e| js_err("sessionStorage access denied", e))?
            .ok_or_else(|| anyhow!("sessionStorage unavailable"))
    }
}

macro_rules! web_store {
    ($ty:ty) => {
        impl KeyValueStore for $ty {
            fn get(&self, key: &str) -> Result<Option<String>> {
                self.raw()?
                    .get_item(key)
                    .map_err(|e| js_err("storage read failed", e))
            }

            fn set(&self, key: &str, value: &str) -> Result<()> {
                self.raw()?
                    .set_item(key, value)
                    .map_err(|e| js_err("storage write failed", e))
            }

            fn remove(&self, key: &str) -> Result<()> {
                self.raw()?
                    .remove_item(key)
                    .map_err(|e| js_err("storage remove failed", e))
            }
        }
    };
}

web_store!(LocalStorageStore);
web_store!(SessionStorageStore);

/// Durable scope on `localStorage`, session scope on `sessionStorage`.
pub fn browser_storage() -> ScopedStorage {
    ScopedStorage::new(Arc::new(LocalStorageStore), Arc::new(SessionStorageStore))
}
