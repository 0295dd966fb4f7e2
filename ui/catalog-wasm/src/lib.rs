//! Browser bindings for MovieDeck.
//!
//! The page's view layer calls into [`MovieDeck`] for sign-in, the route
//! guard, the wishlist and the detail modal; catalog requests stay in the page.

pub mod observer;
pub mod scroll;
pub mod storage;

use md_api_types::{Movie, MovieId};
use md_app_core::{ModalStore, WishlistStore};
use md_auth_store::{AuthStore, Navigation, guard};
use md_storage::ScopedStorage;
use wasm_bindgen::prelude::*;

pub use observer::{InfiniteScroll, IntersectionWatcher};
pub use scroll::BodyScrollLock;
pub use storage::{LocalStorageStore, SessionStorageStore, browser_storage};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn to_js(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}

/// JS numbers arrive as `f64`; only whole, non-negative, exactly
/// representable values are movie ids.
fn movie_id_from_js(value: f64) -> Option<MovieId> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= MAX_SAFE_INTEGER {
        Some(value as MovieId)
    } else {
        None
    }
}

#[wasm_bindgen(js_name = imageUrl)]
pub fn image_url(path: Option<String>, size: Option<String>) -> String {
    md_catalog_client::image_url(
        path.as_deref().unwrap_or_default(),
        size.as_deref()
            .unwrap_or(md_catalog_client::DEFAULT_IMAGE_SIZE),
    )
}

#[wasm_bindgen]
pub struct MovieDeck {
    storage: ScopedStorage,
    auth: AuthStore,
    wishlist: WishlistStore,
    modal: ModalStore,
}

#[wasm_bindgen]
impl MovieDeck {
    /// Opens both web storages and restores any saved session.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<MovieDeck, JsValue> {
        let storage = browser_storage();
        Ok(MovieDeck {
            auth: AuthStore::new(storage.clone()).map_err(to_js)?,
            wishlist: WishlistStore::new(storage.clone()).map_err(to_js)?,
            modal: ModalStore::new(Box::new(BodyScrollLock)),
            storage,
        })
    }

    pub fn register(&mut self, email: &str, password: &str) -> Result<bool, JsValue> {
        self.auth.register(email, password).map_err(to_js)
    }

    pub fn login(&mut self, email: &str, password: &str, remember: Option<bool>) -> Result<bool, JsValue> {
        self.auth
            .login(email, password, remember.unwrap_or(true))
            .map_err(to_js)
    }

    pub fn logout(&mut self) -> Result<(), JsValue> {
        self.auth.logout().map_err(to_js)
    }

    #[wasm_bindgen(getter, js_name = isAuthenticated)]
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    #[wasm_bindgen(getter, js_name = currentUser)]
    pub fn current_user(&self) -> Option<String> {
        self.auth.current_user().map(|user| user.id.clone())
    }

    /// Path to redirect to, or `undefined` when navigation may proceed.
    #[wasm_bindgen(js_name = guardRoute)]
    pub fn guard_route(&self, path: &str) -> Result<Option<String>, JsValue> {
        match guard(&self.storage, path).map_err(to_js)? {
            Navigation::Proceed => Ok(None),
            Navigation::Redirect(to) => Ok(Some(to.to_owned())),
        }
    }

    #[wasm_bindgen(js_name = toggleWishlist)]
    pub fn toggle_wishlist(&mut self, movie: JsValue) -> Result<bool, JsValue> {
        let movie: Movie = serde_wasm_bindgen::from_value(movie)?;
        self.wishlist.toggle(movie).map_err(to_js)
    }

    #[wasm_bindgen(js_name = isInWishlist)]
    pub fn is_in_wishlist(&self, movie_id: f64) -> Result<bool, JsValue> {
        let id = movie_id_from_js(movie_id)
            .ok_or_else(|| JsValue::from_str(&format!("invalid movie id: {movie_id}")))?;
        Ok(self.wishlist.contains(id))
    }

    #[wasm_bindgen(getter)]
    pub fn wishlist(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(self.wishlist.entries())?)
    }

    #[wasm_bindgen(js_name = openModal)]
    pub fn open_modal(&mut self, movie: JsValue) -> Result<(), JsValue> {
        let movie: Movie = serde_wasm_bindgen::from_value(movie)?;
        self.modal.open(movie);
        Ok(())
    }

    #[wasm_bindgen(js_name = closeModal)]
    pub fn close_modal(&mut self) {
        self.modal.close();
    }

    #[wasm_bindgen(getter, js_name = isModalOpen)]
    pub fn is_modal_open(&self) -> bool {
        self.modal.is_open()
    }

    #[wasm_bindgen(getter, js_name = selectedMovie)]
    pub fn selected_movie(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.modal.selected_movie())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_whole_non_negative_ids() {
        assert_eq!(movie_id_from_js(0.0), Some(0));
        assert_eq!(movie_id_from_js(550.0), Some(550));
        assert_eq!(movie_id_from_js(9_007_199_254_740_991.0), Some(9_007_199_254_740_991));
    }

    #[test]
    fn rejects_ids_that_would_be_truncated() {
        for bad in [-1.0, 12.5, f64::NAN, f64::INFINITY, 1e300] {
            assert_eq!(movie_id_from_js(bad), None, "{bad} should be rejected");
        }
    }
}
