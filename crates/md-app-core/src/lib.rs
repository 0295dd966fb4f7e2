//! Application context: every store constructed once and handed out by
//! reference, instead of process-wide singletons.

pub mod modal;
pub mod visibility;
pub mod wishlist;

use anyhow::Result;
use md_api_types::{MovieDetail, MovieId};
use md_auth_store::{AuthStore, Navigation, guard};
use md_catalog_client::CatalogClient;
use md_storage::ScopedStorage;

pub use modal::{ModalStore, NoopScrollLock, ScrollLock};
pub use visibility::{
    ManualWatcher, VisibilityOptions, VisibilitySignal, VisibilityTrigger, VisibilityWatcher,
};
pub use wishlist::WishlistStore;

pub struct AppContext<C> {
    storage: ScopedStorage,
    catalog: C,
    auth: AuthStore,
    wishlist: WishlistStore,
    modal: ModalStore,
}

impl<C> AppContext<C>
where
    C: CatalogClient,
{
    /// Builds all stores over `storage`; the auth store restores any
    /// persisted session as part of this.
    pub fn new(storage: ScopedStorage, catalog: C, scroll: Box<dyn ScrollLock>) -> Result<Self> {
        Ok(Self {
            auth: AuthStore::new(storage.clone())?,
            wishlist: WishlistStore::new(storage.clone())?,
            modal: ModalStore::new(scroll),
            storage,
            catalog,
        })
    }

    pub fn storage(&self) -> &ScopedStorage {
        &self.storage
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthStore {
        &mut self.auth
    }

    pub fn wishlist(&self) -> &WishlistStore {
        &self.wishlist
    }

    pub fn wishlist_mut(&mut self) -> &mut WishlistStore {
        &mut self.wishlist
    }

    pub fn modal(&self) -> &ModalStore {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut ModalStore {
        &mut self.modal
    }

    pub fn navigate(&self, path: &str) -> Result<Navigation> {
        guard(&self.storage, path)
    }

    /// Loads a movie's details and shows it in the modal.
    pub async fn open_detail(&mut self, id: MovieId) -> Result<MovieDetail> {
        let detail = self.catalog.fetch_detail(id).await?;
        self.modal.open(detail.movie.clone());
        Ok(detail)
    }

    /// Wishlist toggle for callers that only hold an id. Removal works from
    /// the saved copy; adding fetches the movie first.
    pub async fn toggle_wishlist_by_id(&mut self, id: MovieId) -> Result<bool> {
        if let Some(saved) = self.wishlist.get(id).cloned() {
            return self.wishlist.toggle(saved);
        }
        let detail = self.catalog.fetch_detail(id).await?;
        self.wishlist.toggle(detail.movie)
    }
}
