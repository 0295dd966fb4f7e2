//! Local sign-in state.
//!
//! Credentials live in plain text under the `users` key and the signed-in
//! identity is trusted as soon as a session record is read back. This is demo
//! behaviour, not an authentication scheme.

use anyhow::Result;
use md_api_types::{Route, SessionRecord, UserRecord};
use md_storage::{Scope, ScopedStorage, keys};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(SessionRecord),
}

pub struct AuthStore {
    storage: ScopedStorage,
    state: AuthState,
}

impl AuthStore {
    /// Builds the store and immediately tries to restore a persisted session.
    pub fn new(storage: ScopedStorage) -> Result<Self> {
        let mut store = Self {
            storage,
            state: AuthState::Anonymous,
        };
        store.load_user()?;
        Ok(store)
    }

    /// Adopts the session record found in the durable scope, else the session
    /// scope. Returns whether one was found.
    pub fn load_user(&mut self) -> Result<bool> {
        for scope in Scope::LOOKUP_ORDER {
            if let Some(record) = self
                .storage
                .read_json::<SessionRecord>(scope, keys::CURRENT_USER)?
            {
                debug!(?scope, user = %record.id, "restored session");
                self.state = AuthState::Authenticated(record);
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    pub fn current_user(&self) -> Option<&SessionRecord> {
        match &self.state {
            AuthState::Authenticated(record) => Some(record),
            AuthState::Anonymous => None,
        }
    }

    pub fn registered_users(&self) -> Result<Vec<UserRecord>> {
        self.storage.read_json_or_default(Scope::Durable, keys::USERS)
    }

    /// `Ok(false)` when the email is already taken. Never signs the user in.
    pub fn register(&mut self, email: &str, password: &str) -> Result<bool> {
        let mut users = self.registered_users()?;
        if users.iter().any(|user| user.id == email) {
            return Ok(false);
        }

        users.push(UserRecord {
            id: email.to_owned(),
            password: password.to_owned(),
        });
        self.storage.write_json(Scope::Durable, keys::USERS, &users)?;
        info!(user = email, "registered");
        Ok(true)
    }

    /// `Ok(false)` on unknown email or wrong password, leaving state untouched.
    ///
    /// On success the session record and the catalog key (the password) go to
    /// the durable scope when `remember` is set, otherwise to the session scope.
    pub fn login(&mut self, email: &str, password: &str, remember: bool) -> Result<bool> {
        let users = self.registered_users()?;
        let matched = users
            .iter()
            .any(|user| user.id == email && user.password == password);
        if !matched {
            debug!(user = email, "login rejected");
            return Ok(false);
        }

        let record = SessionRecord {
            id: email.to_owned(),
        };
        let scope = if remember { Scope::Durable } else { Scope::Session };
        // The session record goes last: once it exists the guard lets the
        // user through, so a failed login must never leave it behind.
        let previous_key = self.storage.get(scope, keys::API_KEY)?;
        self.storage.set(scope, keys::API_KEY, password)?;
        if let Err(err) = self.storage.write_json(scope, keys::CURRENT_USER, &record) {
            let restored = match &previous_key {
                Some(key) => self.storage.set(scope, keys::API_KEY, key),
                None => self.storage.remove(scope, keys::API_KEY),
            };
            if let Err(restore_err) = restored {
                warn!(?scope, "could not roll back catalog key: {}", restore_err);
            }
            return Err(err);
        }

        info!(user = email, ?scope, "signed in");
        self.state = AuthState::Authenticated(record);
        Ok(true)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.state = AuthState::Anonymous;
        self.storage.remove_everywhere(keys::CURRENT_USER)?;
        self.storage.remove_everywhere(keys::API_KEY)?;
        debug!("signed out");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(&'static str),
}

/// Route guard: everything but the sign-in page needs a session record in
/// either scope. Unknown paths are treated as protected.
pub fn guard(storage: &ScopedStorage, path: &str) -> Result<Navigation> {
    if Route::from_path(path).is_some_and(Route::is_public) {
        return Ok(Navigation::Proceed);
    }
    if storage.get_first(keys::CURRENT_USER)?.is_some() {
        Ok(Navigation::Proceed)
    } else {
        Ok(Navigation::Redirect(Route::SignIn.path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use md_storage::{InMemoryStore, KeyValueStore};
    use std::sync::{Arc, Mutex};

    /// Durable backend that rejects writes to one chosen key.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryStore,
        failing_key: Mutex<Option<&'static str>>,
    }

    impl FlakyStore {
        fn fail_on(&self, key: &'static str) {
            *self.failing_key.lock().expect("lock") = Some(key);
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if *self.failing_key.lock().expect("lock") == Some(key) {
                return Err(anyhow!("quota exceeded"));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    fn flaky_storage() -> (Arc<FlakyStore>, ScopedStorage) {
        let durable = Arc::new(FlakyStore::default());
        let storage = ScopedStorage::new(durable.clone(), Arc::new(InMemoryStore::new()));
        (durable, storage)
    }

    #[test]
    fn failed_key_write_persists_no_session() -> Result<()> {
        let (durable, storage) = flaky_storage();
        let mut auth = registered(&storage)?;
        durable.fail_on(keys::API_KEY);

        assert!(auth.login("neo@matrix.io", "red-pill", true).is_err());
        assert!(!auth.is_authenticated());
        assert_eq!(storage.get_first(keys::CURRENT_USER)?, None);
        assert_eq!(guard(&storage, "/wishlist")?, Navigation::Redirect("/signin"));
        assert!(!AuthStore::new(storage.with_fresh_session())?.is_authenticated());
        Ok(())
    }

    #[test]
    fn failed_session_write_restores_previous_key() -> Result<()> {
        let (durable, storage) = flaky_storage();
        let mut auth = registered(&storage)?;
        storage.set(Scope::Durable, keys::API_KEY, "older-key")?;
        durable.fail_on(keys::CURRENT_USER);

        assert!(auth.login("neo@matrix.io", "red-pill", true).is_err());
        assert!(!auth.is_authenticated());
        assert_eq!(storage.get_first(keys::CURRENT_USER)?, None);
        assert_eq!(storage.get(Scope::Durable, keys::API_KEY)?.as_deref(), Some("older-key"));
        Ok(())
    }

    fn registered(storage: &ScopedStorage) -> Result<AuthStore> {
        let mut auth = AuthStore::new(storage.clone())?;
        assert!(auth.register("neo@matrix.io", "red-pill")?);
        Ok(auth)
    }

    #[test]
    fn starts_anonymous_without_session() -> Result<()> {
        let auth = AuthStore::new(ScopedStorage::in_memory())?;
        assert_eq!(auth.state(), &AuthState::Anonymous);
        assert!(auth.current_user().is_none());
        Ok(())
    }

    #[test]
    fn registering_twice_keeps_one_record() -> Result<()> {
        let storage = ScopedStorage::in_memory();
        let mut auth = registered(&storage)?;
        assert!(!auth.register("neo@matrix.io", "blue-pill")?);

        let users = auth.registered_users()?;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].password, "red-pill");
        assert!(!auth.is_authenticated());
        Ok(())
    }

    #[test]
    fn login_checks_exact_credentials() -> Result<()> {
        let storage = ScopedStorage::in_memory();
        let mut auth = registered(&storage)?;

        assert!(!auth.login("neo@matrix.io", "Red-Pill", true)?);
        assert!(!auth.login("trinity@matrix.io", "red-pill", true)?);
        assert!(!auth.is_authenticated());
        assert_eq!(storage.get_first(keys::CURRENT_USER)?, None);

        assert!(auth.login("neo@matrix.io", "red-pill", true)?);
        assert_eq!(auth.current_user().map(|u| u.id.as_str()), Some("neo@matrix.io"));
        Ok(())
    }

    #[test]
    fn failed_login_keeps_existing_session() -> Result<()> {
        let storage = ScopedStorage::in_memory();
        let mut auth = registered(&storage)?;
        auth.register("trinity@matrix.io", "white-rabbit")?;
        assert!(auth.login("trinity@matrix.io", "white-rabbit", true)?);

        assert!(!auth.login("neo@matrix.io", "wrong", true)?);
        assert_eq!(auth.current_user().map(|u| u.id.as_str()), Some("trinity@matrix.io"));
        Ok(())
    }

    #[test]
    fn session_record_does_not_carry_password() -> Result<()> {
        let storage = ScopedStorage::in_memory();
        let mut auth = registered(&storage)?;
        auth.login("neo@matrix.io", "red-pill", true)?;

        let raw = storage.get(Scope::Durable, keys::CURRENT_USER)?;
        assert_eq!(raw.as_deref(), Some(r#"{"id":"neo@matrix.io"}"#));
        assert_eq!(storage.get(Scope::Durable, keys::API_KEY)?.as_deref(), Some("red-pill"));
        Ok(())
    }

    #[test]
    fn remembered_login_survives_restart() -> Result<()> {
        let storage = ScopedStorage::in_memory();
        let mut auth = registered(&storage)?;
        auth.login("neo@matrix.io", "red-pill", true)?;

        let restored = AuthStore::new(storage.with_fresh_session())?;
        assert_eq!(restored.current_user().map(|u| u.id.as_str()), Some("neo@matrix.io"));
        Ok(())
    }

    #[test]
    fn unremembered_login_lives_in_session_scope_only() -> Result<()> {
        let storage = ScopedStorage::in_memory();
        let mut auth = registered(&storage)?;
        auth.login("neo@matrix.io", "red-pill", false)?;

        assert_eq!(storage.get(Scope::Durable, keys::CURRENT_USER)?, None);
        assert_eq!(storage.get(Scope::Session, keys::API_KEY)?.as_deref(), Some("red-pill"));

        let same_session = AuthStore::new(storage.clone())?;
        assert!(same_session.is_authenticated());

        let after_restart = AuthStore::new(storage.with_fresh_session())?;
        assert!(!after_restart.is_authenticated());
        Ok(())
    }

    #[test]
    fn logout_clears_both_scopes_and_is_idempotent() -> Result<()> {
        let storage = ScopedStorage::in_memory();
        let mut auth = registered(&storage)?;
        auth.login("neo@matrix.io", "red-pill", true)?;
        storage.write_json(Scope::Session, keys::CURRENT_USER, &SessionRecord { id: "x".into() })?;

        auth.logout()?;
        assert!(!auth.is_authenticated());
        assert_eq!(storage.get_first(keys::CURRENT_USER)?, None);
        assert_eq!(storage.get_first(keys::API_KEY)?, None);

        auth.logout()?;
        assert_eq!(auth.state(), &AuthState::Anonymous);
        assert_eq!(auth.registered_users()?.len(), 1);
        Ok(())
    }

    #[test]
    fn corrupted_records_are_treated_as_absent() -> Result<()> {
        let storage = ScopedStorage::in_memory();
        storage.set(Scope::Durable, keys::CURRENT_USER, "{oops")?;
        storage.set(Scope::Durable, keys::USERS, "not-json")?;

        let mut auth = AuthStore::new(storage.clone())?;
        assert!(!auth.is_authenticated());
        assert!(auth.register("neo@matrix.io", "red-pill")?);
        assert_eq!(auth.registered_users()?.len(), 1);
        Ok(())
    }

    #[test]
    fn guard_redirects_without_session() -> Result<()> {
        let storage = ScopedStorage::in_memory();
        assert_eq!(guard(&storage, "/signin")?, Navigation::Proceed);
        assert_eq!(guard(&storage, "/wishlist")?, Navigation::Redirect("/signin"));
        assert_eq!(guard(&storage, "/")?, Navigation::Redirect("/signin"));

        let mut auth = registered(&storage)?;
        auth.login("neo@matrix.io", "red-pill", false)?;
        assert_eq!(guard(&storage, "/wishlist")?, Navigation::Proceed);
        assert_eq!(guard(&storage, "/popular")?, Navigation::Proceed);
        Ok(())
    }
}
