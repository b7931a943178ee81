// ── Authentication state ──
//
// One `AuthState` per running app, constructed explicitly and handed to
// whoever needs it. Readers get an `AuthView` (a watch receiver) and can
// never mutate the session.

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::session::SessionStore;

/// Point-in-time view of the session.
#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    token: Option<SecretString>,
    is_loading: bool,
}

impl AuthSnapshot {
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// True until the session store has been consulted once.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
}

/// Owner of the session: the only place `login` / `logout` happen.
pub struct AuthState {
    store: SessionStore,
    state: watch::Sender<AuthSnapshot>,
}

impl AuthState {
    /// Unresolved state: loading, no token. Call [`resolve`](Self::resolve)
    /// to consult the store.
    pub fn new(store: SessionStore) -> Self {
        let (state, _) = watch::channel(AuthSnapshot {
            token: None,
            is_loading: true,
        });
        Self { store, state }
    }

    /// Construct and resolve in one step; the returned state is never
    /// loading.
    pub fn load(store: SessionStore) -> Self {
        let auth = Self::new(store);
        auth.resolve();
        auth
    }

    /// Read the persisted token once. Later calls are no-ops.
    pub fn resolve(&self) {
        if !self.state.borrow().is_loading {
            return;
        }
        let token = self.store.read();
        debug!(authenticated = token.is_some(), "session resolved");
        self.state.send_replace(AuthSnapshot {
            token,
            is_loading: false,
        });
    }

    /// Persist `token` and mark the session authenticated.
    ///
    /// An empty token is refused. On storage failure nothing changes in
    /// memory or in the store.
    pub fn login(&self, token: SecretString) -> Result<(), CoreError> {
        if token.expose_secret().is_empty() {
            return Err(CoreError::Internal("empty session token".into()));
        }
        self.store.write(&token)?;
        info!("session started");
        self.state.send_replace(AuthSnapshot {
            token: Some(token),
            is_loading: false,
        });
        Ok(())
    }

    /// Clear the persisted token and the in-memory session.
    ///
    /// The in-memory session is dropped even when the store fails to clear;
    /// the storage error is still returned.
    pub fn logout(&self) -> Result<(), CoreError> {
        let cleared = self.store.clear();
        if let Err(ref e) = cleared {
            warn!(error = %e, "failed to clear persisted session");
        }
        self.state.send_replace(AuthSnapshot {
            token: None,
            is_loading: false,
        });
        info!("session ended");
        cleared
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    /// Read-only handle for guards and consumers.
    pub fn view(&self) -> AuthView {
        AuthView {
            rx: self.state.subscribe(),
        }
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.state.borrow();
        f.debug_struct("AuthState")
            .field("authenticated", &snapshot.is_authenticated())
            .field("is_loading", &snapshot.is_loading)
            .finish_non_exhaustive()
    }
}

/// Read-only, cloneable view of an [`AuthState`].
#[derive(Debug, Clone)]
pub struct AuthView {
    rx: watch::Receiver<AuthSnapshot>,
}

impl AuthView {
    pub fn snapshot(&self) -> AuthSnapshot {
        self.rx.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.rx.borrow().is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_authenticated()
    }

    pub fn token(&self) -> Option<SecretString> {
        self.rx.borrow().token.clone()
    }

    /// Wait until the session has been resolved.
    pub async fn resolved(&self) -> AuthSnapshot {
        let mut rx = self.rx.clone();
        if rx.wait_for(|s| !s.is_loading).await.is_err() {
            debug!("auth owner dropped before resolving");
        }
        rx.borrow().clone()
    }

    /// Raw receiver for change notifications.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.rx.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use std::sync::Arc;

    use crate::session::{MemoryStorage, TOKEN_KEY, TokenStorage};

    struct ReadOnly;

    impl TokenStorage for ReadOnly {
        fn scope(&self) -> &str {
            "read-only"
        }
        fn get(&self, _key: &str) -> Result<Option<String>, CoreError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), CoreError> {
            Err(CoreError::storage("read-only", "denied"))
        }
        fn remove(&self, _key: &str) -> Result<(), CoreError> {
            Ok(())
        }
    }

    fn secret(raw: &str) -> SecretString {
        SecretString::from(raw.to_owned())
    }

    #[test]
    fn new_state_is_loading() {
        let auth = AuthState::new(SessionStore::in_memory());
        let snapshot = auth.snapshot();
        assert!(snapshot.is_loading());
        assert!(!snapshot.is_authenticated());
    }

    #[test]
    fn load_picks_up_persisted_token() {
        let primary = MemoryStorage::new();
        primary.set(TOKEN_KEY, "persisted").unwrap();

        let auth = AuthState::load(SessionStore::new(primary, MemoryStorage::new()));
        let snapshot = auth.snapshot();
        assert!(!snapshot.is_loading());
        assert_eq!(snapshot.token().unwrap().expose_secret(), "persisted");
    }

    #[test]
    fn load_with_empty_store_is_anonymous() {
        let auth = AuthState::load(SessionStore::in_memory());
        assert!(!auth.snapshot().is_loading());
        assert!(!auth.snapshot().is_authenticated());
    }

    #[test]
    fn login_persists_and_logout_clears() {
        let auth = AuthState::load(SessionStore::in_memory());
        let view = auth.view();

        auth.login(secret("abc")).unwrap();
        assert!(view.is_authenticated());
        assert_eq!(view.token().unwrap().expose_secret(), "abc");

        auth.logout().unwrap();
        assert!(!view.is_authenticated());

        // a fresh load from the same store finds nothing
        assert!(auth.store.read().is_none());
    }

    #[test]
    fn failed_login_is_not_restored_on_next_load() {
        let primary = Arc::new(MemoryStorage::new());
        let auth = AuthState::load(SessionStore::new(Arc::clone(&primary), ReadOnly));

        assert!(matches!(
            auth.login(secret("abc")),
            Err(CoreError::Storage { .. })
        ));
        assert!(!auth.snapshot().is_authenticated());

        let restarted = AuthState::load(SessionStore::new(primary, MemoryStorage::new()));
        assert!(!restarted.snapshot().is_authenticated());
    }

    #[test]
    fn empty_token_is_refused() {
        let primary = Arc::new(MemoryStorage::new());
        let auth = AuthState::load(SessionStore::new(Arc::clone(&primary), MemoryStorage::new()));

        assert!(auth.login(secret("")).is_err());
        assert!(!auth.snapshot().is_authenticated());
        assert_eq!(primary.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn resolve_is_idempotent() {
        let auth = AuthState::new(SessionStore::in_memory());
        auth.resolve();
        auth.login(secret("abc")).unwrap();
        auth.resolve();
        assert!(auth.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn view_waits_for_resolution() {
        let auth = AuthState::new(SessionStore::ephemeral(&secret("abc")));
        let view = auth.view();
        assert!(view.is_loading());

        let (snapshot, ()) = tokio::join!(view.resolved(), async { auth.resolve() });
        assert!(!snapshot.is_loading());
        assert!(snapshot.is_authenticated());
    }
}
