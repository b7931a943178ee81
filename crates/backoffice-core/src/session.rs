// ── Session token persistence ──
//
// The session token lives under a single key in two scopes. Writes and
// clears touch both; reads prefer the primary (long-lived) scope. A scope
// that cannot be read counts as empty.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::error::CoreError;

/// Storage key of the session token in every scope.
pub const TOKEN_KEY: &str = "token";

/// A string key-value scope the session token can be kept in.
pub trait TokenStorage: Send + Sync {
    /// Short scope label used in logs and errors.
    fn scope(&self) -> &str;

    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

impl<T: TokenStorage + ?Sized> TokenStorage for Arc<T> {
    fn scope(&self) -> &str {
        (**self).scope()
    }

    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        (**self).remove(key)
    }
}

// ── MemoryStorage ────────────────────────────────────────────────────

/// Process-lived scope. Gone when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStorage for MemoryStorage {
    fn scope(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entries().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.entries().remove(key);
        Ok(())
    }
}

// ── FileStorage ──────────────────────────────────────────────────────

/// Long-lived scope backed by a JSON object on disk.
///
/// The file is created with owner-only permissions on Unix and removed once
/// its last key is cleared.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, CoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| CoreError::storage("file", e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(CoreError::storage("file", e)),
        }
    }

    fn store(&self, entries: &BTreeMap<String, String>) -> Result<(), CoreError> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(CoreError::storage("file", e)),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::storage("file", e))?;
        }

        let json =
            serde_json::to_string_pretty(entries).map_err(|e| CoreError::storage("file", e))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| CoreError::storage("file", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))
                .map_err(|e| CoreError::storage("file", e))?;
        }

        fs::rename(&tmp, &self.path).map_err(|e| CoreError::storage("file", e))
    }
}

impl TokenStorage for FileStorage {
    fn scope(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.store(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.store(&entries)
    }
}

// ── SessionStore ─────────────────────────────────────────────────────

/// The session token mirrored across a primary and a secondary scope.
pub struct SessionStore {
    primary: Box<dyn TokenStorage>,
    secondary: Box<dyn TokenStorage>,
}

impl SessionStore {
    pub fn new(
        primary: impl TokenStorage + 'static,
        secondary: impl TokenStorage + 'static,
    ) -> Self {
        Self {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        }
    }

    /// Two memory scopes; nothing outlives the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new(), MemoryStorage::new())
    }

    /// A memory-only session already holding `token`.
    pub fn ephemeral(token: &SecretString) -> Self {
        let secondary = MemoryStorage::new();
        // MemoryStorage::set is infallible
        let _ = secondary.set(TOKEN_KEY, token.expose_secret());
        Self::new(MemoryStorage::new(), secondary)
    }

    /// The stored token: primary scope first, then secondary.
    pub fn read(&self) -> Option<SecretString> {
        [&self.primary, &self.secondary]
            .into_iter()
            .find_map(|scope| match scope.get(TOKEN_KEY) {
                Ok(Some(token)) if !token.is_empty() => Some(SecretString::from(token)),
                Ok(_) => None,
                Err(e) => {
                    warn!(scope = scope.scope(), error = %e, "session scope unreadable, treating as empty");
                    None
                }
            })
    }

    /// Store `token` in both scopes, or in neither.
    ///
    /// If the secondary write fails the primary scope is rolled back so a
    /// failed write never resurfaces as a session on the next load.
    pub fn write(&self, token: &SecretString) -> Result<(), CoreError> {
        debug!(
            primary = self.primary.scope(),
            secondary = self.secondary.scope(),
            "persisting session token"
        );
        self.primary.set(TOKEN_KEY, token.expose_secret())?;
        if let Err(e) = self.secondary.set(TOKEN_KEY, token.expose_secret()) {
            if let Err(rollback) = self.primary.remove(TOKEN_KEY) {
                warn!(
                    scope = self.primary.scope(),
                    error = %rollback,
                    "could not roll back session token"
                );
            }
            return Err(e);
        }
        Ok(())
    }

    /// Remove the token from both scopes. Both are attempted even if the
    /// first fails; the first error is returned.
    pub fn clear(&self) -> Result<(), CoreError> {
        debug!("clearing session token");
        let primary = self.primary.remove(TOKEN_KEY);
        let secondary = self.secondary.remove(TOKEN_KEY);
        primary.and(secondary)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("primary", &self.primary.scope())
            .field("secondary", &self.secondary.scope())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Unreadable;

    impl TokenStorage for Unreadable {
        fn scope(&self) -> &str {
            "broken"
        }
        fn get(&self, _key: &str) -> Result<Option<String>, CoreError> {
            Err(CoreError::storage("broken", "denied"))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), CoreError> {
            Err(CoreError::storage("broken", "denied"))
        }
        fn remove(&self, _key: &str) -> Result<(), CoreError> {
            Err(CoreError::storage("broken", "denied"))
        }
    }

    fn secret(raw: &str) -> SecretString {
        SecretString::from(raw.to_owned())
    }

    #[test]
    fn write_then_read_then_clear() {
        let primary = Arc::new(MemoryStorage::new());
        let secondary = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(Arc::clone(&primary), Arc::clone(&secondary));
        assert!(store.read().is_none());

        store.write(&secret("abc")).unwrap();
        assert_eq!(store.read().unwrap().expose_secret(), "abc");
        assert_eq!(primary.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(secondary.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        store.clear().unwrap();
        assert!(store.read().is_none());
        assert_eq!(primary.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(secondary.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn read_prefers_primary_scope() {
        let primary = MemoryStorage::new();
        let secondary = MemoryStorage::new();
        primary.set(TOKEN_KEY, "long-lived").unwrap();
        secondary.set(TOKEN_KEY, "process").unwrap();

        let store = SessionStore::new(primary, secondary);
        assert_eq!(store.read().unwrap().expose_secret(), "long-lived");
    }

    #[test]
    fn read_falls_back_to_secondary() {
        let secondary = MemoryStorage::new();
        secondary.set(TOKEN_KEY, "process").unwrap();

        let store = SessionStore::new(MemoryStorage::new(), secondary);
        assert_eq!(store.read().unwrap().expose_secret(), "process");
    }

    #[test]
    fn unreadable_scope_counts_as_empty() {
        let secondary = MemoryStorage::new();
        secondary.set(TOKEN_KEY, "process").unwrap();

        let store = SessionStore::new(Unreadable, secondary);
        assert_eq!(store.read().unwrap().expose_secret(), "process");
    }

    #[test]
    fn write_failure_is_reported() {
        let store = SessionStore::new(Unreadable, MemoryStorage::new());
        let err = store.write(&secret("abc")).unwrap_err();
        assert!(matches!(err, CoreError::Storage { .. }));
    }

    #[test]
    fn failed_secondary_write_rolls_back_primary() {
        let primary = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(Arc::clone(&primary), Unreadable);

        let err = store.write(&secret("abc")).unwrap_err();

        assert!(matches!(err, CoreError::Storage { .. }));
        assert_eq!(primary.get(TOKEN_KEY).unwrap(), None);

        let reopened = SessionStore::new(Arc::clone(&primary), MemoryStorage::new());
        assert!(reopened.read().is_none());
    }

    #[test]
    fn clear_attempts_both_scopes() {
        let secondary = MemoryStorage::new();
        secondary.set(TOKEN_KEY, "process").unwrap();
        let store = SessionStore::new(Unreadable, secondary);

        assert!(store.clear().is_err());
        assert!(store.read().is_none());
    }

    #[test]
    fn ephemeral_store_holds_token() {
        let store = SessionStore::ephemeral(&secret("flag-token"));
        assert_eq!(store.read().unwrap().expose_secret(), "flag-token");
    }

    #[test]
    fn file_storage_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileStorage::new(&path).set(TOKEN_KEY, "persisted").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(
            reopened.get(TOKEN_KEY).unwrap().as_deref(),
            Some("persisted")
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn file_storage_removes_file_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileStorage::new(&path);

        storage.set(TOKEN_KEY, "t").unwrap();
        assert!(path.exists());

        storage.remove(TOKEN_KEY).unwrap();
        assert!(!path.exists());
        // absent key, absent file
        storage.remove(TOKEN_KEY).unwrap();
    }

    #[test]
    fn corrupt_session_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let store = SessionStore::new(FileStorage::new(&path), MemoryStorage::new());
        assert!(store.read().is_none());
    }
}
