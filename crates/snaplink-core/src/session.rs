// ── Persisted session ──
//
// The session is two key–value entries in durable storage: the bearer
// token and the serialized user. `SessionManager` is the only code that
// touches those keys; everything else asks it, or subscribes to its
// `watch` channel to react to sign-in, sign-out and expiry.

use std::collections::HashMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use snaplink_api::{TokenProvider, User};

use crate::error::CoreError;

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "auth_token";

/// Storage key of the serialized user.
pub const USER_KEY: &str = "user_data";

// ── Storage backends ─────────────────────────────────────────────────

/// Synchronous string key–value storage for session data.
///
/// Reads and writes are immediately visible to later calls from the same
/// process.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

/// One file per key inside a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash never leaves a half-written value. On Unix the files are created
/// with mode `0600`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn io_error(path: &Path, source: std::io::Error) -> CoreError {
        CoreError::Storage {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let path = self.path(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&self.dir, e))?;

        let path = self.path(key);
        let tmp = self.dir.join(format!(".{key}.tmp"));
        std::fs::write(&tmp, value).map_err(|e| Self::io_error(&tmp, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| Self::io_error(&tmp, e))?;
        }

        std::fs::rename(&tmp, &path).map_err(|e| Self::io_error(&path, e))
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let path = self.path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }
}

/// Process-local storage. The session ends with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// ── SessionState ─────────────────────────────────────────────────────

/// Authentication state observable by front ends.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No token stored.
    SignedOut,
    /// A token is stored. `user` is `None` if the profile entry is missing
    /// or unreadable.
    SignedIn { user: Option<User> },
    /// The server rejected the stored token and the session was cleared.
    /// Front ends should send the user back to sign-in.
    Expired,
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }
}

// ── SessionManager ───────────────────────────────────────────────────

/// Single access point for the persisted session.
///
/// Writes are serialized behind a mutex so that a burst of 401 responses
/// from concurrent requests clears the session and publishes
/// [`SessionState::Expired`] exactly once.
pub struct SessionManager {
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
    write_lock: Mutex<()>,
}

impl SessionManager {
    /// Open the session stored in `storage`.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::SignedOut);
        let manager = Self {
            storage,
            state,
            write_lock: Mutex::new(()),
        };
        let initial = manager.read_state();
        manager.state.send_replace(initial);
        manager
    }

    fn read_state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::SignedIn {
                user: self.current_user(),
            }
        } else {
            SessionState::SignedOut
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The stored bearer token, if any.
    pub fn token(&self) -> Option<SecretString> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            Err(e) => {
                warn!(error = %e, "failed to read stored token");
                None
            }
        }
    }

    /// `true` iff a token is stored. The token is not validated: an
    /// expired token still counts until the server rejects it.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The cached user profile.
    pub fn current_user(&self) -> Option<User> {
        let raw = match self.storage.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "failed to read stored user");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "stored user entry is corrupt");
                None
            }
        }
    }

    /// The current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Store a new session.
    ///
    /// The user entry is written first and the token last; the token is the
    /// commit point. If the token write fails the previous user entry is
    /// put back, so storage keeps whatever session it held before.
    pub fn persist(&self, token: &str, user: &User) -> Result<(), CoreError> {
        let user_json = serde_json::to_string(user)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let previous_user = self.storage.get(USER_KEY)?;
        self.storage.set(USER_KEY, &user_json)?;
        if let Err(e) = self.storage.set(TOKEN_KEY, token) {
            let rollback = match previous_user {
                Some(ref prev) => self.storage.set(USER_KEY, prev),
                None => self.storage.remove(USER_KEY),
            };
            if let Err(rollback) = rollback {
                warn!(error = %rollback, "failed to roll back user entry");
            }
            return Err(e);
        }

        info!(email = %user.email, "session stored");
        self.state.send_replace(SessionState::SignedIn {
            user: Some(user.clone()),
        });
        Ok(())
    }

    /// Remove both entries (logout).
    pub fn clear(&self) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.remove_entries()?;
        debug!("session cleared");
        self.state.send_replace(SessionState::SignedOut);
        Ok(())
    }

    /// Tear the session down after the server rejected its token.
    ///
    /// Returns `true` if this call ended a live session; later calls for
    /// the same rejection find nothing to clear and return `false`.
    ///
    /// If the token cannot be removed the session is still on disk, so the
    /// published state stays what storage reports and `false` is returned.
    pub fn reject(&self) -> bool {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_authenticated() {
            return false;
        }
        if let Err(e) = self.remove_entries() {
            warn!(error = %e, "failed to clear rejected session");
        }
        if self.is_authenticated() {
            error!("rejected token is still stored, session left in place");
            self.state.send_replace(self.read_state());
            return false;
        }
        info!("session expired, sign-in required");
        self.state.send_replace(SessionState::Expired);
        true
    }

    fn remove_entries(&self) -> Result<(), CoreError> {
        let token = self.storage.remove(TOKEN_KEY);
        let user = self.storage.remove(USER_KEY);
        token.and(user)
    }
}

impl TokenProvider for SessionManager {
    fn bearer_token(&self) -> Option<SecretString> {
        self.token()
    }

    fn session_rejected(&self) {
        self.reject();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    /// Storage whose token writes always fail.
    #[derive(Default)]
    struct TokenWriteFails {
        inner: MemoryStorage,
    }

    impl SessionStorage for TokenWriteFails {
        fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
            if key == TOKEN_KEY {
                return Err(CoreError::Storage {
                    path: PathBuf::from(key),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), CoreError> {
            self.inner.remove(key)
        }
    }

    /// Storage that can be told to fail writes or removals of one key.
    #[derive(Default)]
    struct FailingKey {
        inner: MemoryStorage,
        set_fails: Mutex<Option<&'static str>>,
        remove_fails: Mutex<Option<&'static str>>,
    }

    impl FailingKey {
        fn fail_set(&self, key: &'static str) {
            *self.set_fails.lock().unwrap() = Some(key);
        }

        fn fail_remove(&self, key: &'static str) {
            *self.remove_fails.lock().unwrap() = Some(key);
        }

        fn refuse(key: &str) -> CoreError {
            CoreError::Storage {
                path: PathBuf::from(key),
                source: std::io::Error::other("read-only file system"),
            }
        }
    }

    impl SessionStorage for FailingKey {
        fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
            if *self.set_fails.lock().unwrap() == Some(key) {
                return Err(Self::refuse(key));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), CoreError> {
            if *self.remove_fails.lock().unwrap() == Some(key) {
                return Err(Self::refuse(key));
            }
            self.inner.remove(key)
        }
    }

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn starts_signed_out_on_empty_storage() {
        let session = manager();
        assert!(!session.is_authenticated());
        assert_eq!(session.state(), SessionState::SignedOut);
    }

    #[test]
    fn persist_writes_both_keys() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionManager::new(storage.clone());

        session.persist("jwt", &User::new("ada@example.com")).unwrap();

        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("jwt"));
        assert!(storage.get(USER_KEY).unwrap().unwrap().contains("ada@example.com"));
        assert_eq!(session.token().unwrap().expose_secret(), "jwt");
        assert_eq!(session.current_user().unwrap().email, "ada@example.com");
        assert!(session.state().is_signed_in());
    }

    #[test]
    fn failed_token_write_commits_nothing() {
        let storage = Arc::new(TokenWriteFails::default());
        let session = SessionManager::new(storage.clone());

        assert!(session.persist("jwt", &User::new("ada@example.com")).is_err());

        assert!(storage.get(USER_KEY).unwrap().is_none());
        assert!(!session.is_authenticated());
        assert_eq!(session.state(), SessionState::SignedOut);
    }

    #[test]
    fn failed_token_write_keeps_previous_session() {
        let storage = Arc::new(FailingKey::default());
        let session = SessionManager::new(storage.clone());
        session.persist("old-jwt", &User::new("ada@example.com")).unwrap();

        storage.fail_set(TOKEN_KEY);
        assert!(session.persist("new-jwt", &User::new("bob@example.com")).is_err());

        assert_eq!(session.token().unwrap().expose_secret(), "old-jwt");
        assert_eq!(session.current_user().unwrap().email, "ada@example.com");
        assert_eq!(
            session.state(),
            SessionState::SignedIn {
                user: Some(User::new("ada@example.com")),
            }
        );
    }

    #[test]
    fn authenticated_is_presence_only() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "not-even-a-jwt").unwrap();
        let session = SessionManager::new(storage);

        assert!(session.is_authenticated());
        assert_eq!(session.state(), SessionState::SignedIn { user: None });
    }

    #[test]
    fn clear_removes_both_keys() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionManager::new(storage.clone());
        session.persist("jwt", &User::new("a@b.io")).unwrap();

        session.clear().unwrap();

        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
        assert!(storage.get(USER_KEY).unwrap().is_none());
        assert_eq!(session.state(), SessionState::SignedOut);
    }

    #[test]
    fn reject_expires_once() {
        let session = manager();
        session.persist("jwt", &User::new("a@b.io")).unwrap();
        let mut rx = session.subscribe();
        rx.borrow_and_update();

        assert!(session.reject());
        assert!(!session.reject());
        assert!(!session.reject());

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionState::Expired);
        assert!(!rx.has_changed().unwrap());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn reject_keeps_state_when_token_cannot_be_removed() {
        let storage = Arc::new(FailingKey::default());
        let session = SessionManager::new(storage.clone());
        session.persist("jwt", &User::new("a@b.io")).unwrap();
        storage.fail_remove(TOKEN_KEY);

        assert!(!session.reject());

        assert!(session.is_authenticated());
        assert_ne!(session.state(), SessionState::Expired);
        assert_eq!(session.state(), session.read_state());
    }

    #[test]
    fn reject_expires_when_only_user_removal_fails() {
        let storage = Arc::new(FailingKey::default());
        let session = SessionManager::new(storage.clone());
        session.persist("jwt", &User::new("a@b.io")).unwrap();
        storage.fail_remove(USER_KEY);

        assert!(session.reject());

        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
        assert!(!session.is_authenticated());
        assert_eq!(session.state(), SessionState::Expired);
    }

    #[test]
    fn reject_without_session_is_noop() {
        let session = manager();
        assert!(!session.reject());
        assert_eq!(session.state(), SessionState::SignedOut);
    }

    #[test]
    fn corrupt_user_entry_reads_as_none() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "jwt").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();
        let session = SessionManager::new(storage);

        assert!(session.current_user().is_none());
        assert!(session.is_authenticated());
    }

    #[test]
    fn file_storage_round_trips_and_tolerates_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session"));

        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
        storage.remove(TOKEN_KEY).unwrap();

        storage.set(TOKEN_KEY, "jwt").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("jwt"));
        assert!(dir.path().join("session").join(TOKEN_KEY).exists());

        storage.remove(TOKEN_KEY).unwrap();
        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_storage_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set(TOKEN_KEY, "jwt").unwrap();

        let mode = std::fs::metadata(dir.path().join(TOKEN_KEY))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let first = SessionManager::new(Arc::new(FileStorage::new(dir.path())));
        first.persist("jwt", &User::new("a@b.io")).unwrap();

        let second = SessionManager::new(Arc::new(FileStorage::new(dir.path())));
        assert!(second.is_authenticated());
        assert_eq!(second.current_user().unwrap().email, "a@b.io");
    }
}
