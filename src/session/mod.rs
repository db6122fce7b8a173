//! Session Store — the single source of truth for "is a principal
//! authenticated, and with which token", plus the route guard that
//! protected commands consult before doing anything else.
//!
//! One opaque bearer token per store, persisted to
//! `<config_dir>/session.json` so a session survives across
//! invocations. The principal snapshot is persisted alongside it
//! because the backend offers no way to re-derive the identity from a
//! bare token; the two are always written and cleared together, so a
//! present principal always implies a present token.
//!
//! With the `keyring-store` feature the token itself lives in the OS
//! keyring and the file keeps only the principal snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::types::Principal;
use crate::errors::{ConsoleError, Result};

/// An established session: the bearer token and the identity it was
/// granted to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
}

/// On-disk shape of the session file. `token` is absent when the
/// keyring holds it.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    #[serde(default)]
    token: Option<String>,
    principal: Principal,
}

/// Durable store for at most one session.
pub struct SessionStore {
    dir: PathBuf,
    session: Option<Session>,
}

impl SessionStore {
    /// Name of the session file inside the config directory.
    const FILE_NAME: &'static str = "session.json";

    /// Restore the session from durable storage.
    ///
    /// Absence of a session file means unauthenticated. A corrupt file
    /// or a principal without a reachable token is treated the same
    /// way and the leftover state is removed, so a half-written file
    /// can never produce a principal with no token.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let mut store = Self {
            dir: config_dir.to_path_buf(),
            session: None,
        };

        let path = store.file_path();
        if !path.exists() {
            return Ok(store);
        }

        let stored: StoredSession = match fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
        {
            Some(stored) => stored,
            None => {
                store.clear()?;
                return Ok(store);
            }
        };

        let token = match stored.token {
            Some(token) => Some(token),
            None => store.keyring_token()?,
        };

        match token {
            Some(token) if !token.is_empty() => {
                store.session = Some(Session {
                    token,
                    principal: stored.principal,
                });
            }
            _ => store.clear()?,
        }

        Ok(store)
    }

    /// The current session, if one is established.
    pub fn current(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Store token and principal together and persist them.
    ///
    /// Replaces any previous session wholesale — there is never more
    /// than one active session per store.
    pub fn set(&mut self, token: String, principal: Principal) -> Result<()> {
        self.persist(&token, &principal)?;
        self.session = Some(Session { token, principal });
        Ok(())
    }

    /// Drop the session from memory and durable storage.
    ///
    /// Idempotent: clearing an empty store is a no-op. Used on logout
    /// and whenever any request comes back 401.
    pub fn clear(&mut self) -> Result<()> {
        self.session = None;

        let path = self.file_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }

        self.keyring_clear()?;

        Ok(())
    }

    fn file_path(&self) -> PathBuf {
        self.dir.join(Self::FILE_NAME)
    }

    /// Write the session file atomically (temp file + rename) with
    /// owner-only permissions.
    fn persist(&self, token: &str, principal: &Principal) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let stored = StoredSession {
            token: self.file_token(token),
            principal: principal.clone(),
        };
        self.keyring_store(token)?;

        let contents = serde_json::to_string_pretty(&stored)
            .map_err(|e| ConsoleError::Serialization(format!("session encode: {e}")))?;

        let path = self.file_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&tmp, perms)?;
        }

        fs::rename(&tmp, &path)?;
        Ok(())
    }

    // ── Keyring plumbing (no-ops without the feature) ───────────────

    #[cfg(feature = "keyring-store")]
    fn scope(&self) -> String {
        self.dir.to_string_lossy().to_string()
    }

    #[cfg(feature = "keyring-store")]
    fn file_token(&self, _token: &str) -> Option<String> {
        None
    }

    #[cfg(not(feature = "keyring-store"))]
    fn file_token(&self, token: &str) -> Option<String> {
        Some(token.to_string())
    }

    #[cfg(feature = "keyring-store")]
    fn keyring_store(&self, token: &str) -> Result<()> {
        crate::keyring::store_token(&self.scope(), token)
    }

    #[cfg(not(feature = "keyring-store"))]
    fn keyring_store(&self, _token: &str) -> Result<()> {
        Ok(())
    }

    #[cfg(feature = "keyring-store")]
    fn keyring_token(&self) -> Result<Option<String>> {
        crate::keyring::get_token(&self.scope())
    }

    #[cfg(not(feature = "keyring-store"))]
    fn keyring_token(&self) -> Result<Option<String>> {
        Ok(None)
    }

    #[cfg(feature = "keyring-store")]
    fn keyring_clear(&self) -> Result<()> {
        crate::keyring::delete_token(&self.scope())
    }

    #[cfg(not(feature = "keyring-store"))]
    fn keyring_clear(&self) -> Result<()> {
        Ok(())
    }
}

/// Route guard: may this protected command proceed?
///
/// Re-evaluated on every command entry — never cached, since a 401
/// from any earlier request may have cleared the store in between.
pub fn require_session(store: &SessionStore) -> Result<&Session> {
    store.current().ok_or(ConsoleError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn principal(username: &str) -> Principal {
        serde_json::from_value(serde_json::json!({
            "id": "u-1",
            "username": username,
            "email": format!("{username}@example.com"),
            "is_active": true,
        }))
        .unwrap()
    }

    #[test]
    fn load_without_file_is_unauthenticated() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::load(dir.path()).unwrap();
        assert!(store.current().is_none());
    }

    #[test]
    fn set_then_load_restores_session() {
        let dir = TempDir::new().unwrap();

        let mut store = SessionStore::load(dir.path()).unwrap();
        store.set("jwt-abc".into(), principal("alice")).unwrap();
        assert_eq!(store.current().unwrap().token, "jwt-abc");

        // A second store simulates a new process.
        let store2 = SessionStore::load(dir.path()).unwrap();
        let session = store2.current().expect("session survives reload");
        assert_eq!(session.token, "jwt-abc");
        assert_eq!(session.principal.username, "alice");
    }

    #[test]
    fn set_replaces_previous_session_wholesale() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::load(dir.path()).unwrap();

        store.set("jwt-1".into(), principal("alice")).unwrap();
        store.set("jwt-2".into(), principal("bob")).unwrap();

        let session = store.current().unwrap();
        assert_eq!(session.token, "jwt-2");
        assert_eq!(session.principal.username, "bob");
    }

    #[test]
    fn clear_removes_memory_and_disk() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::load(dir.path()).unwrap();
        store.set("jwt-abc".into(), principal("alice")).unwrap();

        store.clear().unwrap();
        assert!(store.current().is_none());
        assert!(!dir.path().join("session.json").exists());

        let store2 = SessionStore::load(dir.path()).unwrap();
        assert!(store2.current().is_none());
    }

    #[test]
    fn double_clear_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::load(dir.path()).unwrap();
        store.set("jwt-abc".into(), principal("alice")).unwrap();

        store.clear().unwrap();
        // Second clear must succeed without touching anything.
        store.clear().unwrap();
        assert!(store.current().is_none());
    }

    #[test]
    fn corrupt_session_file_is_discarded() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("session.json"), "{not json").unwrap();

        let store = SessionStore::load(dir.path()).unwrap();
        assert!(store.current().is_none());
        assert!(!dir.path().join("session.json").exists());
    }

    #[cfg(not(feature = "keyring-store"))]
    #[test]
    fn principal_without_token_is_rejected() {
        let dir = TempDir::new().unwrap();
        // A file with a principal but no token violates the invariant.
        std::fs::write(
            dir.path().join("session.json"),
            serde_json::json!({
                "principal": {"id": "u-1", "username": "alice", "email": "a@b.c"}
            })
            .to_string(),
        )
        .unwrap();

        let store = SessionStore::load(dir.path()).unwrap();
        assert!(store.current().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn session_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::load(dir.path()).unwrap();
        store.set("jwt-abc".into(), principal("alice")).unwrap();

        let mode = std::fs::metadata(dir.path().join("session.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn guard_denies_empty_store_and_allows_after_set() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::load(dir.path()).unwrap();

        assert!(matches!(
            require_session(&store),
            Err(ConsoleError::Unauthorized)
        ));

        store.set("jwt-abc".into(), principal("alice")).unwrap();
        let session = require_session(&store).expect("allowed after set");
        assert_eq!(session.principal.username, "alice");

        // And denies again as soon as the session is gone.
        store.clear().unwrap();
        assert!(require_session(&store).is_err());
    }
}
