//! OS keyring integration for session token storage.
//!
//! With the `keyring-store` feature enabled, the bearer token lives in
//! the operating system's secure credential store instead of the
//! session file on disk:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! All operations fail gracefully — if the keyring is unavailable, the
//! error is returned and the caller falls back to file storage.

use crate::errors::{ConsoleError, Result};

/// Service name used in the OS keyring.
const SERVICE_NAME: &str = "idamctl";

/// Build a keyring entry key from the config directory path.
///
/// Tokens are scoped per config directory, matching the session file
/// they replace, so parallel profiles never share a token.
fn entry_key(scope: &str) -> String {
    format!("session:{scope}")
}

/// Store a session token in the OS keyring for this profile.
pub fn store_token(scope: &str, token: &str) -> Result<()> {
    let entry = keyring::Entry::new(SERVICE_NAME, &entry_key(scope))
        .map_err(|e| ConsoleError::Keyring(format!("failed to create keyring entry: {e}")))?;

    entry
        .set_password(token)
        .map_err(|e| ConsoleError::Keyring(format!("failed to store token in keyring: {e}")))?;

    Ok(())
}

/// Retrieve a session token from the OS keyring for this profile.
///
/// Returns `None` if no token is stored (rather than an error).
pub fn get_token(scope: &str) -> Result<Option<String>> {
    let entry = keyring::Entry::new(SERVICE_NAME, &entry_key(scope))
        .map_err(|e| ConsoleError::Keyring(format!("failed to create keyring entry: {e}")))?;

    match entry.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(ConsoleError::Keyring(format!(
            "failed to read from keyring: {e}"
        ))),
    }
}

/// Delete a stored session token from the OS keyring.
pub fn delete_token(scope: &str) -> Result<()> {
    let entry = keyring::Entry::new(SERVICE_NAME, &entry_key(scope))
        .map_err(|e| ConsoleError::Keyring(format!("failed to create keyring entry: {e}")))?;

    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()), // Already gone, that's fine.
        Err(e) => Err(ConsoleError::Keyring(format!(
            "failed to delete from keyring: {e}"
        ))),
    }
}
