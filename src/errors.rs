use thiserror::Error;

/// All errors that can occur in idamctl.
#[derive(Debug, Error)]
pub enum ConsoleError {
    // --- Authentication errors ---
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Not a failure — the server wants a second factor before granting
    /// a session. Callers should prompt for a TOTP code and retry.
    #[error("TOTP code required to complete sign-in")]
    TotpRequired,

    #[error("Invalid TOTP code")]
    TotpInvalid,

    #[error("Not signed in or session expired — run `idamctl login`")]
    Unauthorized,

    #[error("Another login attempt is already in flight")]
    LoginInFlight,

    // --- Secret vault errors ---
    #[error("Secret '{0}' is hidden — reveal it before copying")]
    NotVisible(String),

    #[error("Secret '{0}' not found")]
    SecretNotFound(String),

    // --- Gateway errors ---
    #[error("{0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- Keyring errors ---
    #[error("Keyring error: {0}")]
    Keyring(String),

    // --- Clipboard errors ---
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl ConsoleError {
    /// Whether this error means the stored session is no longer valid.
    ///
    /// The CLI clears the session store when it sees one of these so a
    /// stale token is never re-sent on the next command.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Convenience type alias for idamctl results.
pub type Result<T> = std::result::Result<T, ConsoleError>;
