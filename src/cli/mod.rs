//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use zeroize::Zeroizing;

use crate::api::ApiClient;
use crate::config::{self, Settings};
use crate::errors::{ConsoleError, Result};
use crate::session::{self, Session, SessionStore};

/// Minimum password length enforced at registration.
const MIN_PASSWORD_LEN: usize = 8;

/// idamctl: admin console for the IDAM-PAM platform.
#[derive(Parser)]
#[command(
    name = "idamctl",
    about = "Admin console for the IDAM-PAM platform",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the IDAM-PAM API (overrides the config file)
    #[arg(long, global = true, env = "IDAMCTL_API_URL")]
    pub api_url: Option<String>,

    /// Config directory (default: ~/.config/idamctl)
    #[arg(long, global = true, env = "IDAMCTL_CONFIG_DIR")]
    pub config_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Sign in and store a session
    Login {
        /// Username (omit for interactive prompt)
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Sign out and discard the stored session
    Logout,

    /// Show the currently signed-in principal
    Whoami,

    /// Register a new account
    Register {
        /// Username for the new account
        username: String,
        /// Email address for the new account
        email: String,
    },

    /// Manage two-factor authentication
    Totp {
        #[command(subcommand)]
        action: TotpAction,
    },

    /// Browse and manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage the credential vault
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },

    /// View the audit trail
    Audit {
        /// Number of entries to fetch (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Number of entries to skip
        #[arg(long, default_value = "0")]
        offset: usize,
    },

    /// Show platform summary statistics
    Dashboard,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// TOTP subcommands.
#[derive(clap::Subcommand)]
pub enum TotpAction {
    /// Enable TOTP for the signed-in account
    Enable,
}

/// User subcommands.
#[derive(clap::Subcommand)]
pub enum UserAction {
    /// List all users
    List,

    /// Show one user
    Show {
        /// User id
        id: String,
    },

    /// Update a user
    Update {
        /// User id
        id: String,
        /// New email address
        #[arg(long)]
        email: Option<String>,
        /// Activate or deactivate the account
        #[arg(long)]
        active: Option<bool>,
    },

    /// Assign a role to a user
    AssignRole {
        /// User id
        user_id: String,
        /// Role id
        role_id: String,
    },
}

/// Secret subcommands.
#[derive(clap::Subcommand)]
pub enum SecretAction {
    /// List vault entries (metadata only)
    List,

    /// Reveal a secret's decrypted value
    Show {
        /// Secret id
        id: String,
        /// Copy the value to the clipboard instead of printing it
        #[arg(long)]
        copy: bool,
    },

    /// Store a new secret
    Create {
        /// Secret name (e.g. prod-db-password)
        name: String,
        /// Human-readable description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Secret value (omit for interactive prompt)
        #[arg(long)]
        data: Option<String>,
    },

    /// Delete a secret
    Delete {
        /// Secret id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Everything a command needs: resolved settings, the session store,
/// and an API client already carrying the stored token.
pub struct AppContext {
    pub settings: Settings,
    pub config_dir: PathBuf,
    pub store: SessionStore,
    pub client: ApiClient,
}

impl AppContext {
    /// Route guard: allow the command only when a session exists.
    ///
    /// Called on entry of every protected command — never cached,
    /// since the store may have been cleared by an earlier 401.
    pub fn require_session(&self) -> Result<&Session> {
        session::require_session(&self.store)
    }

    /// Run an authenticated call, clearing the session when the
    /// server says the token is no longer valid.
    ///
    /// Clearing is idempotent, so several 401s inside one command
    /// (e.g. the dashboard's three fetches) are harmless.
    pub fn run<T>(&mut self, f: impl FnOnce(&ApiClient) -> Result<T>) -> Result<T> {
        let result = f(&self.client);
        if let Err(e) = &result {
            if e.invalidates_session() {
                let _ = self.store.clear();
                self.client.set_token(None);
            }
        }
        result
    }
}

/// Build the application context from CLI arguments.
pub fn app_context(cli: &Cli) -> Result<AppContext> {
    let config_dir = match &cli.config_dir {
        Some(dir) => PathBuf::from(dir),
        None => config::settings::config_dir()?,
    };

    let mut settings = Settings::load(&config_dir)?;
    if let Some(url) = &cli.api_url {
        settings.api_url = url.clone();
    }

    let store = SessionStore::load(&config_dir)?;

    let mut client = ApiClient::new(
        &settings.normalized_api_url(),
        Duration::from_secs(settings.timeout_secs),
    );
    client.set_token(store.current().map(|s| s.token.clone()));

    Ok(AppContext {
        settings,
        config_dir,
        store,
        client,
    })
}

/// Get the account password, trying in order:
/// 1. `IDAMCTL_PASSWORD` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("IDAMCTL_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| ConsoleError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used during `register`).
///
/// Also respects `IDAMCTL_PASSWORD` for scripted/CI usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("IDAMCTL_PASSWORD") {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(ConsoleError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose account password")
            .with_confirmation(
                "Confirm account password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| ConsoleError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Prompt for a 6-digit TOTP code.
pub fn prompt_totp_code() -> Result<String> {
    let code: String = dialoguer::Input::new()
        .with_prompt("TOTP code")
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if input.len() == 6 && input.chars().all(|c| c.is_ascii_digit()) {
                Ok(())
            } else {
                Err("enter the 6-digit code from your authenticator")
            }
        })
        .interact_text()
        .map_err(|e| ConsoleError::CommandFailed(format!("code prompt: {e}")))?;
    Ok(code)
}

/// Prompt for a free-text value (e.g. a username).
pub fn prompt_text(label: &str) -> Result<String> {
    let value: String = dialoguer::Input::new()
        .with_prompt(label)
        .interact_text()
        .map_err(|e| ConsoleError::CommandFailed(format!("{label} prompt: {e}")))?;
    Ok(value)
}
