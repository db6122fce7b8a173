use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{ConsoleError, Result};

/// Plaintext handling policy for the secret vault view.
///
/// `Refetch` (the default) asks the server for the decrypted value on
/// every reveal and drops the plaintext again on hide — the exposure
/// window is exactly the time the value is on screen. `Cache` keeps
/// the plaintext in memory after the first reveal so toggling
/// visibility is instant, at the cost of a longer-lived in-memory copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealPolicy {
    #[default]
    Refetch,
    Cache,
}

/// User-level configuration, loaded from `<config_dir>/config.toml`.
///
/// Every field has a sensible default so idamctl works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the IDAM-PAM REST API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How decrypted secret values are cached between reveal/hide toggles.
    #[serde(default)]
    pub reveal_policy: RevealPolicy,

    /// How many audit entries the dashboard fetches for its statistics.
    #[serde(default = "default_dashboard_audit_limit")]
    pub dashboard_audit_limit: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_api_url() -> String {
    "http://localhost:5000/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_dashboard_audit_limit() -> usize {
    100
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            reveal_policy: RevealPolicy::default(),
            dashboard_audit_limit: default_dashboard_audit_limit(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the config directory.
    const FILE_NAME: &'static str = "config.toml";

    /// Load settings from `<config_dir>/config.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            ConsoleError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Trim a trailing slash so endpoint paths can always be appended
    /// with a single `/` separator.
    pub fn normalized_api_url(&self) -> String {
        self.api_url.trim_end_matches('/').to_string()
    }
}

/// Resolve the config directory: `$IDAMCTL_CONFIG_DIR` if set, else
/// `~/.config/idamctl`.
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("IDAMCTL_CONFIG_DIR") {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| ConsoleError::Config("HOME is not set".into()))?;

    Ok(PathBuf::from(home).join(".config").join("idamctl"))
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.api_url, "http://localhost:5000/api/v1");
        assert_eq!(s.timeout_secs, 30);
        assert_eq!(s.reveal_policy, RevealPolicy::Refetch);
        assert_eq!(s.dashboard_audit_limit, 100);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.api_url, "http://localhost:5000/api/v1");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
api_url = "https://iam.example.com/api/v1"
timeout_secs = 5
reveal_policy = "cache"
dashboard_audit_limit = 25
"#;
        fs::write(tmp.path().join("config.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.api_url, "https://iam.example.com/api/v1");
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.reveal_policy, RevealPolicy::Cache);
        assert_eq!(settings.dashboard_audit_limit, 25);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let config = "api_url = \"https://iam.internal/api/v1\"\n";
        fs::write(tmp.path().join("config.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.api_url, "https://iam.internal/api/v1");
        // Rest should be defaults
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(settings.reveal_policy, RevealPolicy::Refetch);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(result.is_err());
    }

    #[test]
    fn normalized_api_url_strips_trailing_slash() {
        let s = Settings {
            api_url: "https://iam.example.com/api/v1/".to_string(),
            ..Settings::default()
        };
        assert_eq!(s.normalized_api_url(), "https://iam.example.com/api/v1");
    }
}
