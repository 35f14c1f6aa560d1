//! Application settings.
//!
//! Settings live in `settings.json` under the platform config directory.
//! A missing file means defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::account::PROTECTED;
use crate::security::keystore;
use crate::{Error, Result};

/// Application directory name under the config and data directories.
const APP_DIR: &str = "mailrules";

/// Environment variable that overrides the stored encryption secret.
pub const ENCRYPTION_KEY_ENV: &str = "MAILRULES_ENCRYPTION_KEY";

/// Persisted settings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Database file. Defaults to [`default_database_path`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    /// Password encryption secret. Prefer the keyring over storing it here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("database_path", &self.database_path)
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| PROTECTED),
            )
            .finish()
    }
}

impl Settings {
    /// Load settings from `path`, or defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Database path from the settings, or the default location.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    /// Resolve the encryption secret.
    ///
    /// Looks at the `MAILRULES_ENCRYPTION_KEY` environment variable, then
    /// these settings, then the system keyring.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no secret is found, or a keyring
    /// error if the keyring cannot be read.
    pub fn encryption_secret(&self) -> Result<String> {
        resolve_secret(
            std::env::var(ENCRYPTION_KEY_ENV).ok(),
            self.encryption_key.as_deref(),
            keystore::get_encryption_key,
        )
    }
}

/// First non-empty secret among the environment, the settings file, and
/// the keyring. The keyring is only consulted when needed.
fn resolve_secret(
    from_env: Option<String>,
    from_settings: Option<&str>,
    from_keyring: impl FnOnce() -> Result<Option<String>>,
) -> Result<String> {
    if let Some(secret) = from_env.filter(|s| !s.is_empty()) {
        debug!("Using encryption key from {ENCRYPTION_KEY_ENV}");
        return Ok(secret);
    }

    if let Some(secret) = from_settings.filter(|s| !s.is_empty()) {
        debug!("Using encryption key from settings file");
        return Ok(secret.to_string());
    }

    from_keyring()?.filter(|s| !s.is_empty()).ok_or_else(|| {
        Error::Config(format!(
            "no encryption key configured; set {ENCRYPTION_KEY_ENV}, add encryption_key to the settings file, or run `mailrules key generate`"
        ))
    })
}

/// Default settings file location.
#[must_use]
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("settings.json")
}

/// Default database location.
#[must_use]
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("mailrules.db")
}
