//! Shared-secret handling for mutation requests.
//!
//! The remote accepts writes only when they carry the deployment's app
//! key. The key is resolved from the environment first, then from the OS
//! keychain, and is never logged.

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "mapmark";
const KEY_NAME: &str = "app-key";

/// Environment override, useful for CI and .env files.
pub const APP_KEY_ENV: &str = "MAPMARK_APP_KEY";

pub struct SecretStore;

impl SecretStore {
    /// Resolve the app key: `MAPMARK_APP_KEY` first, then the OS keychain.
    pub fn app_key() -> Result<String> {
        if let Ok(key) = std::env::var(APP_KEY_ENV) {
            if !key.is_empty() {
                return Ok(key);
            }
        }

        let entry = Entry::new(SERVICE_NAME, KEY_NAME).context("Failed to create keyring entry")?;
        entry.get_password().context(
            "No app key found: set MAPMARK_APP_KEY or store one with `mapmark key set`",
        )
    }

    /// Store the app key in the OS keychain.
    pub fn store(key: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, KEY_NAME).context("Failed to create keyring entry")?;
        entry
            .set_password(key)
            .context("Failed to store app key in keychain")?;
        Ok(())
    }

    /// Remove the app key from the OS keychain.
    pub fn delete() -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, KEY_NAME).context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete app key from keychain")?;
        Ok(())
    }
}
