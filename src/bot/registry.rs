// src/bot/registry.rs
//! Mining address registrations
//!
//! Maps a chat user id to the payout address they registered. The whole map
//! is loaded at startup and rewritten to disk after every registration.
//! Entries are never removed; registering again replaces the address.

use crate::utils::error::BotError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Where registrations are stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// JSON file holding the user → address map
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("registrations.json")
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            path: default_path(),
        }
    }
}

/// File-backed user → address map
pub struct Registry {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl Registry {
    /// Loads the registry at `path`, starting empty if the file does not exist
    ///
    /// # Errors
    /// I/O errors other than a missing file, or a file that is not a JSON map
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, BotError> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No registrations at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Registry {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// File the registry persists to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores `address` for `user` and rewrites the file
    ///
    /// The in-memory map only changes once the file has been written, so a
    /// failed save leaves the previous registration in effect.
    pub async fn register(&self, user: &str, address: &str) -> Result<(), BotError> {
        let mut entries = self.entries.lock().await;
        let mut updated = entries.clone();
        updated.insert(user.to_string(), address.to_string());
        // Hold the lock while writing so concurrent registrations land in order.
        self.persist(&updated).await?;
        *entries = updated;
        Ok(())
    }

    /// Address registered by `user`
    ///
    /// # Errors
    /// `BotError::NotRegistered` if the user never registered
    pub async fn lookup(&self, user: &str) -> Result<String, BotError> {
        self.entries
            .lock()
            .await
            .get(user)
            .cloned()
            .ok_or_else(|| BotError::NotRegistered(user.to_string()))
    }

    /// Number of registered users
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), BotError> {
        let json = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
