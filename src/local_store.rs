// ABOUTME: Per-profile JSON cache for the ledger snapshot, food preferences and weight history
// ABOUTME: Corrupt or missing files fall back to defaults with a warning instead of failing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # Local Store
//!
//! Layout under the data directory:
//!
//! ```text
//! {data_dir}/{profile_id}/ledger.json
//! {data_dir}/{profile_id}/preferences.json
//! {data_dir}/{profile_id}/weights.json
//! ```
//!
//! The ledger snapshot only bridges the gap until the remote sync finishes.
//! Preferences and weight history live only here.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use pritness_intelligence::{FoodPreferences, WeightHistory};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::ledger::LedgerSnapshot;

const LEDGER_FILE: &str = "ledger.json";
const PREFERENCES_FILE: &str = "preferences.json";
const WEIGHTS_FILE: &str = "weights.json";

/// JSON file cache rooted at a data directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Store rooted at `root`; directories are created on first write
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, profile_id: Uuid, file: &str) -> PathBuf {
        self.root.join(profile_id.to_string()).join(file)
    }

    async fn read<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable cache file ignored");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt cache file ignored");
                None
            }
        }
    }

    async fn write<T: Serialize + Sync>(&self, path: &Path, value: &T) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::storage(format!("Cannot create {}: {e}", parent.display()))
            })?;
        }
        let json = serde_json::to_vec_pretty(value)
            .map_err(|e| AppError::serialization(format!("Cannot encode cache file: {e}")))?;
        // Previous file stays intact until the rename
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json)
            .await
            .map_err(|e| AppError::storage(format!("Cannot write {}: {e}", staging.display())))?;
        fs::rename(&staging, path)
            .await
            .map_err(|e| AppError::storage(format!("Cannot replace {}: {e}", path.display())))?;
        debug!(path = %path.display(), "Cache file saved");
        Ok(())
    }

    /// Cached ledger day, if any
    pub async fn load_snapshot(&self, profile_id: Uuid) -> Option<LedgerSnapshot> {
        self.read(&self.path(profile_id, LEDGER_FILE)).await
    }

    /// Cache the ledger day
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the file cannot be written.
    pub async fn save_snapshot(&self, snapshot: &LedgerSnapshot) -> AppResult<()> {
        self.write(&self.path(snapshot.profile_id, LEDGER_FILE), snapshot)
            .await
    }

    /// Food preferences, empty when none were saved
    pub async fn load_preferences(&self, profile_id: Uuid) -> FoodPreferences {
        self.read(&self.path(profile_id, PREFERENCES_FILE))
            .await
            .unwrap_or_default()
    }

    /// Persist food preferences
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the file cannot be written.
    pub async fn save_preferences(
        &self,
        profile_id: Uuid,
        preferences: &FoodPreferences,
    ) -> AppResult<()> {
        self.write(&self.path(profile_id, PREFERENCES_FILE), preferences)
            .await
    }

    /// Weight history, empty when none was saved
    pub async fn load_weights(&self, profile_id: Uuid) -> WeightHistory {
        self.read::<WeightHistory>(&self.path(profile_id, WEIGHTS_FILE))
            .await
            .map(|history| WeightHistory::from_entries(history.entries().to_vec()))
            .unwrap_or_default()
    }

    /// Persist weight history
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the file cannot be written.
    pub async fn save_weights(&self, profile_id: Uuid, history: &WeightHistory) -> AppResult<()> {
        self.write(&self.path(profile_id, WEIGHTS_FILE), history)
            .await
    }
}
