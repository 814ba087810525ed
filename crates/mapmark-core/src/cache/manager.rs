use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::Place;

/// File name (without extension) of the place snapshot.
const SNAPSHOT_NAME: &str = "places";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Covers clock skew (negative ages) too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// Durable snapshot of the last known-good place list.
///
/// The cache is whole-list replace only: there are no partial updates, and
/// a snapshot that fails to decode reads as an empty list so the caller can
/// repopulate it from the remote.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    /// Path of the place snapshot file, for diagnostics.
    pub fn snapshot_path(&self) -> PathBuf {
        self.cache_path(SNAPSHOT_NAME)
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(self.cache_path(name), contents)?;
        Ok(())
    }

    /// Last known-good place list. A missing or unreadable snapshot reads
    /// as empty; decode failures are dropped, never surfaced.
    pub fn load_places(&self) -> Vec<Place> {
        match self.load::<Vec<Place>>(SNAPSHOT_NAME) {
            Ok(Some(cached)) => cached.data,
            Ok(None) => Vec::new(),
            Err(e) => {
                debug!(error = %e, "Dropping unreadable place snapshot");
                Vec::new()
            }
        }
    }

    pub fn save_places(&self, places: &[Place]) -> Result<()> {
        self.save(SNAPSHOT_NAME, &places)
    }

    /// Human-readable age of the snapshot, if one exists.
    pub fn last_synced(&self) -> Option<String> {
        match self.load::<Vec<Place>>(SNAPSHOT_NAME) {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(error = %e, "Failed to load snapshot for age display");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
