use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{LessonSlot, ScheduleOptions, TimetableConfig, User};

// ─── Cached payload ──────────────────────────────────────────────────────────

/// Inputs of the last successful sync. The grid itself is never stored; it is
/// rebuilt from these on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheData {
    pub cached_at: DateTime<Utc>,
    pub user: Option<User>,
    pub config: TimetableConfig,
    pub options: ScheduleOptions,
    pub slots: Vec<LessonSlot>,
}

// ─── Path ────────────────────────────────────────────────────────────────────

fn cache_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("skoolway-tui").join("cache.json"))
}

// ─── I/O ─────────────────────────────────────────────────────────────────────

pub fn load_cache() -> Option<CacheData> {
    let path = cache_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable cache");
            None
        }
    }
}

pub fn save_cache(data: &CacheData) -> Result<()> {
    let path = cache_path().ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(&path, json)?;
    tracing::debug!(path = %path.display(), "cache saved");
    Ok(())
}
