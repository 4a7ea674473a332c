//! Persistent settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::persist::MAX_BACKUPS;
use crate::splice::DEFAULT_TRAILER;
use crate::util::{Error, Result};

/// Settings that persist between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Replace an earlier merge of the same object without asking
    pub overwrite: bool,
    /// Highest `.SAVE<NNN>` suffix tried when backing up the target
    pub backup_limit: u32,
    /// Line written after each merged footer
    pub trailer: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            overwrite: false,
            backup_limit: MAX_BACKUPS,
            trailer: DEFAULT_TRAILER.to_string(),
        }
    }
}

impl Settings {
    /// Get settings file path
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("kitbash");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the config dir, falling back to defaults
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| serde_json::from_str::<Self>(&s).ok())
            .unwrap_or_default()
            .validated()
    }

    /// Load settings from an explicit file; unlike [`Settings::load`] a
    /// missing or malformed file is an error
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let settings: Self = serde_json::from_str(&text).map_err(|e| Error::io(path, e.into()))?;
        Ok(settings.validated())
    }

    /// Save settings to the config dir
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::path() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        self.save_to(&path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::io(path, e.into()))?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    fn validated(mut self) -> Self {
        self.backup_limit = self.backup_limit.clamp(1, MAX_BACKUPS);
        if self.trailer.trim().is_empty() {
            self.trailer = DEFAULT_TRAILER.to_string();
        }
        self
    }
}
