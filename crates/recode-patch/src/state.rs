//! Record of the last table written to disk
//!
//! Once the stock table has been replaced it can no longer be found, so the
//! replacement is saved and used as the search pattern on the next run.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default state file name, relative to the working directory
pub const STATE_FILE: &str = ".recode-patch.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchState {
    /// Replacement bytes in `"AA BB .."` form
    pub replacement: String,
    pub width: u32,
    pub height: u32,
    pub patched_at: DateTime<Utc>,
}

impl PatchState {
    pub fn new(replacement: String, width: u32, height: u32) -> Self {
        Self {
            replacement,
            width,
            height,
            patched_at: Utc::now(),
        }
    }

    /// Load the state file. A missing or unreadable file means nothing was
    /// patched yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                debug!("No patch state at {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<PatchState>(&content) {
            Ok(state) => {
                debug!(
                    "Loaded patch state: {}x{} at {}",
                    state.width, state.height, state.patched_at
                );
                Some(state)
            }
            Err(e) => {
                warn!("Failed to parse patch state {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&path, content)?;
        info!("Saved patch state to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_state_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        let state = PatchState::new("70 0D 00 00 A0 05 00 00".to_string(), 3440, 1440);
        state.save(&path).unwrap();

        let loaded = PatchState::load(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_missing_state_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PatchState::load(dir.path().join(STATE_FILE)).is_none());
    }

    #[test]
    fn test_corrupt_state_is_none() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "{ not json").unwrap();
        assert!(PatchState::load(temp_file.path()).is_none());
    }
}
