use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ui::components::theme::ThemePreset;

/// Which part of the search view receives keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Query,
    Results,
}

/// UI preferences that survive restarts. Results are never persisted.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct TuiStatePersisted {
    pub theme: Option<String>,
}

impl TuiStatePersisted {
    pub fn theme(&self) -> ThemePreset {
        self.theme
            .as_deref()
            .and_then(ThemePreset::from_name)
            .unwrap_or(ThemePreset::Dark)
    }
}

pub fn state_path_for(data_dir: &Path) -> PathBuf {
    data_dir.join("tui_state.json")
}

pub fn load_state(path: &Path) -> TuiStatePersisted {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_state(path: &Path, state: &TuiStatePersisted) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match serde_json::to_string_pretty(state) {
        Ok(body) => {
            if let Err(err) = std::fs::write(path, body) {
                tracing::warn!(path = %path.display(), error = %err, "tui_state_write_failed");
            }
        }
        Err(err) => tracing::warn!(error = %err, "tui_state_encode_failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn state_roundtrip_persists_theme() {
        let dir = TempDir::new().unwrap();
        let path = state_path_for(dir.path());

        save_state(
            &path,
            &TuiStatePersisted {
                theme: Some("light".into()),
            },
        );
        let loaded = load_state(&path);
        assert_eq!(loaded.theme(), ThemePreset::Light);
    }

    #[test]
    fn missing_or_corrupt_state_falls_back_to_dark() {
        let dir = TempDir::new().unwrap();
        let path = state_path_for(dir.path());
        assert_eq!(load_state(&path).theme(), ThemePreset::Dark);

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_state(&path), TuiStatePersisted::default());
    }
}
