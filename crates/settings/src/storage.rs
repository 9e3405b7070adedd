use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::PanelSettings;

/// 設定檔使用的固定邏輯名稱。 / Fixed logical key the settings are stored under.
pub const SETTINGS_KEY: &str = "notes";

/// 使用者設定資料夾下的應用程式目錄。 / Application directory inside the user config dir.
pub const APP_DIR: &str = "notespanel";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no per-user configuration directory is available")]
    NoConfigDir,
}

/// 管理面板設定的兩行檔案。 / Persists the panel settings as a two-line file.
#[derive(Debug, Clone)]
pub struct PanelSettingsStore {
    path: PathBuf,
}

impl PanelSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 以目前使用者的設定資料夾建立儲存區。 / Store rooted in the current user's config directory.
    pub fn user_default() -> Result<Self, SettingsError> {
        let root = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::new(root.join(APP_DIR).join(SETTINGS_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 讀取設定；檔案不存在時回傳預設值。 / Loads settings, returning defaults when the file is missing.
    pub fn load(&self) -> Result<PanelSettings, SettingsError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "settings file missing, using defaults");
            return Ok(PanelSettings::default());
        }

        let contents = fs::read(&self.path).map_err(|source| SettingsError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(PanelSettings::parse(&contents))
    }

    /// 覆寫設定檔。 / Replaces the stored settings.
    pub fn save(&self, settings: &PanelSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        write_atomic(&self.path, &settings.to_payload())?;
        info!(
            path = %self.path.display(),
            auto_save = settings.auto_save_enabled,
            "persisted panel settings"
        );
        Ok(())
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), SettingsError> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data).map_err(|source| SettingsError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = PanelSettingsStore::new(dir.path().join(SETTINGS_KEY));

        assert_eq!(store.load().unwrap(), PanelSettings::default());
    }

    #[test]
    fn save_creates_parent_and_round_trips() {
        let dir = tempdir().unwrap();
        let store = PanelSettingsStore::new(dir.path().join("nested").join(SETTINGS_KEY));
        let settings = PanelSettings::new(Some(dir.path().join("todo.txt")), true);

        store.save(&settings).unwrap();

        assert_eq!(store.load().unwrap(), settings);
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn unreadable_settings_surface_read_error() {
        let dir = tempdir().unwrap();
        // 以資料夾取代檔案使讀取失敗。 / A directory in place of the file forces a read error.
        let path = dir.path().join(SETTINGS_KEY);
        fs::create_dir(&path).unwrap();

        let err = PanelSettingsStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }
}
