pub mod preferences;
pub mod storage;

pub use preferences::PanelSettings;
pub use storage::{PanelSettingsStore, SettingsError, APP_DIR, SETTINGS_KEY};
