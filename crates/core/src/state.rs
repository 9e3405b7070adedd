//! 筆記面板的純狀態機。 / Pure state machine behind the notes panel.
//!
//! Loads and user edits are distinct inputs, so replacing the buffer from disk
//! can never be mistaken for typing and never schedules a save.

use std::path::{Path, PathBuf};

/// 自動儲存狀態列顯示的內容。 / What the auto-save banner reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSaveStatus {
    Off,
    Idle,
    Saving,
}

impl AutoSaveStatus {
    pub fn label(self) -> &'static str {
        match self {
            AutoSaveStatus::Off => "",
            AutoSaveStatus::Idle => "Auto-save enabled...",
            AutoSaveStatus::Saving => "Auto-save enabled...saving...",
        }
    }
}

/// 觸發載入的來源。 / Which action caused a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Activation from persisted settings; nothing is written back.
    Startup,
    Selection,
    SaveAs,
}

/// 狀態機的輸入。 / Inputs accepted by the editor state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorInput {
    /// 檔案成功讀入。 / A file was read successfully.
    Loaded {
        path: PathBuf,
        text: String,
        origin: LoadOrigin,
    },
    /// 載入失敗；若有訊息則顯示在緩衝區。 / A load failed; the message, if any, replaces the buffer.
    LoadFailed { message: Option<String> },
    /// 使用者在編輯區輸入。 / The user changed the buffer.
    UserEdit { text: String },
    ToggleAutoSave,
    /// 另存新檔前改指向新的路徑。 / Point at a new target before saving it.
    Retarget { path: PathBuf },
    /// 由持久化設定套用自動儲存旗標。 / Apply the auto-save flag from persisted settings.
    RestoreAutoSave { enabled: bool },
}

/// 需要由控制器執行的副作用。 / Side effects the controller must carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SaveBuffer,
    /// Ask whether the current text should be saved right away.
    ConfirmSaveNow,
    PersistSettings,
    ArmWatch(PathBuf),
    DisarmWatch,
}

/// 依狀態計算的控制項可用性。 / Control availability derived from the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelAffordances {
    pub save_enabled: bool,
    pub save_as_enabled: bool,
    pub auto_save_checked: bool,
    pub banner_visible: bool,
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    file_path: Option<PathBuf>,
    buffer: String,
    auto_save: bool,
    read_only: bool,
    status: AutoSaveStatus,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    /// 建立空白且唯讀的狀態。 / Empty, read-only state with no file.
    pub fn new() -> Self {
        Self {
            file_path: None,
            buffer: String::new(),
            auto_save: false,
            read_only: true,
            status: AutoSaveStatus::Off,
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn auto_save(&self) -> bool {
        self.auto_save
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn status(&self) -> AutoSaveStatus {
        self.status
    }

    pub fn affordances(&self) -> PanelAffordances {
        PanelAffordances {
            save_enabled: !self.auto_save,
            save_as_enabled: !self.auto_save,
            auto_save_checked: self.auto_save,
            banner_visible: self.auto_save,
            editable: !self.read_only,
        }
    }

    /// 標記自動儲存正在寫入或已完成。 / Marks an auto-save write as in flight or finished.
    pub fn set_saving(&mut self, saving: bool) {
        if self.auto_save {
            self.status = if saving {
                AutoSaveStatus::Saving
            } else {
                AutoSaveStatus::Idle
            };
        }
    }

    /// 套用輸入並回傳需要執行的副作用。 / Applies an input, returning the effects to run.
    pub fn apply(&mut self, input: EditorInput) -> Vec<Effect> {
        match input {
            EditorInput::Loaded { path, text, origin } => {
                self.buffer = text;
                self.file_path = Some(path.clone());
                self.read_only = false;

                let mut effects = vec![Effect::ArmWatch(path)];
                if origin != LoadOrigin::Startup {
                    effects.push(Effect::PersistSettings);
                }
                effects
            }
            EditorInput::LoadFailed { message } => {
                if let Some(message) = message {
                    self.buffer = message;
                }
                self.file_path = None;
                self.read_only = true;
                vec![Effect::DisarmWatch]
            }
            EditorInput::UserEdit { text } => {
                if self.read_only {
                    return Vec::new();
                }
                self.buffer = text;
                if self.auto_save && self.file_path.is_some() {
                    vec![Effect::SaveBuffer]
                } else {
                    Vec::new()
                }
            }
            EditorInput::ToggleAutoSave => {
                self.set_auto_save(!self.auto_save);
                if self.auto_save {
                    vec![Effect::ConfirmSaveNow, Effect::PersistSettings]
                } else {
                    vec![Effect::PersistSettings]
                }
            }
            EditorInput::Retarget { path } => {
                self.file_path = Some(path);
                Vec::new()
            }
            EditorInput::RestoreAutoSave { enabled } => {
                self.set_auto_save(enabled);
                Vec::new()
            }
        }
    }

    fn set_auto_save(&mut self, enabled: bool) {
        self.auto_save = enabled;
        self.status = if enabled {
            AutoSaveStatus::Idle
        } else {
            AutoSaveStatus::Off
        };
    }
}
