use std::path::{Path, PathBuf};

use notespanel_settings::{PanelSettings, PanelSettingsStore, SettingsError};
use tracing::{debug, info, warn};

use crate::dialog::{
    DialogButtons, DialogIcon, DialogResult, Dialogs, OpenDialogRequest, SaveDialogRequest,
    TaskDialog,
};
use crate::file_monitor::{ChangeWatcher, NotifyWatcher};
use crate::note_file::{DiskNoteFiles, NoteFiles};
use crate::state::{EditorInput, EditorState, Effect, LoadOrigin, PanelAffordances};

/// 對話框標題。 / Caption used by every panel dialog.
pub const DIALOG_CAPTION: &str = "Notes";

const SAVE_NOW_INSTRUCTION: &str = "Save the current text now?";
const SAVE_NOW_TEXT: &str = "Clicking \"Yes\" will save the text immediately, otherwise the text will be saved when you start typing.";

/// 面板設定的讀寫介面。 / Where the panel reads and writes its persisted settings.
pub trait SettingsSink {
    fn load(&self) -> Result<PanelSettings, SettingsError>;
    fn save(&mut self, settings: &PanelSettings) -> Result<(), SettingsError>;
}

impl SettingsSink for PanelSettingsStore {
    fn load(&self) -> Result<PanelSettings, SettingsError> {
        PanelSettingsStore::load(self)
    }

    fn save(&mut self, settings: &PanelSettings) -> Result<(), SettingsError> {
        PanelSettingsStore::save(self, settings)
    }
}

/// 面板依賴的外部服務。 / External services the panel performs its I/O through.
pub struct PanelServices {
    pub files: Box<dyn NoteFiles>,
    pub watcher: Box<dyn ChangeWatcher>,
    pub dialogs: Box<dyn Dialogs>,
    pub settings: Box<dyn SettingsSink>,
}

impl PanelServices {
    /// 使用磁碟與 `notify` 的預設組合。 / Disk-backed files and a `notify` watcher.
    pub fn native(dialogs: Box<dyn Dialogs>, settings: Box<dyn SettingsSink>) -> Self {
        Self {
            files: Box::new(DiskNoteFiles),
            watcher: Box::new(NotifyWatcher::new()),
            dialogs,
            settings,
        }
    }
}

/// 儲存動作的結果。 / Result of a save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No file is set.
    Skipped,
    Saved,
    /// The failure was reported through a dialog.
    Failed,
}

/// 載入動作的結果。 / Result of a load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Empty or nonexistent path; the buffer was left as it was.
    Missing,
    /// The file exists but could not be read; the error is in the buffer.
    Failed,
}

impl LoadOutcome {
    pub fn is_loaded(self) -> bool {
        matches!(self, Self::Loaded)
    }
}

/// 筆記面板控制器。 / Controller for one notes panel.
pub struct NotesPanel {
    state: EditorState,
    services: PanelServices,
    initialized: bool,
    ignored_events: usize,
}

impl NotesPanel {
    pub fn new(services: PanelServices) -> Self {
        Self {
            state: EditorState::new(),
            services,
            initialized: false,
            ignored_events: 0,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn affordances(&self) -> PanelAffordances {
        self.state.affordances()
    }

    /// 路徑欄位顯示的文字。 / Text shown in the path field; empty when no file is open.
    pub fn displayed_path(&self) -> String {
        self.state
            .file_path()
            .map(|path| path.display().to_string())
            .unwrap_or_default()
    }

    /// 已忽略的外部變更事件數。 / Number of external change events drained and ignored.
    pub fn ignored_events(&self) -> usize {
        self.ignored_events
    }

    /// 面板顯示時呼叫。 / Called whenever the panel becomes visible.
    pub fn activate(&mut self) {
        self.initialize();
    }

    /// 讀取持久化設定並開啟上次的檔案。 / Reads persisted settings and reopens the last file.
    ///
    /// Never fails; problems end up as buffer text with the panel read-only.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        let settings = match self.services.settings.load() {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "could not read panel settings");
                let effects = self.state.apply(EditorInput::LoadFailed {
                    message: Some(format!(
                        "Failed to identify previous file location: {err}"
                    )),
                });
                self.run_effects(effects);
                return;
            }
        };

        self.state.apply(EditorInput::RestoreAutoSave {
            enabled: settings.auto_save_enabled,
        });
        match settings.last_file_path {
            Some(path) => {
                self.load(&path, LoadOrigin::Startup);
            }
            None => {
                let effects = self.state.apply(EditorInput::LoadFailed { message: None });
                self.run_effects(effects);
            }
        }
        self.initialized = true;
        debug!(path = %self.displayed_path(), "panel initialized");
    }

    /// 載入檔案；失敗時面板轉為唯讀並清除路徑。 / Loads a file; on failure the panel turns read-only with no path.
    pub fn load(&mut self, path: &Path, origin: LoadOrigin) -> LoadOutcome {
        if path.as_os_str().is_empty() || !self.services.files.exists(path) {
            debug!(path = %path.display(), "nothing to load");
            let effects = self.state.apply(EditorInput::LoadFailed { message: None });
            self.run_effects(effects);
            return LoadOutcome::Missing;
        }

        match self.services.files.read(path) {
            Ok(text) => {
                info!(path = %path.display(), ?origin, "loaded notes");
                let effects = self.state.apply(EditorInput::Loaded {
                    path: path.to_path_buf(),
                    text,
                    origin,
                });
                self.run_effects(effects);
                LoadOutcome::Loaded
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load notes");
                let effects = self.state.apply(EditorInput::LoadFailed {
                    message: Some(format!("Failed to open {} : {}", path.display(), err)),
                });
                self.run_effects(effects);
                LoadOutcome::Failed
            }
        }
    }

    /// 「開啟...」指令。 / The `Open...` command: prompt for a file and load it.
    ///
    /// Returns `None` when the dialog is cancelled, which changes nothing.
    pub fn select_file(&mut self) -> Option<LoadOutcome> {
        let request = OpenDialogRequest::new(self.state.file_path());
        let path = self.services.dialogs.pick_open(&request)?;
        Some(self.load(&path, LoadOrigin::Selection))
    }

    /// 將緩衝區寫回目前檔案。 / Writes the buffer back to the current file.
    pub fn save_file(&mut self) -> SaveOutcome {
        let Some(path) = self.state.file_path().map(Path::to_path_buf) else {
            return SaveOutcome::Skipped;
        };

        match self.services.files.write(&path, self.state.buffer()) {
            Ok(()) => {
                debug!(path = %path.display(), "saved notes");
                SaveOutcome::Saved
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to save notes");
                let dialog = TaskDialog::new(err.to_string())
                    .caption(DIALOG_CAPTION)
                    .instruction("Failed to save text:")
                    .buttons(DialogButtons::OK)
                    .icon(DialogIcon::Stop);
                self.services.dialogs.show(&dialog);
                SaveOutcome::Failed
            }
        }
    }

    /// 另存新檔：寫入後重新載入以確認新位置可讀。 /
    /// Save-as: write to the new target, then load it back to prove it is readable.
    pub fn save_file_as(&mut self) -> bool {
        let request = SaveDialogRequest::for_current(self.state.file_path());
        let Some(target) = self.services.dialogs.pick_save(&request) else {
            return false;
        };

        self.state.apply(EditorInput::Retarget {
            path: target.clone(),
        });
        self.save_file();
        self.load(&target, LoadOrigin::SaveAs).is_loaded()
    }

    /// 使用者編輯緩衝區；自動儲存時立即寫入一次。 / A user edit; with auto-save on it is written once, right away.
    pub fn edit(&mut self, text: impl Into<String>) -> Option<SaveOutcome> {
        let effects = self.state.apply(EditorInput::UserEdit { text: text.into() });
        self.run_effects(effects)
    }

    /// 切換自動儲存並回傳新狀態。 / Flips auto-save, returning the new flag.
    pub fn toggle_auto_save(&mut self) -> bool {
        let effects = self.state.apply(EditorInput::ToggleAutoSave);
        self.run_effects(effects);
        info!(enabled = self.state.auto_save(), "toggled auto-save");
        self.state.auto_save()
    }

    /// 取出背景執行緒送來的檔案事件。 / Drains change events posted by the watcher thread.
    ///
    /// Events are deliberately not acted on: the panel's own auto-save writes
    /// arrive faster than any reload-and-warn policy can tell them apart from
    /// outside edits.
    pub fn pump_watch_events(&mut self) -> usize {
        let events = self.services.watcher.drain();
        for event in &events {
            debug!(path = %event.path.display(), kind = ?event.kind, "ignoring file change");
        }
        self.ignored_events += events.len();
        events.len()
    }

    /// 面板卸載：釋放監看並丟棄狀態。 / Panel unload: release the watch and discard the state.
    pub fn teardown(&mut self) {
        self.services.watcher.disarm();
        self.state = EditorState::new();
        self.initialized = false;
        debug!("panel torn down");
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> Option<SaveOutcome> {
        let mut outcome = None;
        for effect in effects {
            match effect {
                Effect::SaveBuffer => {
                    self.state.set_saving(true);
                    outcome = Some(self.save_file());
                    self.state.set_saving(false);
                }
                Effect::ConfirmSaveNow => {
                    let dialog = TaskDialog::new(SAVE_NOW_TEXT)
                        .caption(DIALOG_CAPTION)
                        .instruction(SAVE_NOW_INSTRUCTION)
                        .buttons(DialogButtons::YES | DialogButtons::NO)
                        .icon(DialogIcon::Question);
                    if self.services.dialogs.show(&dialog) == DialogResult::Yes {
                        outcome = Some(self.save_file());
                    }
                }
                Effect::PersistSettings => self.persist_settings(),
                Effect::ArmWatch(path) => {
                    if let Err(err) = self.services.watcher.arm(&path) {
                        warn!(path = %path.display(), error = %err, "could not watch notes file");
                    }
                }
                Effect::DisarmWatch => self.services.watcher.disarm(),
            }
        }
        outcome
    }

    fn persist_settings(&mut self) {
        let settings = PanelSettings::new(
            self.state.file_path().map(PathBuf::from),
            self.state.auto_save(),
        );
        if let Err(err) = self.services.settings.save(&settings) {
            warn!(error = %err, "failed to persist panel settings");
            let dialog = TaskDialog::new(err.to_string())
                .caption(DIALOG_CAPTION)
                .instruction("Failed to save settings:")
                .buttons(DialogButtons::OK)
                .icon(DialogIcon::Stop);
            self.services.dialogs.show(&dialog);
        }
    }
}
