pub mod dialog;
pub mod file_monitor;
pub mod note_file;
pub mod panel;
pub mod state;

pub use dialog::{
    DialogButtons, DialogIcon, DialogResult, Dialogs, OpenDialogRequest, SaveDialogRequest,
    SaveStart, TaskDialog,
};
pub use file_monitor::{
    ChangeWatcher, FileEvent, FileMonitorError, FileMonitorEventKind, NotifyWatcher,
};
pub use note_file::{DiskNoteFiles, NoteFileError, NoteFiles};
pub use panel::{
    LoadOutcome, NotesPanel, PanelServices, SaveOutcome, SettingsSink, DIALOG_CAPTION,
};
pub use state::{
    AutoSaveStatus, EditorInput, EditorState, Effect, LoadOrigin, PanelAffordances,
};
