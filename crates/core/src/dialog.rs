use std::path::{Path, PathBuf};

use bitflags::bitflags;

bitflags! {
    /// 對話框可顯示的通用按鈕。 / Common buttons a task dialog can show.
    ///
    /// Bit values match the native `TDCBF_*` flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DialogButtons: u32 {
        const OK = 0x0001;
        const YES = 0x0002;
        const NO = 0x0004;
        const CANCEL = 0x0008;
        const RETRY = 0x0010;
        const CLOSE = 0x0020;
    }
}

/// 對話框圖示。 / Icon shown next to the dialog instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogIcon {
    Information,
    Warning,
    Stop,
    /// A question is conventionally shown without an icon.
    Question,
    SecurityWarning,
    SecurityError,
    SecuritySuccess,
    SecurityShield,
    SecurityShieldBlue,
    SecurityShieldGray,
}

impl DialogIcon {
    /// 原生資源識別碼。 / Native resource identifier for the icon.
    pub fn resource_id(self) -> u16 {
        match self {
            DialogIcon::Warning => u16::MAX,
            DialogIcon::Stop => u16::MAX - 1,
            DialogIcon::Information => u16::MAX - 2,
            DialogIcon::SecurityShield => u16::MAX - 3,
            DialogIcon::SecurityShieldBlue => u16::MAX - 4,
            DialogIcon::SecurityWarning => u16::MAX - 5,
            DialogIcon::SecurityError => u16::MAX - 6,
            DialogIcon::SecuritySuccess => u16::MAX - 7,
            DialogIcon::SecurityShieldGray => u16::MAX - 8,
            DialogIcon::Question => 0,
        }
    }
}

/// 使用者按下的按鈕；失敗時為 `None`。 / Button the user pressed, or `None` on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogResult {
    None,
    Ok,
    Cancel,
    Yes,
    No,
    Retry,
    Close,
}

impl DialogResult {
    /// 由原生按鈕代碼轉換。 / Maps a native button id (`IDOK`, `IDYES`, ...) to a result.
    pub fn from_native(code: i32) -> Self {
        match code {
            1 => DialogResult::Ok,
            2 => DialogResult::Cancel,
            4 => DialogResult::Retry,
            6 => DialogResult::Yes,
            7 => DialogResult::No,
            8 => DialogResult::Close,
            _ => DialogResult::None,
        }
    }
}

/// 模態確認對話框的內容。 / Content of a modal task dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDialog {
    pub caption: Option<String>,
    pub instruction: Option<String>,
    pub text: String,
    pub buttons: DialogButtons,
    pub icon: DialogIcon,
}

impl TaskDialog {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            caption: None,
            instruction: None,
            text: text.into(),
            buttons: DialogButtons::OK,
            icon: DialogIcon::Question,
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn buttons(mut self, buttons: DialogButtons) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn icon(mut self, icon: DialogIcon) -> Self {
        self.icon = icon;
        self
    }

    /// 是否提供指定按鈕。 / Whether the dialog offers the given button.
    pub fn offers(&self, result: DialogResult) -> bool {
        let flag = match result {
            DialogResult::Ok => DialogButtons::OK,
            DialogResult::Cancel => DialogButtons::CANCEL,
            DialogResult::Yes => DialogButtons::YES,
            DialogResult::No => DialogButtons::NO,
            DialogResult::Retry => DialogButtons::RETRY,
            DialogResult::Close => DialogButtons::CLOSE,
            DialogResult::None => return false,
        };
        self.buttons.contains(flag)
    }
}

/// 開啟檔案對話框的設定。 / Options for the open-file prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDialogRequest {
    pub initial_path: Option<PathBuf>,
    /// When false a path that does not exist yet may be chosen.
    pub must_exist: bool,
}

impl OpenDialogRequest {
    pub fn new(initial_path: Option<&Path>) -> Self {
        Self {
            initial_path: initial_path.map(Path::to_path_buf),
            must_exist: false,
        }
    }
}

/// 另存新檔對話框的起始位置。 / Where the save prompt starts browsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStart {
    /// 目前檔案所在資料夾與檔名。 / Directory and name of the current file.
    Directory {
        directory: PathBuf,
        file_name: Option<String>,
    },
    /// 「電腦」根層級，迫使使用者自行選擇。 / The "computer" root, forcing an explicit choice.
    ComputerRoot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDialogRequest {
    pub start: SaveStart,
    pub overwrite_prompt: bool,
}

impl SaveDialogRequest {
    /// 依目前檔案決定起始位置。 / Picks the start location from the current file, if any.
    pub fn for_current(current: Option<&Path>) -> Self {
        let start = match current.and_then(|path| path.parent().map(|dir| (dir, path))) {
            Some((directory, path)) => SaveStart::Directory {
                directory: directory.to_path_buf(),
                file_name: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned()),
            },
            None => SaveStart::ComputerRoot,
        };
        Self {
            start,
            overwrite_prompt: true,
        }
    }
}

/// 面板使用的原生對話框。 / Native dialogs the panel relies on.
pub trait Dialogs {
    /// 回傳選取的路徑；取消時為 `None`。 / Returns the chosen path, or `None` when cancelled.
    fn pick_open(&mut self, request: &OpenDialogRequest) -> Option<PathBuf>;

    fn pick_save(&mut self, request: &SaveDialogRequest) -> Option<PathBuf>;

    /// 顯示模態對話框並阻塞至關閉。 / Shows a modal dialog, blocking until dismissed.
    fn show(&mut self, dialog: &TaskDialog) -> DialogResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_codes_map_to_results() {
        assert_eq!(DialogResult::from_native(1), DialogResult::Ok);
        assert_eq!(DialogResult::from_native(2), DialogResult::Cancel);
        assert_eq!(DialogResult::from_native(4), DialogResult::Retry);
        assert_eq!(DialogResult::from_native(6), DialogResult::Yes);
        assert_eq!(DialogResult::from_native(7), DialogResult::No);
        assert_eq!(DialogResult::from_native(8), DialogResult::Close);
        assert_eq!(DialogResult::from_native(3), DialogResult::None);
        assert_eq!(DialogResult::from_native(-1), DialogResult::None);
    }

    #[test]
    fn builder_sets_fields_and_offers_buttons() {
        let dialog = TaskDialog::new("body")
            .caption("Notes")
            .instruction("Save now?")
            .buttons(DialogButtons::YES | DialogButtons::NO)
            .icon(DialogIcon::Warning);

        assert_eq!(dialog.caption.as_deref(), Some("Notes"));
        assert!(dialog.offers(DialogResult::Yes));
        assert!(dialog.offers(DialogResult::No));
        assert!(!dialog.offers(DialogResult::Ok));
        assert!(!dialog.offers(DialogResult::None));
        assert_eq!(dialog.icon.resource_id(), u16::MAX);
    }

    #[test]
    fn save_request_defaults_to_computer_root_without_file() {
        let request = SaveDialogRequest::for_current(None);
        assert_eq!(request.start, SaveStart::ComputerRoot);
        assert!(request.overwrite_prompt);
    }

    #[test]
    fn save_request_starts_in_current_directory() {
        let current = Path::new("/home/me/notes/todo.txt");
        let request = SaveDialogRequest::for_current(Some(current));
        assert_eq!(
            request.start,
            SaveStart::Directory {
                directory: PathBuf::from("/home/me/notes"),
                file_name: Some("todo.txt".to_string()),
            }
        );
    }

    #[test]
    fn open_request_allows_new_files() {
        let request = OpenDialogRequest::new(Some(Path::new("/tmp/new.txt")));
        assert!(!request.must_exist);
        assert_eq!(request.initial_path, Some(PathBuf::from("/tmp/new.txt")));
    }
}
