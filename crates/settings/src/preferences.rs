use std::path::{Path, PathBuf};

/// 面板跨工作階段保存的設定。 / Settings the notes panel keeps across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelSettings {
    pub last_file_path: Option<PathBuf>,
    pub auto_save_enabled: bool,
}

impl PanelSettings {
    pub fn new(last_file_path: Option<PathBuf>, auto_save_enabled: bool) -> Self {
        Self {
            last_file_path,
            auto_save_enabled,
        }
    }

    /// 取得最後開啟的檔案路徑（若有）。 / Returns the last opened file path, if any.
    pub fn last_file_path(&self) -> Option<&Path> {
        self.last_file_path.as_deref()
    }

    /// 解析兩行格式：第一行為路徑，第二行為自動儲存旗標。 /
    /// Parses the two-line payload: path on line one, auto-save flag on line two.
    ///
    /// Never fails. A blank first line means no file; a missing or malformed
    /// second line (including one that is not valid UTF-8) means auto-save is off.
    pub fn parse(contents: &[u8]) -> Self {
        let mut lines = contents.split(|byte| *byte == b'\n');
        let last_file_path = lines
            .next()
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
            .map(|line| bytes_to_path(line.to_vec()));
        let auto_save_enabled = lines
            .next()
            .and_then(|line| parse_flag(&String::from_utf8_lossy(line)))
            .unwrap_or(false);

        Self {
            last_file_path,
            auto_save_enabled,
        }
    }

    /// 序列化為兩行內容。 / Serialises the settings back into the two-line payload.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = self
            .last_file_path
            .as_deref()
            .map(path_to_bytes)
            .unwrap_or_default();
        payload.push(b'\n');
        payload.extend_from_slice(format_flag(self.auto_save_enabled).as_bytes());
        payload.push(b'\n');
        payload
    }
}

#[cfg(unix)]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(unix)]
fn bytes_to_path(bytes: Vec<u8>) -> PathBuf {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(OsString::from_vec(bytes))
}

// 其他平台以 UTF-8 儲存路徑。 / Other platforms store the path as UTF-8.
#[cfg(not(unix))]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}

/// Case-insensitive `True`/`False`, surrounding whitespace ignored.
fn parse_flag(raw: &str) -> Option<bool> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn format_flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
