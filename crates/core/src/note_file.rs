use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chardetng::EncodingDetector;
use encoding_rs::{Encoding as RsEncoding, UTF_8};
use thiserror::Error;
use tracing::debug;

/// 讀寫筆記檔時可能發生的錯誤。 / Errors raised while reading or writing a note file.
#[derive(Debug, Error)]
pub enum NoteFileError {
    #[error("file {0} does not exist")]
    NotFound(PathBuf),
    #[error("{source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl NoteFileError {
    fn io(path: &Path, source: io::Error) -> Self {
        NoteFileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// 面板使用的檔案存取介面。 / File access used by the notes panel.
pub trait NoteFiles {
    fn exists(&self, path: &Path) -> bool;

    /// 以獨佔方式讀取整個檔案並解碼。 / Reads and decodes the whole file under exclusive access.
    fn read(&self, path: &Path) -> Result<String, NoteFileError>;

    /// 截斷檔案後寫入完整文字。 / Truncates the file and writes the full text.
    fn write(&self, path: &Path, text: &str) -> Result<(), NoteFileError>;
}

/// 直接操作磁碟的實作。 / Implementation backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskNoteFiles;

impl NoteFiles for DiskNoteFiles {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> Result<String, NoteFileError> {
        let mut file = open_exclusive(OpenOptions::new().read(true), path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                NoteFileError::NotFound(path.to_path_buf())
            } else {
                NoteFileError::io(path, err)
            }
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|err| NoteFileError::io(path, err))?;

        let text = decode_bytes(&bytes);
        debug!(path = %path.display(), bytes = bytes.len(), "read note file");
        Ok(text)
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), NoteFileError> {
        let mut file = open_exclusive(
            OpenOptions::new().write(true).create(true).truncate(true),
            path,
        )
        .map_err(|err| NoteFileError::io(path, err))?;
        file.write_all(text.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|err| NoteFileError::io(path, err))?;
        debug!(path = %path.display(), bytes = text.len(), "wrote note file");
        Ok(())
    }
}

#[cfg(windows)]
fn open_exclusive(options: &mut OpenOptions, path: &Path) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;
    // 不與其他程序共用。 / No sharing with other processes while open.
    options.share_mode(0).open(path)
}

#[cfg(not(windows))]
fn open_exclusive(options: &mut OpenOptions, path: &Path) -> io::Result<File> {
    options.open(path)
}

/// 依 BOM、UTF-8 驗證與編碼偵測的順序解碼。 / Decodes by BOM first, then strict UTF-8, then detection.
pub(crate) fn decode_bytes(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = RsEncoding::for_bom(bytes) {
        let (cow, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return cow.into_owned();
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_owned();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guess = detector.guess(None, true);
    let (cow, had_errors) = guess.decode_without_bom_handling(bytes);
    if had_errors && guess != UTF_8 {
        debug!(encoding = guess.name(), "detected encoding produced replacements");
    }
    match cow {
        Cow::Borrowed(slice) => slice.to_owned(),
        Cow::Owned(string) => string,
    }
}
