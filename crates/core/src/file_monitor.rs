use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use notify::event::{EventKind, ModifyKind, RemoveKind};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tracing::{debug, warn};

/// 監控檔案變更時可能回傳的錯誤。 / Error type for file monitoring operations.
#[derive(Debug, Error)]
pub enum FileMonitorError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("cannot watch {0}: path has no parent directory or file name")]
    NoParent(PathBuf),
}

/// 監控到的事件種類。 / Classifies observed file system changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileMonitorEventKind {
    Modified,
    Removed,
    Created,
    Accessed,
    Renamed { from: PathBuf, to: PathBuf },
    Other,
}

/// 檔案事件的詳細資料。 / File event payload with resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kind: FileMonitorEventKind,
}

/// 面板所需的變更監看介面。 / Change-watch surface the panel depends on.
///
/// Events are produced on a background thread and queued; `drain` hands them
/// to the thread that owns the panel.
pub trait ChangeWatcher {
    /// 開始監看指定檔案，取代先前的監看。 / Starts watching `path`, replacing any previous watch.
    fn arm(&mut self, path: &Path) -> Result<(), FileMonitorError>;

    /// 停止並釋放目前的監看。 / Stops and releases the current watch.
    fn disarm(&mut self);

    fn is_armed(&self) -> bool;

    /// 取出所有排隊中的事件（非阻塞）。 / Takes every queued event without blocking.
    fn drain(&mut self) -> Vec<FileEvent>;
}

struct ActiveWatch {
    watcher: RecommendedWatcher,
    directory: PathBuf,
    file: PathBuf,
}

/// 以 `notify` 監看單一檔案所在的資料夾並過濾檔名。 /
/// Watches the directory of a single file through `notify`, filtered to its name.
pub struct NotifyWatcher {
    active: Option<ActiveWatch>,
    tx: Sender<FileEvent>,
    rx: Receiver<FileEvent>,
}

impl NotifyWatcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            active: None,
            tx,
            rx,
        }
    }

    /// 目前監看中的檔案。 / File currently being watched.
    pub fn watched_file(&self) -> Option<&Path> {
        self.active.as_ref().map(|active| active.file.as_path())
    }

    /// 在期限內等待事件，逾時回傳 `None`。 / Waits for an event until the timeout, returning `None` on timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<FileEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Default for NotifyWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeWatcher for NotifyWatcher {
    fn arm(&mut self, path: &Path) -> Result<(), FileMonitorError> {
        self.disarm();

        let (directory, file_name) = split_target(path)?;
        let tx = self.tx.clone();
        let filter = file_name.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if let Some(mapped) = map_event(event, &filter) {
                        let _ = tx.send(mapped);
                    }
                }
                Err(err) => warn!(error = %err, "file watch error"),
            },
            Config::default(),
        )?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        debug!(path = %path.display(), "armed file watch");
        self.active = Some(ActiveWatch {
            watcher,
            directory,
            file: path.to_path_buf(),
        });
        Ok(())
    }

    fn disarm(&mut self) {
        if let Some(mut active) = self.active.take() {
            if let Err(err) = active.watcher.unwatch(&active.directory) {
                debug!(error = %err, "unwatch failed while disarming");
            }
            debug!(path = %active.file.display(), "disarmed file watch");
        }
        // 丟棄尚未處理的舊事件。 / Drop stale events from the released watch.
        while self.rx.try_recv().is_ok() {}
    }

    fn is_armed(&self) -> bool {
        self.active.is_some()
    }

    fn drain(&mut self) -> Vec<FileEvent> {
        self.rx.try_iter().collect()
    }
}

impl Drop for NotifyWatcher {
    fn drop(&mut self) {
        self.disarm();
    }
}

fn split_target(path: &Path) -> Result<(PathBuf, OsString), FileMonitorError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| FileMonitorError::NoParent(path.to_path_buf()))?;
    let directory = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => return Err(FileMonitorError::NoParent(path.to_path_buf())),
    };
    Ok((directory, file_name.to_os_string()))
}

fn map_event(event: notify::Event, file_name: &OsString) -> Option<FileEvent> {
    let is_target = |path: &PathBuf| path.file_name() == Some(file_name.as_os_str());
    if !event.paths.iter().any(is_target) {
        return None;
    }

    let primary = event.paths[0].clone();
    let kind = match event.kind {
        EventKind::Modify(ModifyKind::Name(_)) if event.paths.len() >= 2 => {
            let to = event.paths[1].clone();
            FileMonitorEventKind::Renamed {
                from: primary.clone(),
                to,
            }
        }
        EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Metadata(_))
        | EventKind::Modify(ModifyKind::Any) => FileMonitorEventKind::Modified,
        EventKind::Access(_) => FileMonitorEventKind::Accessed,
        EventKind::Create(_) => FileMonitorEventKind::Created,
        EventKind::Remove(RemoveKind::File) | EventKind::Remove(RemoveKind::Any) => {
            FileMonitorEventKind::Removed
        }
        _ => FileMonitorEventKind::Other,
    };

    let path = match &kind {
        FileMonitorEventKind::Renamed { to, .. } => to.clone(),
        _ => event
            .paths
            .into_iter()
            .find(is_target)
            .unwrap_or(primary),
    };

    Some(FileEvent { path, kind })
}
