use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use notespanel_core::{
    DialogButtons, DialogResult, Dialogs, LoadOutcome, NotesPanel, OpenDialogRequest,
    PanelServices, SaveDialogRequest, SaveOutcome, TaskDialog,
};
use notespanel_settings::PanelSettingsStore;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "notespanel-cli",
    about = "Headless host for the notes panel",
    author,
    version
)]
struct Cli {
    /// 指定設定檔；預設為使用者設定資料夾。 / Settings file (defaults to the user config directory).
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 顯示面板狀態。 / Show the panel state restored from settings.
    Status(StatusArgs),
    /// 輸出目前緩衝區內容。 / Print the current buffer.
    Show,
    /// 選取並載入筆記檔（「開啟...」）。 / Select and load a notes file (the `Open...` command).
    Open(OpenArgs),
    /// 以使用者編輯取代緩衝區。 / Replace the buffer as a user edit.
    Edit(EditArgs),
    /// 手動儲存。 / Save manually.
    Save,
    /// 另存新檔。 / Save to a new file and reopen it.
    SaveAs(SaveAsArgs),
    /// 切換自動儲存。 / Toggle auto-save.
    AutoSave(AutoSaveArgs),
}

#[derive(Args)]
struct StatusArgs {
    /// 以 JSON 輸出。 / Emit JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct OpenArgs {
    /// 筆記檔路徑。 / Notes file to open.
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

#[derive(Args)]
struct EditArgs {
    /// 新的內容；略過時從標準輸入讀取。 / New buffer text; read from stdin when omitted.
    #[arg(long, value_name = "TEXT")]
    text: Option<String>,

    /// 編輯後手動儲存。 / Save manually after editing.
    #[arg(long)]
    save: bool,
}

#[derive(Args)]
struct SaveAsArgs {
    /// 目標檔案。 / Destination file.
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

#[derive(Args)]
struct AutoSaveArgs {
    /// 開啟時立即儲存目前文字。 / Answer "Yes" to saving the current text when enabling.
    #[arg(long)]
    yes: bool,
}

#[derive(Serialize)]
struct StatusReport {
    path: String,
    auto_save: bool,
    read_only: bool,
    save_enabled: bool,
    status: &'static str,
    bytes: usize,
}

/// 預先決定答案的對話框。 / Dialogs answered up front from command-line arguments.
#[derive(Default)]
struct ScriptedDialogs {
    open: Option<PathBuf>,
    save: Option<PathBuf>,
    confirm: Option<DialogResult>,
}

impl Dialogs for ScriptedDialogs {
    fn pick_open(&mut self, _request: &OpenDialogRequest) -> Option<PathBuf> {
        self.open.take()
    }

    fn pick_save(&mut self, _request: &SaveDialogRequest) -> Option<PathBuf> {
        self.save.take()
    }

    fn show(&mut self, dialog: &TaskDialog) -> DialogResult {
        if dialog.buttons.contains(DialogButtons::YES) {
            return self.confirm.unwrap_or(DialogResult::No);
        }
        let caption = dialog.caption.as_deref().unwrap_or("Notes");
        match dialog.instruction.as_deref() {
            Some(instruction) => eprintln!("{caption}: {instruction} {}", dialog.text),
            None => eprintln!("{caption}: {}", dialog.text),
        }
        DialogResult::Ok
    }
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let Cli { settings, command } = Cli::parse();
    let store = match settings {
        Some(path) => PanelSettingsStore::new(resolve_input_path(&path)?),
        None => PanelSettingsStore::user_default().context("locate settings file")?,
    };

    let mut dialogs = ScriptedDialogs::default();
    match &command {
        Commands::Open(args) => dialogs.open = Some(resolve_input_path(&args.path)?),
        Commands::SaveAs(args) => dialogs.save = Some(resolve_input_path(&args.path)?),
        Commands::AutoSave(args) if args.yes => dialogs.confirm = Some(DialogResult::Yes),
        _ => {}
    }

    let mut panel = NotesPanel::new(PanelServices::native(
        Box::new(dialogs),
        Box::new(store),
    ));
    panel.activate();
    let result = execute(command, &mut panel);
    panel.pump_watch_events();
    panel.teardown();
    result
}

fn execute(command: Commands, panel: &mut NotesPanel) -> Result<()> {
    match command {
        Commands::Status(args) => execute_status(args, panel),
        Commands::Show => {
            print!("{}", panel.state().buffer());
            Ok(())
        }
        Commands::Open(args) => execute_open(args, panel),
        Commands::Edit(args) => execute_edit(args, panel),
        Commands::Save => {
            ensure_manual_save(panel)?;
            finish_save(panel.save_file(), panel)
        }
        Commands::SaveAs(args) => execute_save_as(args, panel),
        Commands::AutoSave(_) => {
            let enabled = panel.toggle_auto_save();
            println!(
                "Auto-save {}",
                if enabled { "enabled" } else { "disabled" }
            );
            Ok(())
        }
    }
}

fn execute_status(args: StatusArgs, panel: &NotesPanel) -> Result<()> {
    let state = panel.state();
    let report = StatusReport {
        path: panel.displayed_path(),
        auto_save: state.auto_save(),
        read_only: state.is_read_only(),
        save_enabled: panel.affordances().save_enabled,
        status: state.status().label(),
        bytes: state.buffer().len(),
    };

    if args.json {
        let payload =
            serde_json::to_string_pretty(&report).context("serialise status report")?;
        println!("{payload}");
    } else {
        let path = if report.path.is_empty() {
            "(none)"
        } else {
            report.path.as_str()
        };
        println!("File: {path}");
        println!(
            "Auto-save: {}",
            if report.auto_save { "on" } else { "off" }
        );
        println!(
            "Mode: {}",
            if report.read_only { "read-only" } else { "editable" }
        );
        println!("Bytes: {}", report.bytes);
    }
    Ok(())
}

fn execute_open(args: OpenArgs, panel: &mut NotesPanel) -> Result<()> {
    match panel.select_file() {
        Some(LoadOutcome::Loaded) => {
            println!("Opened {}", panel.displayed_path());
            Ok(())
        }
        Some(LoadOutcome::Failed) => bail!("{}", panel.state().buffer()),
        Some(LoadOutcome::Missing) | None => {
            bail!("'{}' does not exist", args.path.display())
        }
    }
}

fn execute_edit(args: EditArgs, panel: &mut NotesPanel) -> Result<()> {
    if panel.state().is_read_only() {
        bail!("no notes file is open; run `open` first");
    }
    if args.save {
        ensure_manual_save(panel)?;
    }

    let text = match args.text {
        Some(text) => text,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("read new text from stdin")?;
            text
        }
    };

    match panel.edit(text) {
        Some(outcome) => finish_save(outcome, panel),
        None if args.save => finish_save(panel.save_file(), panel),
        None => {
            println!("Buffer updated but not saved");
            Ok(())
        }
    }
}

fn execute_save_as(args: SaveAsArgs, panel: &mut NotesPanel) -> Result<()> {
    if !panel.affordances().save_as_enabled {
        bail!("manual save is disabled while auto-save is on");
    }
    if panel.save_file_as() {
        println!("Saved as {}", panel.displayed_path());
        Ok(())
    } else {
        bail!("could not save to '{}'", args.path.display())
    }
}

fn ensure_manual_save(panel: &NotesPanel) -> Result<()> {
    if !panel.affordances().save_enabled {
        bail!("manual save is disabled while auto-save is on");
    }
    Ok(())
}

fn finish_save(outcome: SaveOutcome, panel: &NotesPanel) -> Result<()> {
    match outcome {
        SaveOutcome::Saved => {
            println!("Saved {}", panel.displayed_path());
            Ok(())
        }
        SaveOutcome::Skipped => bail!("no notes file is open"),
        SaveOutcome::Failed => bail!("failed to save {}", panel.displayed_path()),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
