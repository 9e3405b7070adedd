use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use eframe::{egui, App, Frame, NativeOptions};
use egui::{RichText, TextStyle};
use notespanel_core::{
    DialogButtons, DialogIcon, DialogResult, Dialogs, NotesPanel, OpenDialogRequest,
    PanelServices, SaveDialogRequest, SaveStart, TaskDialog, DIALOG_CAPTION,
};
use notespanel_settings::PanelSettingsStore;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use tracing::info;
use tracing_subscriber::EnvFilter;

const APP_TITLE: &str = "Notes";
/// 空閒時仍定期清空監看佇列。 / Keep draining the watch queue while idle.
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// 以 rfd 實作的原生對話框。 / Native dialogs backed by rfd.
struct RfdDialogs;

impl RfdDialogs {
    fn text_dialog(title: &str) -> FileDialog {
        FileDialog::new()
            .set_title(title)
            .add_filter("Text Files", &["txt"])
            .add_filter("All Files", &["*"])
    }
}

impl Dialogs for RfdDialogs {
    fn pick_open(&mut self, request: &OpenDialogRequest) -> Option<PathBuf> {
        let mut dialog = Self::text_dialog("Open notes file");
        if let Some(initial) = request.initial_path.as_deref() {
            if let Some(directory) = initial.parent() {
                dialog = dialog.set_directory(directory);
            }
            if let Some(name) = initial.file_name() {
                dialog = dialog.set_file_name(name.to_string_lossy());
            }
        }
        dialog.pick_file()
    }

    fn pick_save(&mut self, request: &SaveDialogRequest) -> Option<PathBuf> {
        let mut dialog = Self::text_dialog("Save notes as");
        match &request.start {
            SaveStart::Directory {
                directory,
                file_name,
            } => {
                dialog = dialog.set_directory(directory);
                if let Some(name) = file_name {
                    dialog = dialog.set_file_name(name.as_str());
                }
            }
            SaveStart::ComputerRoot => dialog = dialog.set_directory(computer_root()),
        }
        dialog.save_file()
    }

    fn show(&mut self, dialog: &TaskDialog) -> DialogResult {
        let description = match dialog.instruction.as_deref() {
            Some(instruction) => format!("{instruction}\n\n{}", dialog.text),
            None => dialog.text.clone(),
        };
        let result = MessageDialog::new()
            .set_title(dialog.caption.as_deref().unwrap_or(DIALOG_CAPTION))
            .set_description(description)
            .set_level(message_level(dialog.icon))
            .set_buttons(message_buttons(dialog.buttons))
            .show();

        match result {
            MessageDialogResult::Yes => DialogResult::Yes,
            MessageDialogResult::No => DialogResult::No,
            MessageDialogResult::Ok => DialogResult::Ok,
            MessageDialogResult::Cancel => DialogResult::Cancel,
            MessageDialogResult::Custom(_) => DialogResult::None,
        }
    }
}

fn message_level(icon: DialogIcon) -> MessageLevel {
    match icon {
        DialogIcon::Stop | DialogIcon::SecurityError => MessageLevel::Error,
        DialogIcon::Warning | DialogIcon::SecurityWarning => MessageLevel::Warning,
        _ => MessageLevel::Info,
    }
}

fn message_buttons(buttons: DialogButtons) -> MessageButtons {
    if buttons.contains(DialogButtons::YES | DialogButtons::NO) {
        if buttons.contains(DialogButtons::CANCEL) {
            MessageButtons::YesNoCancel
        } else {
            MessageButtons::YesNo
        }
    } else if buttons.contains(DialogButtons::OK | DialogButtons::CANCEL) {
        MessageButtons::OkCancel
    } else {
        MessageButtons::Ok
    }
}

#[cfg(windows)]
fn computer_root() -> PathBuf {
    // 「本機」的殼層識別碼。 / Shell identifier of "This PC".
    PathBuf::from("::{20D04FE0-3AEA-1069-A2D8-08002B30309D}")
}

#[cfg(not(windows))]
fn computer_root() -> PathBuf {
    PathBuf::from("/")
}

struct NotesPanelApp {
    panel: NotesPanel,
}

impl NotesPanelApp {
    fn new(store: PanelSettingsStore) -> Self {
        let mut panel = NotesPanel::new(PanelServices::native(
            Box::new(RfdDialogs),
            Box::new(store),
        ));
        panel.activate();
        Self { panel }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        let controls = self.panel.affordances();
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open...").clicked() {
                        ui.close_menu();
                        self.panel.select_file();
                    }
                    if ui
                        .add_enabled(controls.save_enabled, egui::Button::new("Save"))
                        .clicked()
                    {
                        ui.close_menu();
                        self.panel.save_file();
                    }
                    if ui
                        .add_enabled(controls.save_as_enabled, egui::Button::new("Save As..."))
                        .clicked()
                    {
                        ui.close_menu();
                        self.panel.save_file_as();
                    }
                    ui.separator();
                    let mut checked = controls.auto_save_checked;
                    if ui.checkbox(&mut checked, "Auto-save").clicked() {
                        ui.close_menu();
                        self.panel.toggle_auto_save();
                    }
                });
            });
        });
    }

    fn show_path_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("path_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("File:");
                ui.label(RichText::new(self.panel.displayed_path()).monospace());
            });
        });
    }

    fn show_status_banner(&self, ctx: &egui::Context) {
        if !self.panel.affordances().banner_visible {
            return;
        }
        egui::TopBottomPanel::bottom("auto_save_banner").show(ctx, |ui| {
            ui.label(self.panel.state().status().label());
        });
    }

    fn show_editor(&mut self, ctx: &egui::Context) {
        let editable = self.panel.affordances().editable;
        egui::CentralPanel::default().show(ctx, |ui| {
            let mut buffer = self.panel.state().buffer().to_owned();
            let text_edit = egui::TextEdit::multiline(&mut buffer)
                .font(TextStyle::Monospace)
                .desired_width(f32::INFINITY)
                .interactive(editable);
            let response = ui.add_sized(ui.available_size(), text_edit);
            if response.changed() {
                self.panel.edit(buffer);
            }
        });
    }
}

impl App for NotesPanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.panel.pump_watch_events();

        self.show_menu_bar(ctx);
        self.show_path_bar(ctx);
        self.show_status_banner(ctx);
        self.show_editor(ctx);

        ctx.request_repaint_after(WATCH_POLL_INTERVAL);
    }
}

impl Drop for NotesPanelApp {
    fn drop(&mut self) {
        self.panel.teardown();
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let store = PanelSettingsStore::user_default().context("locate panel settings")?;
    info!(settings = %store.path().display(), "starting notes panel");

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 640.0])
            .with_title(APP_TITLE),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |_cc| Box::new(NotesPanelApp::new(store))),
    )
    .map_err(|err| anyhow!("failed to run notes window: {err}"))
}
