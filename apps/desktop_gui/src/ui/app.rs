use std::path::PathBuf;

use arboard::Clipboard;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use recipe_core::{ActionCatalog, ExportState, RecipeSession};
use serde::{Deserialize, Serialize};
use shared::domain::RecipeInfo;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{reduce, EditorAction};
use crate::ui::board::{self, BoardState};
use crate::ui::dialogs::{self, CloseChoice, ExportDialog, ExportDialogAction};

pub const SETTINGS_STORAGE_KEY: &str = "recipe_grid.settings";

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub server_url: String,
    pub skip_landing: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8443".to_string(),
            skip_landing: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedDesktopSettings {
    pub notes_panel_open: bool,
    pub last_save_dir: Option<PathBuf>,
}

impl Default for PersistedDesktopSettings {
    fn default() -> Self {
        Self {
            notes_panel_open: true,
            last_save_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppViewState {
    Landing,
    Editor,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    message: String,
}

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    server_url: String,
    catalog: ActionCatalog,
    session: RecipeSession,
    board: BoardState,
    view_state: AppViewState,
    status: String,
    status_banner: Option<StatusBanner>,
    export_state: ExportState,
    export_dialog: ExportDialog,
    notes_panel_open: bool,
    instructions_open: bool,
    confirm_close_open: bool,
    allow_close: bool,
    last_save_dir: Option<PathBuf>,
}

impl DesktopGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        persisted_settings: Option<PersistedDesktopSettings>,
        startup: StartupConfig,
    ) -> Self {
        let settings = persisted_settings.unwrap_or_default();
        Self {
            cmd_tx,
            ui_rx,
            server_url: startup.server_url,
            catalog: ActionCatalog::builtin(),
            session: RecipeSession::new(),
            board: BoardState::default(),
            view_state: if startup.skip_landing {
                AppViewState::Editor
            } else {
                AppViewState::Landing
            },
            status: "Ready".to_string(),
            status_banner: None,
            export_state: ExportState::Idle,
            export_dialog: ExportDialog::default(),
            notes_panel_open: settings.notes_panel_open,
            instructions_open: false,
            confirm_close_open: false,
            allow_close: false,
            last_save_dir: settings.last_save_dir,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::ExportStateChanged(state) => {
                    match &state {
                        ExportState::Done(receipt) => {
                            self.status = format!("Recipe uploaded: {}", receipt.url);
                            self.status_banner = None;
                        }
                        ExportState::Failed(message) => {
                            self.show_error(UiError::from_message(
                                UiErrorContext::Export,
                                message.clone(),
                            ));
                        }
                        ExportState::Generating => self.status = "Generating PDF…".to_string(),
                        ExportState::Uploading => self.status = "Uploading PDF…".to_string(),
                        ExportState::Idle => {}
                    }
                    self.export_state = state;
                }
                UiEvent::PdfSaved(path) => {
                    self.status = format!("Saved PDF to {}", path.display());
                    self.last_save_dir = path.parent().map(|dir| dir.to_path_buf());
                }
                UiEvent::Error(err) => self.show_error(err),
            }
        }
    }

    fn show_error(&mut self, err: UiError) {
        tracing::warn!(
            context = ?err.context(),
            category = ?err.category(),
            message = err.message(),
            "surfacing error to user"
        );
        self.status = err.message().to_string();
        self.status_banner = Some(StatusBanner {
            message: err.banner_text(),
        });
    }

    fn apply(&mut self, actions: Vec<EditorAction>) {
        for action in actions {
            self.session = reduce(&self.session, &self.catalog, action);
        }
    }

    fn request_export(&mut self) {
        if self.export_state.is_busy() {
            self.status = "An export is already in progress".to_string();
            self.export_dialog.open = true;
            return;
        }
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Export {
                snapshot: self.session.snapshot(),
            },
            &mut self.status,
        );
        if queued {
            self.export_state = ExportState::Generating;
            self.export_dialog.open = true;
        }
    }

    fn request_save_pdf(&mut self) {
        let mut dialog = rfd::FileDialog::new()
            .add_filter("PDF", &["pdf"])
            .set_file_name(suggested_file_name(self.session.info()));
        if let Some(dir) = self
            .last_save_dir
            .clone()
            .or_else(dirs::document_dir)
            .or_else(dirs::home_dir)
        {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };
        self.status = format!("Saving PDF to {}…", path.display());
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::SavePdf {
                snapshot: self.session.snapshot(),
                path,
            },
            &mut self.status,
        );
    }

    fn copy_link(&mut self, url: &str) {
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url.to_string())) {
            Ok(()) => self.status = "Link copied to clipboard".to_string(),
            Err(err) => self.status = format!("Failed to copy link: {err}"),
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(111, 53, 53))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
        }
    }

    fn show_landing(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.25);
                ui.heading(egui::RichText::new("Recipe Grid").size(40.0));
                ui.add_space(8.0);
                ui.label("Lay out a recipe as a board of steps, add notes, and share it as a PDF.");
                ui.add_space(24.0);
                if ui
                    .add(egui::Button::new(egui::RichText::new("Start").size(20.0)))
                    .clicked()
                {
                    self.view_state = AppViewState::Editor;
                }
                ui.add_space(8.0);
                if ui.link("How does it work?").clicked() {
                    self.instructions_open = true;
                }
            });
        });
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading("Recipe Grid");
                ui.separator();
                if ui.button("Instructions").clicked() {
                    self.instructions_open = !self.instructions_open;
                }
                ui.toggle_value(&mut self.notes_panel_open, "Notes");
                ui.separator();
                if ui.button("Save PDF…").clicked() {
                    self.request_save_pdf();
                }
                let export_label = if self.export_state.is_busy() {
                    "Exporting…"
                } else {
                    "Export"
                };
                if ui
                    .add_enabled(!self.export_state.is_busy(), egui::Button::new(export_label))
                    .on_hover_text(format!("Upload to {}", self.server_url))
                    .clicked()
                {
                    self.request_export();
                }
            });
            ui.add_space(2.0);
            self.show_info_form(ui);
            self.show_status_banner(ui);
            ui.add_space(4.0);
        });
    }

    fn show_info_form(&mut self, ui: &mut egui::Ui) {
        let mut info = self.session.info().clone();
        let mut changed = false;
        ui.horizontal_wrapped(|ui| {
            let mut field = |ui: &mut egui::Ui, label: &str, value: &mut String, width: f32| {
                ui.label(label);
                changed |= ui
                    .add(egui::TextEdit::singleline(value).desired_width(width))
                    .changed();
            };
            field(ui, "Recipe", &mut info.name, 180.0);
            field(ui, "Author", &mut info.author, 120.0);
            field(ui, "Cook time", &mut info.cook_time, 80.0);
            field(ui, "Date", &mut info.date, 90.0);
        });
        if changed {
            self.apply(vec![EditorAction::SetInfo(info)]);
        }
    }

    fn show_notes_panel(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();
        egui::SidePanel::right("notes_panel")
            .resizable(true)
            .default_width(300.0)
            .show_animated(ctx, self.notes_panel_open, |ui| {
                ui.heading("Notes");
                let mut text = self.session.notes().text().to_string();
                let response = ui.add(
                    egui::TextEdit::multiline(&mut text)
                        .desired_rows(10)
                        .desired_width(f32::INFINITY)
                        .hint_text("Anything the board does not say"),
                );
                if response.changed() {
                    actions.push(EditorAction::SetNotesText(text));
                }

                let renames = self.session.notes().renames();
                if !renames.is_empty() {
                    ui.add_space(8.0);
                    ui.label(egui::RichText::new("Renamed steps").strong());
                    for note in renames {
                        ui.horizontal(|ui| {
                            if ui
                                .small_button("×")
                                .on_hover_text("Remove this line from the notes")
                                .clicked()
                            {
                                actions.push(EditorAction::DismissRenameNote(note.cell));
                            }
                            ui.label(note.line());
                        });
                    }
                }
            });
        self.apply(actions);
    }

    fn show_editor(&mut self, ctx: &egui::Context) {
        self.show_top_bar(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&self.status).small());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} of 25 squares used",
                            self.session.grid().placed_count()
                        ))
                        .small()
                        .weak(),
                    );
                });
            });
        });

        egui::SidePanel::left("palette")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| board::show_palette(ui, &self.catalog));

        self.show_notes_panel(ctx);

        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                egui::ScrollArea::both()
                    .show(ui, |ui| board::show_grid(ui, &self.session, &mut self.board))
                    .inner
            })
            .inner;
        self.apply(actions);

        if let Some(action) = self.export_dialog.show(ctx, &self.export_state) {
            match action {
                ExportDialogAction::Close => {
                    dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::ResetExport,
                        &mut self.status,
                    );
                }
                ExportDialogAction::Retry => self.request_export(),
                ExportDialogAction::CopyLink(url) => self.copy_link(&url),
            }
        }
    }

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.viewport().close_requested())
            && should_confirm_close(self.allow_close, &self.session)
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.confirm_close_open = true;
        }

        if self.confirm_close_open {
            match dialogs::show_close_confirmation(ctx) {
                Some(CloseChoice::Leave) => {
                    self.confirm_close_open = false;
                    self.allow_close = true;
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                Some(CloseChoice::Stay) => self.confirm_close_open = false,
                None => {}
            }
        }
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        match self.view_state {
            AppViewState::Landing => self.show_landing(ctx),
            AppViewState::Editor => self.show_editor(ctx),
        }
        dialogs::show_instructions(ctx, &mut self.instructions_open);
        self.handle_close_request(ctx);

        if self.export_state.is_busy() || self.board.is_editing() {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedDesktopSettings {
            notes_panel_open: self.notes_panel_open,
            last_save_dir: self.last_save_dir.clone(),
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

/// `Sunday Stew` becomes `sunday-stew.pdf`.
/// A blank session has nothing to lose, so the window closes straight away.
fn should_confirm_close(allow_close: bool, session: &RecipeSession) -> bool {
    !allow_close && !session.is_blank()
}

fn suggested_file_name(info: &RecipeInfo) -> String {
    let mut slug = String::new();
    for c in info.display_name().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "recipe.pdf".to_string()
    } else {
        format!("{slug}.pdf")
    }
}
