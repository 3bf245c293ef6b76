//! Floating windows: instructions, export progress/QR, and the close prompt.

use eframe::egui;
use recipe_core::{ExportReceipt, ExportState};
use recipe_pdf::QrMatrix;

const QR_SIDE: f32 = 220.0;
const QR_QUIET_ZONE: usize = 2;

pub fn show_instructions(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("How to build a recipe")
        .open(open)
        .collapsible(false)
        .resizable(false)
        .default_width(380.0)
        .show(ctx, |ui| {
            ui.label("1. Drag actions from the palette onto the board.");
            ui.label("2. Drag a placed step onto another square to move it.");
            ui.label("3. Use ✏ to rename a step. The change is noted automatically.");
            ui.label("4. Use + to attach up to three mini-boxes, then drop actions into them.");
            ui.label("5. Fill in the recipe details and any extra notes.");
            ui.label("6. Save the PDF locally, or Export to get a shareable link and QR code.");
        });
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportDialogAction {
    Close,
    Retry,
    CopyLink(String),
}

/// Export window. Caches the QR matrix for the last link shown.
#[derive(Default)]
pub struct ExportDialog {
    pub open: bool,
    qr: Option<(String, Result<QrMatrix, String>)>,
}

impl ExportDialog {
    pub fn show(&mut self, ctx: &egui::Context, state: &ExportState) -> Option<ExportDialogAction> {
        if !self.open {
            return None;
        }

        let mut action = None;
        let mut window_open = true;
        egui::Window::new("Export recipe")
            .open(&mut window_open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.set_min_width(300.0);
                match state {
                    ExportState::Idle | ExportState::Generating => {
                        busy_row(ui, "Generating PDF…");
                    }
                    ExportState::Uploading => busy_row(ui, "Uploading…"),
                    ExportState::Done(receipt) => {
                        action = self.show_receipt(ui, receipt);
                    }
                    ExportState::Failed(message) => {
                        ui.colored_label(egui::Color32::from_rgb(200, 70, 70), message);
                        ui.add_space(8.0);
                        if ui.button("Try again").clicked() {
                            action = Some(ExportDialogAction::Retry);
                        }
                    }
                }
                if state.is_busy() {
                    ui.add_space(6.0);
                    ui.label(
                        egui::RichText::new("Closing this window does not cancel the upload.")
                            .weak()
                            .small(),
                    );
                }
            });

        if !window_open {
            action = Some(ExportDialogAction::Close);
        }
        if action == Some(ExportDialogAction::Close) {
            self.open = false;
        }
        action
    }

    fn show_receipt(
        &mut self,
        ui: &mut egui::Ui,
        receipt: &ExportReceipt,
    ) -> Option<ExportDialogAction> {
        let mut action = None;
        ui.label("Scan or share this link to open the recipe PDF:");
        ui.add_space(6.0);

        let cached = self
            .qr
            .as_ref()
            .is_some_and(|(url, _)| url == &receipt.url);
        if !cached {
            let matrix = QrMatrix::encode(&receipt.url).map_err(|err| err.to_string());
            self.qr = Some((receipt.url.clone(), matrix));
        }
        match self.qr.as_ref().map(|(_, matrix)| matrix) {
            Some(Ok(matrix)) => {
                ui.vertical_centered(|ui| paint_qr(ui, matrix));
            }
            Some(Err(err)) => {
                ui.colored_label(egui::Color32::from_rgb(200, 70, 70), err);
            }
            None => {}
        }

        ui.add_space(6.0);
        ui.hyperlink(&receipt.url);
        ui.horizontal(|ui| {
            if ui.button("Copy link").clicked() {
                action = Some(ExportDialogAction::CopyLink(receipt.url.clone()));
            }
            if ui.button("Done").clicked() {
                action = Some(ExportDialogAction::Close);
            }
        });
        action
    }
}

fn busy_row(ui: &mut egui::Ui, text: &str) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.label(text);
    });
}

fn paint_qr(ui: &mut egui::Ui, matrix: &QrMatrix) {
    let modules = matrix.width() + QR_QUIET_ZONE * 2;
    let module_side = (QR_SIDE / modules as f32).floor().max(1.0);
    let side = module_side * modules as f32;
    let (rect, _) = ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, egui::Color32::WHITE);

    for y in 0..matrix.width() {
        for x in 0..matrix.width() {
            if !matrix.is_dark(x, y) {
                continue;
            }
            let min = rect.min
                + egui::vec2(
                    (x + QR_QUIET_ZONE) as f32 * module_side,
                    (y + QR_QUIET_ZONE) as f32 * module_side,
                );
            painter.rect_filled(
                egui::Rect::from_min_size(min, egui::vec2(module_side, module_side)),
                0.0,
                egui::Color32::BLACK,
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Leave,
    Stay,
}

pub fn show_close_confirmation(ctx: &egui::Context) -> Option<CloseChoice> {
    let mut choice = None;
    let response = egui::Modal::new(egui::Id::new("confirm_close")).show(ctx, |ui| {
        ui.set_width(320.0);
        ui.heading("Leave the editor?");
        ui.label("Closing discards the recipe in the editor.");
        ui.label(
            egui::RichText::new("PDFs you already saved or exported are kept.")
                .weak()
                .small(),
        );
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("Discard and close").clicked() {
                choice = Some(CloseChoice::Leave);
            }
            if ui.button("Keep editing").clicked() {
                choice = Some(CloseChoice::Stay);
            }
        });
    });
    if choice.is_none() && response.should_close() {
        choice = Some(CloseChoice::Stay);
    }
    choice
}
