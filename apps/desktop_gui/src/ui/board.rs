//! The action palette and the 5×5 recipe board.
//!
//! Widgets never touch the session; they report [`EditorAction`]s which the app
//! feeds through the reducer once the frame's widgets are laid out.

use eframe::egui;
use recipe_core::{ActionCatalog, DndId, RecipeSession};
use shared::domain::{
    ActionCategory, Cell, CellId, MiniBox, MiniBoxPosition, GRID_SIZE, MAX_MINI_BOXES,
};

use crate::controller::reducer::EditorAction;

const CELL_SIZE: egui::Vec2 = egui::vec2(112.0, 64.0);
const MINI_BOX_SIZE: egui::Vec2 = egui::vec2(58.0, 20.0);
const SLOT_SPACING: f32 = 10.0;

const TILE_FILL: egui::Color32 = egui::Color32::from_rgb(255, 244, 214);
const TILE_STROKE: egui::Color32 = egui::Color32::from_rgb(196, 150, 72);
const MINI_FILL: egui::Color32 = egui::Color32::from_rgb(226, 240, 255);

#[derive(Debug, Clone)]
struct LabelEdit {
    cell: CellId,
    draft: String,
    focus_requested: bool,
}

/// Per-frame widget state the session does not own.
#[derive(Debug, Default)]
pub struct BoardState {
    editing: Option<LabelEdit>,
}

impl BoardState {
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    fn begin_edit(&mut self, cell: CellId, current_label: &str) {
        self.editing = Some(LabelEdit {
            cell,
            draft: current_label.to_string(),
            focus_requested: false,
        });
    }
}

fn palette_tile_frame() -> egui::Frame {
    egui::Frame::NONE
        .fill(TILE_FILL)
        .stroke(egui::Stroke::new(1.0, TILE_STROKE))
        .corner_radius(6.0)
        .inner_margin(egui::Margin::symmetric(8, 4))
}

pub fn show_palette(ui: &mut egui::Ui, catalog: &ActionCatalog) {
    ui.heading("Actions");
    ui.label(egui::RichText::new("Drag an action onto the board").weak());
    ui.add_space(6.0);

    egui::ScrollArea::vertical().show(ui, |ui| {
        for category in ActionCategory::ALL {
            egui::CollapsingHeader::new(category.label())
                .default_open(true)
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for action in catalog.in_category(category) {
                            let id = egui::Id::new(("palette", action.id.as_str()));
                            ui.dnd_drag_source(id, DndId::Action(action.id.clone()), |ui| {
                                palette_tile_frame().show(ui, |ui| {
                                    ui.label(egui::RichText::new(&action.name).color(egui::Color32::BLACK));
                                });
                            });
                        }
                    });
                });
        }
    });
}

pub fn show_grid(
    ui: &mut egui::Ui,
    session: &RecipeSession,
    state: &mut BoardState,
) -> Vec<EditorAction> {
    let mut actions = Vec::new();

    egui::Grid::new("recipe_board")
        .spacing(egui::vec2(SLOT_SPACING, SLOT_SPACING))
        .show(ui, |ui| {
            for row in 0..GRID_SIZE {
                for col in 0..GRID_SIZE {
                    let Some(id) = CellId::new(row, col) else {
                        continue;
                    };
                    let empty = Cell::empty();
                    let cell = session.grid().cell(id).unwrap_or(&empty);
                    show_slot(ui, id, cell, state, &mut actions);
                }
                ui.end_row();
            }
        });

    actions
}

/// One board position: the cell plus room for its top, right and bottom mini-boxes.
/// Mini-box drop zones sit beside the cell's zone, never inside it.
fn show_slot(
    ui: &mut egui::Ui,
    id: CellId,
    cell: &Cell,
    state: &mut BoardState,
    actions: &mut Vec<EditorAction>,
) {
    ui.vertical(|ui| {
        show_mini_box_row(ui, id, cell, MiniBoxPosition::Top, actions);
        ui.horizontal(|ui| {
            show_cell(ui, id, cell, state, actions);
            show_mini_box_row(ui, id, cell, MiniBoxPosition::Right, actions);
        });
        show_mini_box_row(ui, id, cell, MiniBoxPosition::Bottom, actions);
    });
}

fn show_cell(
    ui: &mut egui::Ui,
    id: CellId,
    cell: &Cell,
    state: &mut BoardState,
    actions: &mut Vec<EditorAction>,
) {
    let zone_frame = egui::Frame::group(ui.style()).inner_margin(egui::Margin::same(4));
    let (_, dropped) = ui.dnd_drop_zone::<DndId, _>(zone_frame, |ui| {
        ui.set_min_size(CELL_SIZE);
        ui.set_max_width(CELL_SIZE.x);

        if cell.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(egui::RichText::new("Drop an action").weak().small());
            });
            return;
        }

        let editing_here = state.editing.as_ref().is_some_and(|edit| edit.cell == id);
        if editing_here {
            show_label_editor(ui, id, state, actions);
        } else {
            let drag_id = egui::Id::new(("board", id.to_string()));
            ui.dnd_drag_source(drag_id, DndId::Square(id), |ui| {
                palette_tile_frame().show(ui, |ui| {
                    ui.set_min_width(CELL_SIZE.x - 16.0);
                    ui.label(
                        egui::RichText::new(&cell.current_label)
                            .strong()
                            .color(egui::Color32::BLACK),
                    );
                    if cell.is_renamed() {
                        ui.label(
                            egui::RichText::new(format!("({})", cell.original_label))
                                .small()
                                .italics()
                                .color(egui::Color32::DARK_GRAY),
                        );
                    }
                });
            });
        }

        ui.horizontal(|ui| {
            if ui
                .small_button("✏")
                .on_hover_text("Rename this step")
                .clicked()
            {
                state.begin_edit(id, &cell.current_label);
            }
            let can_add = cell.mini_boxes.len() < MAX_MINI_BOXES;
            if ui
                .add_enabled(can_add, egui::Button::new("+").small())
                .on_hover_text("Add a mini-box")
                .clicked()
            {
                actions.push(EditorAction::AddMiniBox(id));
            }
            if ui
                .small_button("✖")
                .on_hover_text("Clear this cell")
                .clicked()
            {
                actions.push(EditorAction::Clear(id));
            }
        });
    });

    if let Some(source) = dropped {
        actions.push(EditorAction::Drop {
            source: (*source).clone(),
            target: Some(DndId::Square(id)),
        });
    }
}

fn show_label_editor(
    ui: &mut egui::Ui,
    id: CellId,
    state: &mut BoardState,
    actions: &mut Vec<EditorAction>,
) {
    let Some(edit) = state.editing.as_mut() else {
        return;
    };
    let response = ui.add(
        egui::TextEdit::singleline(&mut edit.draft)
            .desired_width(CELL_SIZE.x - 8.0)
            .hint_text("New label"),
    );
    if !edit.focus_requested {
        response.request_focus();
        edit.focus_requested = true;
    }

    if response.lost_focus() {
        let cancelled = ui.input(|i| i.key_pressed(egui::Key::Escape));
        if !cancelled {
            actions.push(EditorAction::Rename {
                cell: id,
                label: edit.draft.clone(),
            });
        }
        state.editing = None;
    }
}

fn show_mini_box_row(
    ui: &mut egui::Ui,
    id: CellId,
    cell: &Cell,
    position: MiniBoxPosition,
    actions: &mut Vec<EditorAction>,
) {
    match cell.mini_box_at(position) {
        Some(mini_box) => show_mini_box(ui, id, mini_box, actions),
        None => {
            let size = if position == MiniBoxPosition::Right {
                egui::vec2(MINI_BOX_SIZE.x, CELL_SIZE.y)
            } else {
                egui::vec2(CELL_SIZE.x, MINI_BOX_SIZE.y)
            };
            ui.allocate_space(size);
        }
    }
}

fn show_mini_box(
    ui: &mut egui::Ui,
    id: CellId,
    mini_box: &MiniBox,
    actions: &mut Vec<EditorAction>,
) {
    let frame = egui::Frame::NONE
        .fill(MINI_FILL)
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(110, 140, 180)))
        .corner_radius(4.0)
        .inner_margin(egui::Margin::symmetric(4, 2));
    let (_, dropped) = ui.dnd_drop_zone::<DndId, _>(frame, |ui| {
        ui.set_min_size(MINI_BOX_SIZE);
        ui.horizontal(|ui| {
            let text = mini_box
                .action
                .as_ref()
                .map(|action| action.name.as_str())
                .unwrap_or("…");
            ui.label(egui::RichText::new(text).small().color(egui::Color32::BLACK));
            if ui
                .small_button("×")
                .on_hover_text(format!("Remove {} mini-box", mini_box.position.label()))
                .clicked()
            {
                actions.push(EditorAction::RemoveMiniBox {
                    cell: id,
                    mini_box: mini_box.id,
                });
            }
        });
    });

    if let Some(source) = dropped {
        actions.push(EditorAction::Drop {
            source: (*source).clone(),
            target: Some(DndId::MiniBox {
                cell: id,
                mini_box: mini_box.id,
            }),
        });
    }
}
