use super::*;
use crate::{catalog::ActionCatalog, dnd::route_text};
use shared::domain::{ActionCategory, ActionId};

fn cell(row: u8, col: u8) -> CellId {
    CellId::new(row, col).expect("cell in bounds")
}

fn action(id: &str) -> Action {
    ActionCatalog::builtin()
        .find(&ActionId::new(id))
        .cloned()
        .expect("builtin action")
}

#[test]
fn boil_water_rename_round_trip() {
    let session = RecipeSession::new()
        .with_notes_text("Serves four")
        .assign(cell(0, 0), action("boil-water"));
    let placed = session.grid().cell(cell(0, 0)).expect("cell");
    assert_eq!(placed.original_label, "Boil Water");
    assert_eq!(placed.current_label, "Boil Water");
    let before = session.notes().render();

    let renamed = session.rename(cell(0, 0), "Simmer");
    assert_eq!(
        renamed.notes().render(),
        "Serves four\nBoil Water --> (Simmer)"
    );

    let restored = renamed.rename(cell(0, 0), "Boil Water");
    assert_eq!(restored.notes().render(), before);
}

#[test]
fn clearing_a_renamed_cell_removes_its_line() {
    let session = RecipeSession::new()
        .with_notes_text("keep me")
        .assign(cell(1, 1), action("chop"))
        .rename(cell(1, 1), "Mince")
        .clear(cell(1, 1));
    assert_eq!(session.notes().render(), "keep me");
    assert!(session.grid().cell(cell(1, 1)).expect("cell").is_empty());
}

#[test]
fn clearing_an_unrenamed_cell_leaves_notes_unchanged() {
    let session = RecipeSession::new()
        .with_notes_text("a\n\nb")
        .assign(cell(0, 0), action("boil-water"))
        .assign(cell(2, 2), action("bake"))
        .rename(cell(0, 0), "Simmer");
    let cleared = session.clear(cell(2, 2));
    assert_eq!(cleared.notes(), session.notes());
}

#[test]
fn renames_on_many_cells_keep_one_line_each() {
    let mut session = RecipeSession::new()
        .assign(cell(0, 0), action("boil-water"))
        .assign(cell(0, 1), action("chop"));
    for (first, second) in [("Simmer", "Dice"), ("Blanch", "Mince"), ("Poach", "Slice")] {
        session = session.rename(cell(0, 0), first).rename(cell(0, 1), second);
        let rendered = session.notes().render();
        assert_eq!(rendered.lines().filter(|l| l.starts_with("Boil Water")).count(), 1);
        assert_eq!(rendered.lines().filter(|l| l.starts_with("Chop")).count(), 1);
    }
}

#[test]
fn moving_a_renamed_cell_carries_its_note() {
    let session = RecipeSession::new()
        .assign(cell(0, 0), action("boil-water"))
        .rename(cell(0, 0), "Simmer")
        .move_cell(cell(0, 0), cell(4, 4));

    let moved = session.grid().cell(cell(4, 4)).expect("cell");
    assert_eq!(moved.original_label, "Boil Water");
    assert_eq!(moved.current_label, "Simmer");
    assert_eq!(session.notes().render(), "Boil Water --> (Simmer)");

    let cleared = session.clear(cell(4, 4));
    assert_eq!(cleared.notes().render(), "");
}

#[test]
fn overwriting_a_renamed_cell_drops_its_note() {
    let session = RecipeSession::new()
        .assign(cell(0, 0), action("boil-water"))
        .rename(cell(0, 0), "Simmer")
        .assign(cell(0, 0), action("bake"));
    assert_eq!(session.notes().render(), "");
}

#[test]
fn rename_of_empty_cell_is_ignored() {
    let session = RecipeSession::new().with_notes_text("x");
    assert_eq!(session.rename(cell(3, 3), "Ghost"), session);
}

#[test]
fn drop_commands_are_applied() {
    let catalog = ActionCatalog::builtin();
    let mut session = RecipeSession::new();

    let assign = route_text(&catalog, "action-stir", Some("square-2-2")).expect("assign");
    session = session.apply_drop(assign).add_mini_box(cell(2, 2));
    let mini_box = session.grid().cell(cell(2, 2)).expect("cell").mini_boxes[0].id;

    let target = format!("minibox-2-2-{mini_box}");
    let fill = route_text(&catalog, "action-season", Some(&target)).expect("mini-box");
    session = session.apply_drop(fill);

    let relocate = route_text(&catalog, "square-2-2", Some("square-0-4")).expect("move");
    session = session.apply_drop(relocate);

    let placed = session.grid().cell(cell(0, 4)).expect("cell");
    assert_eq!(placed.current_label, "Stir");
    assert_eq!(
        placed.mini_boxes[0].action.as_ref().map(|a| a.name.as_str()),
        Some("Season")
    );
    assert!(session.grid().cell(cell(2, 2)).expect("cell").is_empty());
}

#[test]
fn forget_rename_keeps_the_label() {
    let session = RecipeSession::new()
        .assign(cell(0, 0), action("boil-water"))
        .rename(cell(0, 0), "Simmer")
        .forget_rename(cell(0, 0));
    assert_eq!(session.notes().render(), "");
    assert_eq!(
        session.grid().cell(cell(0, 0)).expect("cell").current_label,
        "Simmer"
    );
}

#[test]
fn snapshot_captures_info_grid_and_rendered_notes() {
    let info = RecipeInfo {
        name: "Pasta".to_string(),
        author: "Sam".to_string(),
        cook_time: "20 min".to_string(),
        date: "2026-10-18".to_string(),
    };
    let session = RecipeSession::new()
        .with_info(info.clone())
        .with_notes_text("al dente")
        .assign(cell(0, 0), Action::new("boil", "Boil Water", ActionCategory::Heat))
        .rename(cell(0, 0), "Simmer");

    let snapshot = session.snapshot();
    assert_eq!(snapshot.info, info);
    assert_eq!(snapshot.cells.len(), 25);
    assert_eq!(snapshot.placed_cells().count(), 1);
    assert_eq!(snapshot.notes, "al dente\nBoil Water --> (Simmer)");
}

#[test]
fn blank_session_detection() {
    assert!(RecipeSession::new().is_blank());
    assert!(!RecipeSession::new().with_notes_text("hi").is_blank());
    assert!(!RecipeSession::new()
        .assign(cell(0, 0), action("chop"))
        .is_blank());
}
