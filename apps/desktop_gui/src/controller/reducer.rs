//! Editor actions raised by widgets and the session transitions they cause.

use recipe_core::{route, ActionCatalog, DndId, RecipeSession};
use shared::domain::{CellId, MiniBoxId, RecipeInfo};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    Drop { source: DndId, target: Option<DndId> },
    Rename { cell: CellId, label: String },
    Clear(CellId),
    AddMiniBox(CellId),
    RemoveMiniBox { cell: CellId, mini_box: MiniBoxId },
    DismissRenameNote(CellId),
    SetNotesText(String),
    SetInfo(RecipeInfo),
    Reset,
}

pub fn reduce(session: &RecipeSession, catalog: &ActionCatalog, action: EditorAction) -> RecipeSession {
    match action {
        EditorAction::Drop { source, target } => {
            match route(catalog, &source, target.as_ref()) {
                Some(command) => session.apply_drop(command),
                None => {
                    debug!(%source, "drop did not map to a grid change");
                    session.clone()
                }
            }
        }
        EditorAction::Rename { cell, label } => {
            if label.trim().is_empty() {
                debug!(%cell, "blank label ignored");
                return session.clone();
            }
            session.rename(cell, &label)
        }
        EditorAction::Clear(cell) => session.clear(cell),
        EditorAction::AddMiniBox(cell) => session.add_mini_box(cell),
        EditorAction::RemoveMiniBox { cell, mini_box } => session.remove_mini_box(cell, mini_box),
        EditorAction::DismissRenameNote(cell) => session.forget_rename(cell),
        EditorAction::SetNotesText(text) => session.with_notes_text(text),
        EditorAction::SetInfo(info) => session.with_info(info),
        EditorAction::Reset => RecipeSession::new(),
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::ActionId;

    use super::*;

    fn cell(row: u8, col: u8) -> CellId {
        CellId::new(row, col).expect("cell")
    }

    fn drop_action(id: &str, target: CellId) -> EditorAction {
        EditorAction::Drop {
            source: DndId::Action(ActionId::new(id)),
            target: Some(DndId::Square(target)),
        }
    }

    #[test]
    fn palette_drop_then_rename_writes_a_note_line() {
        let catalog = ActionCatalog::builtin();
        let session = reduce(&RecipeSession::new(), &catalog, drop_action("boil-water", cell(0, 0)));
        let session = reduce(
            &session,
            &catalog,
            EditorAction::Rename {
                cell: cell(0, 0),
                label: "Simmer".to_string(),
            },
        );
        assert_eq!(
            session.grid().cell(cell(0, 0)).expect("cell").current_label,
            "Simmer"
        );
        assert_eq!(session.notes().generated_lines(), vec!["Boil Water --> (Simmer)"]);

        let session = reduce(&session, &catalog, EditorAction::DismissRenameNote(cell(0, 0)));
        assert!(session.notes().generated_lines().is_empty());
        assert_eq!(
            session.grid().cell(cell(0, 0)).expect("cell").current_label,
            "Simmer"
        );
    }

    #[test]
    fn rename_keeps_the_label_exactly_as_typed() {
        let catalog = ActionCatalog::builtin();
        let session = reduce(&RecipeSession::new(), &catalog, drop_action("boil-water", cell(0, 0)));
        let session = reduce(
            &session,
            &catalog,
            EditorAction::Rename {
                cell: cell(0, 0),
                label: "  Simmer ".to_string(),
            },
        );
        assert_eq!(
            session.grid().cell(cell(0, 0)).expect("cell").current_label,
            "  Simmer "
        );
        assert_eq!(session.notes().generated_lines(), vec!["Boil Water --> (  Simmer )"]);
    }

    #[test]
    fn blank_rename_and_dead_drops_leave_the_session_alone() {
        let catalog = ActionCatalog::builtin();
        let session = reduce(&RecipeSession::new(), &catalog, drop_action("chop", cell(1, 1)));

        let renamed = reduce(
            &session,
            &catalog,
            EditorAction::Rename {
                cell: cell(1, 1),
                label: "   ".to_string(),
            },
        );
        assert_eq!(renamed, session);

        let dropped_nowhere = reduce(
            &session,
            &catalog,
            EditorAction::Drop {
                source: DndId::Square(cell(1, 1)),
                target: None,
            },
        );
        assert_eq!(dropped_nowhere, session);
    }

    #[test]
    fn reset_starts_a_blank_recipe() {
        let catalog = ActionCatalog::builtin();
        let session = reduce(&RecipeSession::new(), &catalog, drop_action("stir", cell(2, 2)));
        assert!(!session.is_blank());
        assert!(reduce(&session, &catalog, EditorAction::Reset).is_blank());
    }
}
