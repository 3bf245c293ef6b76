use chrono::Utc;
use shared::domain::{Action, Cell, CellId, MiniBoxId, RecipeInfo, RecipeSnapshot};
use tracing::debug;

use crate::{dnd::DropCommand, grid::Grid, notes::NotesBlob};

/// Everything a user edits in one sitting. Updates return a new session and
/// keep the notes in step with cell labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeSession {
    info: RecipeInfo,
    grid: Grid,
    notes: NotesBlob,
}

impl RecipeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self) -> &RecipeInfo {
        &self.info
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn notes(&self) -> &NotesBlob {
        &self.notes
    }

    pub fn with_info(&self, info: RecipeInfo) -> Self {
        Self {
            info,
            ..self.clone()
        }
    }

    pub fn with_notes_text(&self, text: impl Into<String>) -> Self {
        Self {
            notes: self.notes.with_text(text),
            ..self.clone()
        }
    }

    /// Places `action` on a cell, replacing whatever it held.
    pub fn assign(&self, cell: CellId, action: Action) -> Self {
        let grid = self.grid.assign(cell, action);
        let notes = if self.was_renamed(cell) && grid != self.grid {
            self.notes.forget(cell)
        } else {
            self.notes.clone()
        };
        self.next(grid, notes)
    }

    pub fn move_cell(&self, source: CellId, target: CellId) -> Self {
        let grid = self.grid.move_cell(source, target);
        if grid == self.grid {
            return self.clone();
        }
        let notes = self.notes.move_entry(source, target);
        self.next(grid, notes)
    }

    pub fn clear(&self, cell: CellId) -> Self {
        let grid = self.grid.clear(cell);
        if grid == self.grid {
            return self.clone();
        }
        let notes = if self.was_renamed(cell) {
            self.notes.forget(cell)
        } else {
            debug!(cell = %cell, "cleared cell was never renamed; notes unchanged");
            self.notes.clone()
        };
        self.next(grid, notes)
    }

    pub fn rename(&self, cell: CellId, new_label: &str) -> Self {
        let grid = self.grid.rename(cell, new_label);
        if grid == self.grid {
            return self.clone();
        }
        let original_label = self
            .grid
            .cell(cell)
            .map(|existing| existing.original_label.as_str())
            .unwrap_or_default();
        let notes = self.notes.record_rename(cell, original_label, new_label);
        self.next(grid, notes)
    }

    pub fn add_mini_box(&self, cell: CellId) -> Self {
        self.with_grid(self.grid.add_mini_box(cell))
    }

    pub fn remove_mini_box(&self, cell: CellId, mini_box: MiniBoxId) -> Self {
        self.with_grid(self.grid.remove_mini_box(cell, mini_box))
    }

    pub fn assign_mini_box(&self, cell: CellId, mini_box: MiniBoxId, action: Action) -> Self {
        self.with_grid(self.grid.assign_mini_box(cell, mini_box, action))
    }

    /// Removes a cell's generated notes line without touching its label.
    pub fn forget_rename(&self, cell: CellId) -> Self {
        Self {
            notes: self.notes.forget(cell),
            ..self.clone()
        }
    }

    pub fn apply_drop(&self, command: DropCommand) -> Self {
        match command {
            DropCommand::AssignAction { cell, action } => self.assign(cell, action),
            DropCommand::MoveCell { source, target } => self.move_cell(source, target),
            DropCommand::AssignMiniBox {
                cell,
                mini_box,
                action,
            } => self.assign_mini_box(cell, mini_box, action),
        }
    }

    /// Frozen copy for rendering; notes are flattened to text.
    pub fn snapshot(&self) -> RecipeSnapshot {
        RecipeSnapshot {
            info: self.info.clone(),
            cells: self.grid.cells().clone(),
            notes: self.notes.render(),
            captured_at: Utc::now(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.grid.placed_count() == 0 && self.notes.is_blank() && self.info == RecipeInfo::default()
    }

    fn was_renamed(&self, cell: CellId) -> bool {
        self.grid.cell(cell).is_some_and(Cell::is_renamed)
    }

    fn with_grid(&self, grid: Grid) -> Self {
        Self {
            grid,
            ..self.clone()
        }
    }

    fn next(&self, grid: Grid, notes: NotesBlob) -> Self {
        Self {
            info: self.info.clone(),
            grid,
            notes,
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
