//! Notes attached to a recipe.
//!
//! The user owns the freeform text. Renamed cells are tracked separately, one
//! entry per cell, and only turned into `<original> --> (<current>)` lines when
//! the notes are rendered for display or export. The only freeform lines a label
//! change touches are copies of the line the cell is giving up, since those
//! stood in for the generated line while it was active.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared::domain::CellId;
use tracing::debug;

/// Separator between the original and the current label in a generated line.
pub const RENAME_ARROW: &str = " --> (";

pub fn rename_line(original_label: &str, current_label: &str) -> String {
    format!("{original_label}{RENAME_ARROW}{current_label})")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameNote {
    pub cell: CellId,
    pub original_label: String,
    pub current_label: String,
}

impl RenameNote {
    pub fn line(&self) -> String {
        rename_line(&self.original_label, &self.current_label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesBlob {
    text: String,
    renames: Vec<RenameNote>,
}

impl NotesBlob {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            renames: Vec::new(),
        }
    }

    /// Freeform text exactly as the user typed it.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Rename entries, oldest first.
    pub fn renames(&self) -> &[RenameNote] {
        &self.renames
    }

    pub fn rename_for(&self, cell: CellId) -> Option<&RenameNote> {
        self.renames.iter().find(|note| note.cell == cell)
    }

    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            renames: self.renames.clone(),
        }
    }

    /// Records that `cell` now shows `current_label`. The cell's previous line is
    /// dropped and the new one goes last; renaming back to the original label
    /// leaves no line at all.
    pub fn record_rename(&self, cell: CellId, original_label: &str, current_label: &str) -> Self {
        if original_label.is_empty() {
            debug!(cell = %cell, "cell has no original label; notes unchanged");
            return self.clone();
        }

        let line = rename_line(original_label, current_label);
        if self.rename_for(cell).is_some_and(|note| note.line() == line) {
            return self.clone();
        }

        let mut next = self.forget(cell);
        if current_label != original_label {
            next.renames.push(RenameNote {
                cell,
                original_label: original_label.to_string(),
                current_label: current_label.to_string(),
            });
        }
        next
    }

    /// Drops the rename entry for `cell`, if any, together with freeform copies
    /// of its line.
    pub fn forget(&self, cell: CellId) -> Self {
        let mut next = self.clone();
        next.drop_entry(cell);
        next
    }

    /// Follows a cell's contents to a new position. Whatever `target` tracked
    /// before was overwritten along with the cell.
    pub fn move_entry(&self, source: CellId, target: CellId) -> Self {
        if source == target {
            return self.clone();
        }
        let mut next = self.clone();
        next.drop_entry(target);
        for note in next.renames.iter_mut().filter(|note| note.cell == source) {
            note.cell = target;
        }
        next
    }

    /// Generated lines in the order they were recorded, without repeating a
    /// line that is already present in the freeform text or earlier in the list.
    pub fn generated_lines(&self) -> Vec<String> {
        let freeform: HashSet<&str> = self.text.lines().map(str::trim).collect();
        let mut seen = HashSet::new();
        self.renames
            .iter()
            .map(RenameNote::line)
            .filter(|line| !freeform.contains(line.as_str()) && seen.insert(line.clone()))
            .collect()
    }

    /// Freeform text followed by the generated lines, one per line.
    pub fn render(&self) -> String {
        let mut rendered = self.text.trim_end().to_string();
        for line in self.generated_lines() {
            if !rendered.is_empty() {
                rendered.push('\n');
            }
            rendered.push_str(&line);
        }
        rendered
    }

    pub fn is_blank(&self) -> bool {
        self.render().trim().is_empty()
    }

    fn drop_entry(&mut self, cell: CellId) {
        let Some(index) = self.renames.iter().position(|note| note.cell == cell) else {
            return;
        };
        let line = self.renames.remove(index).line();
        // Another cell may still render the same line.
        if self.renames.iter().any(|note| note.line() == line) {
            return;
        }
        if self.text.lines().any(|existing| existing.trim() == line) {
            debug!(cell = %cell, "removing freeform copy of an outdated rename line");
            self.text = self
                .text
                .lines()
                .filter(|existing| existing.trim() != line)
                .collect::<Vec<_>>()
                .join("\n");
        }
    }
}

#[cfg(test)]
#[path = "tests/notes_tests.rs"]
mod tests;
