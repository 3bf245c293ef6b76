//! The 5×5 grid of cells. Every operation borrows the current grid and returns
//! the next one; rejected mutations hand back an unchanged copy.

use std::collections::BTreeMap;

use shared::domain::{
    Action, Cell, CellId, MiniBox, MiniBoxId, MiniBoxPosition, MAX_MINI_BOXES,
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell {0} does not exist")]
    UnknownCell(CellId),
    #[error("mini-box {mini_box} not found in cell {cell}")]
    UnknownMiniBox { cell: CellId, mini_box: MiniBoxId },
    #[error("cell {0} has no action")]
    EmptyCell(CellId),
    #[error("cell {0} already holds {MAX_MINI_BOXES} mini-boxes")]
    MiniBoxesFull(CellId),
    #[error("nothing to change")]
    Unchanged,
}

impl GridError {
    /// Dangling references are worth a warning; the rest are routine no-ops.
    fn is_anomaly(&self) -> bool {
        matches!(
            self,
            GridError::UnknownCell(_) | GridError::UnknownMiniBox { .. } | GridError::EmptyCell(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: BTreeMap<CellId, Cell>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            cells: CellId::all().map(|id| (id, Cell::empty())).collect(),
        }
    }
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a grid from stored cells; positions missing from `cells` start empty.
    pub fn from_cells(cells: BTreeMap<CellId, Cell>) -> Self {
        let mut grid = Self::default();
        for (id, cell) in cells {
            grid.cells.insert(id, cell);
        }
        grid
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn cells(&self) -> &BTreeMap<CellId, Cell> {
        &self.cells
    }

    pub fn placed_count(&self) -> usize {
        self.cells.values().filter(|cell| !cell.is_empty()).count()
    }

    pub fn assign(&self, id: CellId, action: Action) -> Grid {
        self.update("assign", id, |cell| {
            *cell = Cell::placed(action);
            Ok(())
        })
    }

    pub fn move_cell(&self, source: CellId, target: CellId) -> Grid {
        self.try_move(source, target)
            .unwrap_or_else(|err| self.rejected("move", source, err))
    }

    pub fn clear(&self, id: CellId) -> Grid {
        self.update("clear", id, |cell| {
            if *cell == Cell::empty() {
                return Err(GridError::EmptyCell(id));
            }
            *cell = Cell::empty();
            Ok(())
        })
    }

    pub fn add_mini_box(&self, id: CellId) -> Grid {
        self.update("add_mini_box", id, |cell| {
            if cell.is_empty() {
                return Err(GridError::EmptyCell(id));
            }
            if cell.mini_boxes.len() >= MAX_MINI_BOXES {
                return Err(GridError::MiniBoxesFull(id));
            }
            let position = MiniBoxPosition::PRIORITY
                .into_iter()
                .find(|position| cell.mini_box_at(*position).is_none())
                .ok_or(GridError::MiniBoxesFull(id))?;
            cell.mini_boxes.push(MiniBox {
                id: MiniBoxId::new(),
                action: None,
                position,
            });
            Ok(())
        })
    }

    pub fn remove_mini_box(&self, id: CellId, mini_box: MiniBoxId) -> Grid {
        self.update("remove_mini_box", id, |cell| {
            let before = cell.mini_boxes.len();
            cell.mini_boxes.retain(|existing| existing.id != mini_box);
            if cell.mini_boxes.len() == before {
                return Err(GridError::Unchanged);
            }
            Ok(())
        })
    }

    pub fn assign_mini_box(&self, id: CellId, mini_box: MiniBoxId, action: Action) -> Grid {
        self.update("assign_mini_box", id, |cell| {
            if cell.is_empty() {
                return Err(GridError::EmptyCell(id));
            }
            let slot = cell
                .mini_boxes
                .iter_mut()
                .find(|existing| existing.id == mini_box)
                .ok_or(GridError::UnknownMiniBox { cell: id, mini_box })?;
            slot.action = Some(action);
            Ok(())
        })
    }

    pub fn rename(&self, id: CellId, new_label: &str) -> Grid {
        self.update("rename", id, |cell| {
            if cell.is_empty() {
                return Err(GridError::EmptyCell(id));
            }
            if cell.current_label == new_label {
                return Err(GridError::Unchanged);
            }
            cell.current_label = new_label.to_string();
            Ok(())
        })
    }

    fn try_move(&self, source: CellId, target: CellId) -> Result<Grid, GridError> {
        if source == target {
            return Err(GridError::Unchanged);
        }
        let moved = self
            .cells
            .get(&source)
            .ok_or(GridError::UnknownCell(source))?;
        if moved.is_empty() {
            return Err(GridError::EmptyCell(source));
        }
        if !self.cells.contains_key(&target) {
            return Err(GridError::UnknownCell(target));
        }

        let mut next = self.clone();
        next.cells.insert(target, moved.clone());
        next.cells.insert(source, Cell::empty());
        Ok(next)
    }

    fn update(
        &self,
        op: &'static str,
        id: CellId,
        apply: impl FnOnce(&mut Cell) -> Result<(), GridError>,
    ) -> Grid {
        let mut next = self.clone();
        let outcome = match next.cells.get_mut(&id) {
            Some(cell) => apply(cell),
            None => Err(GridError::UnknownCell(id)),
        };
        match outcome {
            Ok(()) => next,
            Err(err) => self.rejected(op, id, err),
        }
    }

    fn rejected(&self, op: &'static str, id: CellId, err: GridError) -> Grid {
        if err.is_anomaly() {
            warn!(op, cell = %id, %err, "grid mutation rejected; state unchanged");
        } else {
            debug!(op, cell = %id, %err, "grid mutation skipped");
        }
        self.clone()
    }
}

#[cfg(test)]
#[path = "tests/grid_tests.rs"]
mod tests;
