//! Drag-and-drop identifiers and routing of completed drags to grid commands.

use std::{fmt, str::FromStr};

use shared::domain::{Action, ActionId, CellId, IdParseError, MiniBoxId};
use tracing::debug;

use crate::catalog::ActionCatalog;

const ACTION_PREFIX: &str = "action-";
const SQUARE_PREFIX: &str = "square-";
const MINI_BOX_PREFIX: &str = "minibox-";

/// Anything that can be dragged or dropped onto.
///
/// Text form: `action-<id>`, `square-<row>-<col>`, `minibox-<row>-<col>-<uuid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DndId {
    Action(ActionId),
    Square(CellId),
    MiniBox { cell: CellId, mini_box: MiniBoxId },
}

impl fmt::Display for DndId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DndId::Action(id) => write!(f, "{ACTION_PREFIX}{id}"),
            DndId::Square(cell) => write!(f, "{cell}"),
            DndId::MiniBox { cell, mini_box } => write!(
                f,
                "{MINI_BOX_PREFIX}{}-{}-{mini_box}",
                cell.row(),
                cell.col()
            ),
        }
    }
}

impl FromStr for DndId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || IdParseError::new("drag", s);

        if let Some(action) = s.strip_prefix(ACTION_PREFIX) {
            if action.is_empty() {
                return Err(err());
            }
            return Ok(DndId::Action(ActionId::new(action)));
        }

        if s.starts_with(SQUARE_PREFIX) {
            return s.parse().map(DndId::Square).map_err(|_| err());
        }

        if let Some(rest) = s.strip_prefix(MINI_BOX_PREFIX) {
            let mut parts = rest.splitn(3, '-');
            let (Some(row), Some(col), Some(mini_box)) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(err());
            };
            let row = row.parse::<u8>().map_err(|_| err())?;
            let col = col.parse::<u8>().map_err(|_| err())?;
            let cell = CellId::new(row, col).ok_or_else(err)?;
            let mini_box = mini_box.parse().map_err(|_| err())?;
            return Ok(DndId::MiniBox { cell, mini_box });
        }

        Err(err())
    }
}

/// Grid mutation resulting from a completed drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropCommand {
    AssignAction {
        cell: CellId,
        action: Action,
    },
    MoveCell {
        source: CellId,
        target: CellId,
    },
    AssignMiniBox {
        cell: CellId,
        mini_box: MiniBoxId,
        action: Action,
    },
}

/// Classifies a finished drag. Returns `None` for every combination that is
/// not palette→cell, cell→cell or palette→mini-box, and for drops that land
/// nowhere or on the dragged item itself.
pub fn route(catalog: &ActionCatalog, source: &DndId, target: Option<&DndId>) -> Option<DropCommand> {
    let target = target?;
    if source == target {
        return None;
    }

    let command = match (source, target) {
        (DndId::Action(action), DndId::Square(cell)) => DropCommand::AssignAction {
            cell: *cell,
            action: lookup(catalog, action)?,
        },
        (DndId::Square(source), DndId::Square(target)) => DropCommand::MoveCell {
            source: *source,
            target: *target,
        },
        (DndId::Action(action), DndId::MiniBox { cell, mini_box }) => DropCommand::AssignMiniBox {
            cell: *cell,
            mini_box: *mini_box,
            action: lookup(catalog, action)?,
        },
        _ => {
            debug!(%source, %target, "unsupported drop combination ignored");
            return None;
        }
    };
    Some(command)
}

/// Same as [`route`] for the text form of the identifiers. Malformed ids are
/// ignored.
pub fn route_text(catalog: &ActionCatalog, source: &str, target: Option<&str>) -> Option<DropCommand> {
    let parse = |raw: &str| match raw.parse::<DndId>() {
        Ok(id) => Some(id),
        Err(err) => {
            debug!(%err, "malformed drag id ignored");
            None
        }
    };
    let source = parse(source)?;
    let target = match target {
        Some(raw) => Some(parse(raw)?),
        None => None,
    };
    route(catalog, &source, target.as_ref())
}

fn lookup(catalog: &ActionCatalog, id: &ActionId) -> Option<Action> {
    let action = catalog.find(id).cloned();
    if action.is_none() {
        debug!(action = %id, "drop references an unknown action");
    }
    action
}
