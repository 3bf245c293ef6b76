use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

pub const GRID_SIZE: u8 = 5;
pub const MAX_MINI_BOXES: usize = 3;

const CELL_ID_PREFIX: &str = "square-";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} id '{input}'")]
pub struct IdParseError {
    pub kind: &'static str,
    pub input: String,
}

impl IdParseError {
    pub fn new(kind: &'static str, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
        }
    }
}

/// Position of a cell on the recipe grid. Only in-bounds ids can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    row: u8,
    col: u8,
}

impl CellId {
    pub fn new(row: u8, col: u8) -> Option<Self> {
        (row < GRID_SIZE && col < GRID_SIZE).then_some(Self { row, col })
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    /// All cells in row-major order.
    pub fn all() -> impl Iterator<Item = CellId> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| CellId { row, col }))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CELL_ID_PREFIX}{}-{}", self.row, self.col)
    }
}

impl FromStr for CellId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || IdParseError::new("cell", s);
        let rest = s.strip_prefix(CELL_ID_PREFIX).ok_or_else(err)?;
        let (row, col) = rest.split_once('-').ok_or_else(err)?;
        let row = row.parse::<u8>().map_err(|_| err())?;
        let col = col.parse::<u8>().map_err(|_| err())?;
        CellId::new(row, col).ok_or_else(err)
    }
}

impl Serialize for CellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MiniBoxId(pub Uuid);

impl MiniBoxId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MiniBoxId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MiniBoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for MiniBoxId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| IdParseError::new("mini-box", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Prep,
    Heat,
    Combine,
    Finish,
}

impl ActionCategory {
    pub const ALL: [ActionCategory; 4] = [
        ActionCategory::Prep,
        ActionCategory::Heat,
        ActionCategory::Combine,
        ActionCategory::Finish,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ActionCategory::Prep => "Prep",
            ActionCategory::Heat => "Heat",
            ActionCategory::Combine => "Combine",
            ActionCategory::Finish => "Finish",
        }
    }
}

/// A recipe step that can be dropped onto a cell or mini-box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub name: String,
    pub category: ActionCategory,
}

impl Action {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: ActionCategory) -> Self {
        Self {
            id: ActionId::new(id),
            name: name.into(),
            category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiniBoxPosition {
    Right,
    Top,
    Bottom,
}

impl MiniBoxPosition {
    /// Order in which free positions are handed out.
    pub const PRIORITY: [MiniBoxPosition; 3] = [
        MiniBoxPosition::Right,
        MiniBoxPosition::Top,
        MiniBoxPosition::Bottom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MiniBoxPosition::Right => "right",
            MiniBoxPosition::Top => "top",
            MiniBoxPosition::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniBox {
    pub id: MiniBoxId,
    pub action: Option<Action>,
    pub position: MiniBoxPosition,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub action: Option<Action>,
    pub original_label: String,
    pub current_label: String,
    pub mini_boxes: Vec<MiniBox>,
}

impl Cell {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn placed(action: Action) -> Self {
        Self {
            original_label: action.name.clone(),
            current_label: action.name.clone(),
            action: Some(action),
            mini_boxes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.action.is_none()
    }

    pub fn is_renamed(&self) -> bool {
        !self.original_label.is_empty() && self.original_label != self.current_label
    }

    pub fn mini_box(&self, id: MiniBoxId) -> Option<&MiniBox> {
        self.mini_boxes.iter().find(|mini_box| mini_box.id == id)
    }

    pub fn mini_box_at(&self, position: MiniBoxPosition) -> Option<&MiniBox> {
        self.mini_boxes
            .iter()
            .find(|mini_box| mini_box.position == position)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInfo {
    pub name: String,
    pub author: String,
    pub cook_time: String,
    pub date: String,
}

impl RecipeInfo {
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            "Untitled recipe"
        } else {
            name
        }
    }
}

/// Frozen copy of a session handed to the document renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSnapshot {
    pub info: RecipeInfo,
    pub cells: BTreeMap<CellId, Cell>,
    pub notes: String,
    pub captured_at: DateTime<Utc>,
}

impl RecipeSnapshot {
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn placed_cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(id, cell)| (*id, cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_id_round_trips_through_text() {
        let id = CellId::new(3, 4).expect("in bounds");
        assert_eq!(id.to_string(), "square-3-4");
        assert_eq!("square-3-4".parse::<CellId>(), Ok(id));
    }

    #[test]
    fn cell_id_rejects_out_of_bounds_and_garbage() {
        assert!(CellId::new(5, 0).is_none());
        assert!("square-5-0".parse::<CellId>().is_err());
        assert!("square-1".parse::<CellId>().is_err());
        assert!("cell-1-1".parse::<CellId>().is_err());
        assert!("square-a-1".parse::<CellId>().is_err());
    }

    #[test]
    fn all_cells_cover_the_grid_in_row_major_order() {
        let ids: Vec<_> = CellId::all().collect();
        assert_eq!(ids.len(), 25);
        assert_eq!(ids[0].to_string(), "square-0-0");
        assert_eq!(ids[6].to_string(), "square-1-1");
        assert_eq!(ids[24].to_string(), "square-4-4");
    }

    #[test]
    fn placed_cell_starts_unrenamed() {
        let cell = Cell::placed(Action::new("boil", "Boil Water", ActionCategory::Heat));
        assert_eq!(cell.original_label, "Boil Water");
        assert_eq!(cell.current_label, "Boil Water");
        assert!(!cell.is_renamed());
        assert!(!Cell::empty().is_renamed());
    }

    #[test]
    fn snapshot_serializes_cells_keyed_by_text_id() {
        let mut cells = BTreeMap::new();
        let id = CellId::new(0, 1).expect("in bounds");
        cells.insert(id, Cell::placed(Action::new("chop", "Chop", ActionCategory::Prep)));
        let snapshot = RecipeSnapshot {
            info: RecipeInfo::default(),
            cells,
            notes: String::new(),
            captured_at: Utc::now(),
        };

        let json = serde_json::to_value(&snapshot).expect("json");
        assert!(json["cells"].get("square-0-1").is_some());

        let back: RecipeSnapshot = serde_json::from_value(json).expect("decode");
        assert_eq!(back, snapshot);
    }
}
