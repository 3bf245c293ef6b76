use shared::domain::{Action, ActionCategory, ActionId};

const BUILTIN_ACTIONS: &[(&str, &str, ActionCategory)] = &[
    ("wash", "Wash", ActionCategory::Prep),
    ("peel", "Peel", ActionCategory::Prep),
    ("chop", "Chop", ActionCategory::Prep),
    ("dice", "Dice", ActionCategory::Prep),
    ("slice", "Slice", ActionCategory::Prep),
    ("grate", "Grate", ActionCategory::Prep),
    ("measure", "Measure", ActionCategory::Prep),
    ("marinate", "Marinate", ActionCategory::Prep),
    ("boil-water", "Boil Water", ActionCategory::Heat),
    ("simmer", "Simmer", ActionCategory::Heat),
    ("fry", "Fry", ActionCategory::Heat),
    ("saute", "Sauté", ActionCategory::Heat),
    ("bake", "Bake", ActionCategory::Heat),
    ("roast", "Roast", ActionCategory::Heat),
    ("grill", "Grill", ActionCategory::Heat),
    ("steam", "Steam", ActionCategory::Heat),
    ("mix", "Mix", ActionCategory::Combine),
    ("stir", "Stir", ActionCategory::Combine),
    ("whisk", "Whisk", ActionCategory::Combine),
    ("knead", "Knead", ActionCategory::Combine),
    ("fold", "Fold", ActionCategory::Combine),
    ("blend", "Blend", ActionCategory::Combine),
    ("season", "Season", ActionCategory::Finish),
    ("rest", "Rest", ActionCategory::Finish),
    ("garnish", "Garnish", ActionCategory::Finish),
    ("plate", "Plate", ActionCategory::Finish),
    ("serve", "Serve", ActionCategory::Finish),
];

/// The palette of actions a user can drag onto the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCatalog {
    actions: Vec<Action>,
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ActionCatalog {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_ACTIONS
                .iter()
                .map(|(id, name, category)| Action::new(*id, *name, *category))
                .collect(),
        )
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn find(&self, id: &ActionId) -> Option<&Action> {
        self.actions.iter().find(|action| &action.id == id)
    }

    pub fn in_category(&self, category: ActionCategory) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(move |action| action.category == category)
    }
}
