//! Backend commands queued from UI to backend worker.

use shared::domain::RecipeSnapshot;
use std::path::PathBuf;

pub enum BackendCommand {
    Export { snapshot: RecipeSnapshot },
    SavePdf {
        snapshot: RecipeSnapshot,
        path: PathBuf,
    },
    ResetExport,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Export { .. } => "export",
            BackendCommand::SavePdf { .. } => "save_pdf",
            BackendCommand::ResetExport => "reset_export",
        }
    }
}
