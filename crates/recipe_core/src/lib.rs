pub mod catalog;
pub mod dnd;
pub mod export;
pub mod grid;
pub mod notes;
pub mod session;
pub mod upload;

pub use catalog::ActionCatalog;
pub use dnd::{route, route_text, DndId, DropCommand};
pub use export::{
    DocumentRenderer, ExportError, ExportPipeline, ExportReceipt, ExportState, ObjectUploader,
    RenderError,
};
pub use grid::{Grid, GridError};
pub use notes::{rename_line, NotesBlob, RenameNote};
pub use session::RecipeSession;
pub use upload::HttpObjectUploader;
