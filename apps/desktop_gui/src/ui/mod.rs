//! UI layer for desktop GUI: app shell, recipe board, and dialogs.

pub mod app;
pub mod board;
pub mod dialogs;

pub use app::{DesktopGuiApp, PersistedDesktopSettings, StartupConfig, SETTINGS_STORAGE_KEY};
