//! UI/backend events and error modeling for desktop GUI controller.

use std::path::PathBuf;

use recipe_core::ExportState;

pub enum UiEvent {
    Info(String),
    ExportStateChanged(ExportState),
    PdfSaved(PathBuf),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Rejected,
    Render,
    Io,
    Unknown,
}

impl UiErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            UiErrorCategory::Transport => "Connection",
            UiErrorCategory::Rejected => "Rejected",
            UiErrorCategory::Render => "PDF",
            UiErrorCategory::Io => "File",
            UiErrorCategory::Unknown => "Unexpected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Export,
    SavePdf,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("failed to reach")
            || message_lower.contains("connection")
            || message_lower.contains("timed out")
            || message_lower.contains("timeout")
            || message_lower.contains("dns")
            || message_lower.contains("network")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("rejected")
            || message_lower.contains("(400")
            || message_lower.contains("(409")
            || message_lower.contains("(413")
            || message_lower.contains("already exists")
        {
            UiErrorCategory::Rejected
        } else if message_lower.contains("generate pdf")
            || message_lower.contains("render")
            || message_lower.contains("font")
        {
            UiErrorCategory::Render
        } else if message_lower.contains("permission denied")
            || message_lower.contains("no such file")
            || message_lower.contains("failed to write")
            || message_lower.contains("read-only")
        {
            UiErrorCategory::Io
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// One-line banner text, e.g. `Connection error: ...`.
    pub fn banner_text(&self) -> String {
        format!("{} error: {}", self.category.label(), self.message)
    }
}
