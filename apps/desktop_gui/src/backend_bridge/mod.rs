//! Worker side of the UI: commands in, events out.

pub mod commands;
pub mod runtime;
