//! CLI surface: argument definitions and command implementations

mod app;
mod commands;

pub use app::run;
