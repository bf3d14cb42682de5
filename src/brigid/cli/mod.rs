//! # CLI Layer
//!
//! One client of the library, not the application itself. Everything that touches the
//! terminal lives here: argument parsing, logging setup, rendering, colors and exit
//! codes.
//!
//! ## Module Structure
//!
//! - `setup`: clap declarations, one subcommand enum per resource group, value parsers
//!   and logger initialization
//! - `commands`: context wiring and per-operation handlers
//! - `render`: tables, JSON, detail templates, messages and error text
//! - `styles`: the named style theme
//! - `templates`: embedded template sources

mod commands;
mod render;
pub mod setup;
mod styles;
mod templates;

pub use commands::run;
pub use render::render_error;
