//! Named styles for terminal output.
//!
//! Templates and the message renderer refer to styles by semantic name only; the
//! actual colors live here. Unknown names render with the `(!?)` indicator, which makes
//! typos visible during development.

use console::Style;
use once_cell::sync::Lazy;
use outstanding::Theme;

/// Style names for message levels, chosen in code.
pub mod names {
    pub const SUCCESS: &str = "success";
    pub const INFO: &str = "info";
    pub const WARNING: &str = "warning";
}

pub static BRIGID_THEME: Lazy<Theme> = Lazy::new(|| {
    Theme::new()
        // Used by name from the detail templates.
        .add("title", Style::new().bold().cyan())
        .add("label", Style::new().bold())
        .add("value", Style::new())
        .add("muted", Style::new().dim())
        .add(names::SUCCESS, Style::new().green())
        .add(names::INFO, Style::new().cyan())
        .add(names::WARNING, Style::new().yellow())
});
