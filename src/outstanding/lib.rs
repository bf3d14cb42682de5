//! # Outstanding - Styled CLI Template Rendering
//!
//! A lightweight system for rendering styled terminal output using templates, with
//! graceful degradation to plain text when color is off.
//!
//! ## The Problem
//!
//! CLI applications need styled output (colors, bold, underline) for good UX, but:
//! - Inline ANSI codes in templates are ugly and hard to maintain
//! - Not all terminals support colors (pipes, CI, `TERM=dumb`)
//! - Remote APIs hand back raw timestamps that nobody wants to read
//!
//! ## The Solution
//!
//! Outstanding separates concerns:
//! - **Templates** define structure using Jinja2 syntax (via minijinja)
//! - **Styles** are defined separately and applied via the `style` filter
//! - **Timestamps** are humanized by the `datetime` filter
//! - **Color** is switched on or off by the caller; without it, styles degrade to plain text
//!
//! ## Quick Example
//!
//! ```rust
//! use outstanding::{render_with_color, Theme};
//! use console::Style;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Data {
//!     name: String,
//!     created: String,
//! }
//!
//! let theme = Theme::new().add("header", Style::new().bold().cyan());
//!
//! let template = r#"{{ name | style("header") }} ({{ created | datetime }})"#;
//!
//! let data = Data { name: "brigid".into(), created: "2021-03-04T15:30:00Z".into() };
//! let output = render_with_color(template, &data, &theme, false).unwrap();
//! assert_eq!(output, "brigid (Mar 04, 2021 03:30:00 PM)");
//! ```
//!
//! ## Renderer for Multiple Templates
//!
//! For applications with many templates, use [`Renderer`] to pre-register them. A
//! renderer can also be pointed at a directory; templates found there shadow the
//! ones registered in code, so users can restyle detail views without rebuilding.
//!
//! ```rust
//! use outstanding::{Renderer, Theme};
//! use console::Style;
//!
//! let theme = Theme::new().add("ok", Style::new().green());
//!
//! let mut renderer = Renderer::with_color(theme, false);
//! renderer.add_template("status", "Status: {{ msg | style(\"ok\") }}").unwrap();
//!
//! # use serde::Serialize;
//! # #[derive(Serialize)]
//! # struct StatusData { msg: String }
//! let output = renderer.render("status", &StatusData { msg: "ready".into() }).unwrap();
//! assert_eq!(output, "Status: ready");
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use console::Style;
use minijinja::{path_loader, Environment, Error, Value};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default prefix shown when a style name is not found.
pub const DEFAULT_MISSING_STYLE_INDICATOR: &str = "(!?)";

/// Format used for full timestamps, e.g. `Mar 04, 2021 03:30:00 PM`.
pub const DATETIME_FORMAT: &str = "%b %d, %Y %I:%M:%S %p";

/// Format used for bare dates, e.g. `Mar 04, 2021`.
pub const DATE_FORMAT: &str = "%b %d, %Y";

/// A collection of named styles.
///
/// Styles are registered by name and applied via the `style` filter in templates.
/// When a style name is not found, a configurable indicator is prepended to the text
/// to help catch typos in templates (defaults to `(!?)`).
///
/// # Example
///
/// ```rust
/// use outstanding::Styles;
/// use console::Style;
///
/// let styles = Styles::new()
///     .add("error", Style::new().bold().red())
///     .add("dim", Style::new().dim());
///
/// let unknown = styles.apply("typo", "Hello");
/// assert!(unknown.starts_with("(!?)"));
/// ```
#[derive(Clone)]
pub struct Styles {
    styles: HashMap<String, Style>,
    missing_indicator: String,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            styles: HashMap::new(),
            missing_indicator: DEFAULT_MISSING_STYLE_INDICATOR.to_string(),
        }
    }
}

impl Styles {
    /// Creates an empty style registry with the default missing style indicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom indicator to prepend when a style name is not found.
    /// An empty string disables the indicator.
    pub fn missing_indicator(mut self, indicator: &str) -> Self {
        self.missing_indicator = indicator.to_string();
        self
    }

    /// Adds a named style, replacing any style with the same name.
    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles.insert(name.to_string(), style);
        self
    }

    /// Applies a named style to text.
    pub fn apply(&self, name: &str, text: &str) -> String {
        match self.styles.get(name) {
            Some(style) => style.apply_to(text).to_string(),
            None if self.missing_indicator.is_empty() => text.to_string(),
            None => format!("{} {}", self.missing_indicator, text),
        }
    }

    /// Applies style checking without ANSI codes (plain text mode).
    pub fn apply_plain(&self, name: &str, text: &str) -> String {
        if self.styles.contains_key(name) || self.missing_indicator.is_empty() {
            text.to_string()
        } else {
            format!("{} {}", self.missing_indicator, text)
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// A named collection of styles used when rendering templates.
#[derive(Clone, Default)]
pub struct Theme {
    styles: Styles,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named style, returning an updated theme for chaining.
    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles = self.styles.add(name, style);
        self
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }
}

/// Humanizes a timestamp string returned by a remote API.
///
/// RFC 3339 timestamps (with or without an offset) render with [`DATETIME_FORMAT`],
/// `YYYY-MM-DD` dates with [`DATE_FORMAT`]. Anything else yields `None`.
///
/// ```rust
/// assert_eq!(
///     outstanding::format_timestamp("2020-01-02").as_deref(),
///     Some("Jan 02, 2020")
/// );
/// assert_eq!(outstanding::format_timestamp("1.2.3"), None);
/// ```
pub fn format_timestamp(raw: &str) -> Option<String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.format(DATETIME_FORMAT).to_string());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.format(DATETIME_FORMAT).to_string());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.format(DATE_FORMAT).to_string())
}

/// Renders an inline template. With `use_color` off, styles render as plain text,
/// for example when honoring a `--no-color` CLI flag.
pub fn render_with_color<T: Serialize>(
    template: &str,
    data: &T,
    theme: &Theme,
    use_color: bool,
) -> Result<String, Error> {
    let mut env = Environment::new();
    register_filters(&mut env, theme.clone(), use_color);

    env.add_template_owned("_inline".to_string(), template.to_string())?;
    let tmpl = env.get_template("_inline")?;
    tmpl.render(data)
}

/// A renderer with pre-registered templates.
///
/// Templates are compiled once and reused. When created with
/// [`Renderer::with_template_dir`], files in that directory take precedence
/// over templates registered through [`Renderer::add_template`].
pub struct Renderer {
    env: Environment<'static>,
    template_dir: Option<PathBuf>,
}

impl Renderer {
    /// Creates a renderer; `use_color` decides whether styles emit ANSI codes.
    pub fn with_color(theme: Theme, use_color: bool) -> Self {
        let mut env = Environment::new();
        register_filters(&mut env, theme, use_color);
        Self {
            env,
            template_dir: None,
        }
    }

    /// Loads templates lazily from `dir`, shadowing templates registered in code.
    pub fn with_template_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        self.env.set_loader(path_loader(dir.clone()));
        self.template_dir = Some(dir);
        self
    }

    /// Registers a named template.
    ///
    /// The template is compiled immediately; errors are returned if syntax is invalid.
    /// If the template directory already provides `name`, the in-code source is ignored.
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), Error> {
        if let Some(dir) = &self.template_dir {
            if dir.join(name).is_file() {
                return Ok(());
            }
        }
        self.env
            .add_template_owned(name.to_string(), source.to_string())
    }

    /// Renders a registered template with the given data.
    ///
    /// # Errors
    ///
    /// Returns an error if the template name is not found or rendering fails.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, Error> {
        let tmpl = self.env.get_template(name)?;
        tmpl.render(data)
    }
}

/// Registers the `style` and `datetime` filters on a minijinja environment.
fn register_filters(env: &mut Environment<'static>, theme: Theme, use_color: bool) {
    let styles = theme.styles;
    env.add_filter("style", move |value: Value, name: String| -> String {
        let text = display_value(&value);
        if use_color {
            styles.apply(&name, &text)
        } else {
            // Still check for missing styles even when colors are disabled
            styles.apply_plain(&name, &text)
        }
    });
    env.add_filter("datetime", |value: Value| -> String {
        match value.as_str() {
            Some(raw) => format_timestamp(raw).unwrap_or_else(|| raw.to_string()),
            None => display_value(&value),
        }
    });
}

fn display_value(value: &Value) -> String {
    if value.is_undefined() || value.is_none() {
        String::new()
    } else {
        value.to_string()
    }
}
