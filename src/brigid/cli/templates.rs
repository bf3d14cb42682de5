//! Output templates, kept as stand-alone files and embedded at compile time.
//!
//! Detail templates receive the record as `obj`. Every value goes through either the
//! `style` or the `datetime` filter, both of which render missing and null values as
//! empty text.

pub const SOFTWARE_TEMPLATE: &str = include_str!("templates/software.tmp");
pub const RELEASE_TEMPLATE: &str = include_str!("templates/release.tmp");
pub const MESSAGES_TEMPLATE: &str = include_str!("templates/messages.tmp");

/// Detail templates by the name endpoint descriptors use for them.
pub const DETAIL_TEMPLATES: &[(&str, &str)] = &[
    ("software.tmp", SOFTWARE_TEMPLATE),
    ("release.tmp", RELEASE_TEMPLATE),
];
