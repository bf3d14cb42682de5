//! # Rendering
//!
//! Turns `CmdResult` contents into terminal text. Three presentations exist for records:
//!
//! - **table** (`tabled`): columns come from the endpoint descriptor, cells are resolved
//!   through [`FieldPath`] and humanized (timestamps, dates, floats)
//! - **json**: pretty-printed with a two-space indent
//! - **template** (`outstanding`): the descriptor's detail template, with the record
//!   bound as `obj`
//!
//! Errors are rendered separately with `colored`, since they go to stderr.

use super::styles::{names, BRIGID_THEME};
use super::templates::{DETAIL_TEMPLATES, MESSAGES_TEMPLATE};
use brigid::commands::{CmdMessage, MessageLevel};
use brigid::error::{BrigidError, Result};
use brigid::model::{FieldPath, Record};
use brigid::resources::{Column, EndpointDescriptor};
use colored::Colorize;
use outstanding::{format_timestamp, render_with_color, Renderer};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::Style;

pub const NO_RESULTS: &str = "No results matched your filters.";

pub fn render_table(descriptor: &EndpointDescriptor, records: &[Record]) -> String {
    if records.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(descriptor.list_columns.iter().map(|c| c.header.to_string()));
    for record in records {
        builder.push_record(descriptor.list_columns.iter().map(|c| render_cell(record, c)));
    }

    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}

fn render_cell(record: &Record, column: &Column) -> String {
    if let Some(formatter) = column.formatter {
        return formatter(record);
    }
    match column.field.parse::<FieldPath>() {
        Ok(path) => record.lookup(&path).map(format_value).unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Display form of one table cell.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => format_timestamp(s).unwrap_or_else(|| s.clone()),
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|f| format!("{:.2}", f))
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

pub fn render_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub fn render_records_json(records: &[Record]) -> Result<String> {
    render_json(records)
}

/// Renders one record through its descriptor's detail template.
///
/// Files in `template_dir` named like the descriptor's template replace the built-in one.
pub fn render_detail(
    descriptor: &EndpointDescriptor,
    record: &Record,
    template_dir: Option<&Path>,
    use_color: bool,
) -> Result<String> {
    let mut renderer = Renderer::with_color((*BRIGID_THEME).clone(), use_color);
    if let Some(dir) = template_dir {
        renderer = renderer.with_template_dir(dir);
    }
    for (name, source) in DETAIL_TEMPLATES {
        renderer
            .add_template(name, source)
            .map_err(|e| BrigidError::Render(e.to_string()))?;
    }
    renderer
        .render(descriptor.detail_template, &json!({ "obj": record }))
        .map_err(|e| BrigidError::Render(e.to_string()))
}

#[derive(Serialize)]
struct MessageData {
    content: String,
    style: String,
}

#[derive(Serialize)]
struct MessagesData {
    messages: Vec<MessageData>,
}

pub fn render_messages(messages: &[CmdMessage], use_color: bool) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let data = MessagesData {
        messages: messages
            .iter()
            .map(|m| MessageData {
                content: m.content.clone(),
                style: match m.level {
                    MessageLevel::Info => names::INFO,
                    MessageLevel::Success => names::SUCCESS,
                    MessageLevel::Warning => names::WARNING,
                }
                .to_string(),
            })
            .collect(),
    };
    render_with_color(MESSAGES_TEMPLATE, &data, &BRIGID_THEME, use_color).unwrap_or_else(|_| {
        messages
            .iter()
            .map(|m| format!("{}\n", m.content))
            .collect()
    })
}

pub fn print_messages(messages: &[CmdMessage], use_color: bool) {
    print!("{}", render_messages(messages, use_color));
}

/// Error text for stderr: the message in red, then each field in yellow with its
/// messages indented below it.
pub fn render_error(err: &BrigidError) -> String {
    let mut lines = vec![err.to_string().red().to_string()];
    if let Some(errors) = err.field_errors() {
        for (field, messages) in errors {
            lines.push(format!("{}:", field).yellow().to_string());
            for message in messages {
                lines.push(format!("    {}", message));
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use brigid::model::FieldErrors;
    use brigid::resources::{RELEASES, SOFTWARE};

    fn software() -> Value {
        json!({
            "id": 1,
            "machine_name": "brigid",
            "name": "Brigid",
            "description": "Software catalog",
            "documentation_url": null,
            "repo_created": "2019-03-14T17:02:11Z",
            "authors": [],
        })
    }

    fn release_record() -> Record {
        Record::new(json!({
            "id": 10,
            "software": software(),
            "version": "1.0.0",
            "sha": "0123abcd",
            "changelog": "Fixed things",
            "release_time": "2021-06-01T08:30:00Z",
            "released_by": {"fullname": "Ada Lovelace", "email": "ada@example.com"},
        }))
    }

    #[test]
    fn empty_table_is_no_results_message() {
        assert_eq!(render_table(&SOFTWARE, &[]), NO_RESULTS);
    }

    #[test]
    fn table_resolves_nested_and_computed_columns() {
        let output = render_table(&RELEASES, &[release_record()]);
        assert!(output.contains("Released By"));
        assert!(output.contains("Brigid"));
        assert!(output.contains("Ada Lovelace <ada@example.com>"));
        assert!(output.contains("Jun 01, 2021 08:30:00 AM"));
    }

    #[test]
    fn missing_nested_values_render_empty() {
        let record = Record::new(json!({"id": 4, "version": "0.1", "software": null}));
        let output = render_table(&RELEASES, &[record]);
        assert!(output.contains("0.1"));
    }

    #[test]
    fn cell_formats() {
        assert_eq!(format_value(&json!(null)), "");
        assert_eq!(format_value(&json!(2.5)), "2.50");
        assert_eq!(format_value(&json!(7)), "7");
        assert_eq!(format_value(&json!("2020-02-03")), "Feb 03, 2020");
        assert_eq!(format_value(&json!("1.2.3")), "1.2.3");
        assert_eq!(format_value(&json!(true)), "true");
    }

    #[test]
    fn json_is_pretty_printed() {
        let output = render_records_json(&[Record::new(json!({"id": 1}))]).unwrap();
        assert_eq!(output, "[\n  {\n    \"id\": 1\n  }\n]");
    }

    #[test]
    fn software_detail_template() {
        let record = Record::new(software());
        let output = render_detail(&SOFTWARE, &record, None, false).unwrap();
        assert!(output.starts_with("Brigid (id=1)"));
        assert!(output.contains("Machine name:      brigid"));
        assert!(output.contains("Repo created:      Mar 14, 2019 05:02:11 PM"));
        assert!(!output.contains("none"));
    }

    #[test]
    fn release_detail_template() {
        let output = render_detail(&RELEASES, &release_record(), None, false).unwrap();
        assert!(output.contains("Brigid 1.0.0 (id=10)"));
        assert!(output.contains("Released by:   Ada Lovelace <ada@example.com>"));
        assert!(output.contains("Fixed things"));
    }

    #[test]
    fn release_template_tolerates_unexpanded_references() {
        let record = Record::new(json!({"id": 3, "software": 1, "version": "2.0"}));
        let output = render_detail(&RELEASES, &record, None, false).unwrap();
        assert!(output.contains("2.0 (id=3)"));
    }

    #[test]
    fn template_dir_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let custom = "custom {{ obj.machine_name }}";
        std::fs::write(dir.path().join("software.tmp"), custom).unwrap();
        let record = Record::new(software());
        let output = render_detail(&SOFTWARE, &record, Some(dir.path()), false).unwrap();
        assert_eq!(output, "custom brigid");
    }

    #[test]
    fn messages_render_in_order() {
        let output = render_messages(
            &[
                CmdMessage::success("Success: created new Software(id=3)"),
                CmdMessage::info("Success: updated Release(id=4)"),
            ],
            false,
        );
        assert_eq!(
            output,
            "Success: created new Software(id=3)\nSuccess: updated Release(id=4)\n"
        );
        assert!(render_messages(&[], false).is_empty());
    }

    #[test]
    fn error_lists_field_messages() {
        colored::control::set_override(false);
        let mut errors = FieldErrors::new();
        errors.insert(
            "version".into(),
            vec!["This field is required.".into(), "Must be semver.".into()],
        );
        let err = BrigidError::Validation {
            message: "Release failed validation".into(),
            errors,
        };
        assert_eq!(
            render_error(&err),
            "Release failed validation\nversion:\n    This field is required.\n    Must be semver."
        );
    }
}
