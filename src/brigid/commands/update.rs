use crate::client::ApiClient;
use crate::commands::resolve::resolve;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BrigidError, Result};
use crate::model::{Identifier, Record};
use crate::resources::EndpointDescriptor;
use log::info;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Patches the named fields on one record.
///
/// Field names are checked before anything is sent, including the name lookup for
/// non-numeric identifiers: each may appear once and must be allowed by the descriptor.
pub fn run<C: ApiClient>(
    client: &mut C,
    descriptor: &EndpointDescriptor,
    identifier: &Identifier,
    fields: &[(String, Value)],
) -> Result<CmdResult> {
    if fields.is_empty() {
        return Err(BrigidError::Configuration(format!(
            "Nothing to update: give at least one of {}",
            descriptor.partial_update_allowed.join(", ")
        )));
    }

    let mut seen = HashSet::new();
    let mut repeated: Vec<&str> = Vec::new();
    for (field, _) in fields {
        if !seen.insert(field.as_str()) && !repeated.contains(&field.as_str()) {
            repeated.push(field.as_str());
        }
    }
    if !repeated.is_empty() {
        return Err(BrigidError::Configuration(format!(
            "Fields given more than once: {}",
            repeated.join(", ")
        )));
    }

    let banned = descriptor.disallowed_fields(fields.iter().map(|(k, _)| k.as_str()));
    if !banned.is_empty() {
        return Err(BrigidError::Configuration(format!(
            "These {} fields are not allowed to be updated: {}",
            descriptor.object_name,
            banned.join(", ")
        )));
    }

    let id = resolve(&*client, descriptor, identifier)?;
    let body: Map<String, Value> = fields.iter().cloned().collect();
    let label = identifier.to_string();
    let updated = client
        .partial_update(descriptor.path, id, &Value::Object(body))
        .map_err(|e| {
            BrigidError::from_client(e, descriptor.object_name, Some(label.as_str()))
        })?;
    let record = Record::new(updated);
    info!("Updated {}", descriptor.object_repr(id));

    let mut lines = vec![format!("Updated {}(\"{}\"):", descriptor.object_name, label)];
    for (field, requested) in fields {
        let value = record.get(field).unwrap_or(requested);
        lines.push(format!("  {}={}", field, display_value(value)));
    }

    let mut result = CmdResult::default().with_affected(vec![record]);
    result.add_message(CmdMessage::success(lines.join("\n")));
    Ok(result)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
