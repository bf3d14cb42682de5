//! Server-side imports from a software's upstream git repository.
//!
//! The remote answers 201 when it created a new record and 200 when it refreshed an
//! existing one.

use crate::client::{ActionResponse, ApiClient};
use crate::commands::resolve::resolve;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BrigidError, Result};
use crate::model::{Identifier, Record};
use crate::resources::{EndpointDescriptor, RELEASES, SOFTWARE};
use log::info;
use serde_json::{json, Value};

/// Imports (or re-imports) the software whose repository lives at `url`.
pub fn software<C: ApiClient>(client: &mut C, url: &str) -> Result<CmdResult> {
    let response = client
        .action(SOFTWARE.path, None, "import", &json!({ "url": url }))
        .map_err(|e| BrigidError::from_client(e, SOFTWARE.object_name, None))?;
    imported(&SOFTWARE, response)
}

/// Imports one tagged release of a software.
pub fn release<C: ApiClient>(
    client: &mut C,
    software: &Identifier,
    version: &str,
) -> Result<CmdResult> {
    let software_id = resolve(&*client, &SOFTWARE, software)?;
    let body = json!({ "software_id": software_id, "version": version });
    let response = client
        .action(RELEASES.path, None, "import", &body)
        .map_err(|e| BrigidError::from_client(e, RELEASES.object_name, None))?;
    imported(&RELEASES, response)
}

/// Imports every tagged release of a software. Long-running on the remote.
pub fn all_releases<C: ApiClient>(client: &mut C, software: &Identifier) -> Result<CmdResult> {
    let software_id = resolve(&*client, &SOFTWARE, software)?;
    let response = client
        .action(
            RELEASES.path,
            None,
            "import_all",
            &json!({ "software_id": software_id }),
        )
        .map_err(|e| BrigidError::from_client(e, RELEASES.object_name, None))?;

    let records: Vec<Record> = match response.body {
        Value::Array(items) => items.into_iter().map(Record::new).collect(),
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items.into_iter().map(Record::new).collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    info!(
        "Imported {} releases for {}",
        records.len(),
        SOFTWARE.object_repr(software_id)
    );

    let mut result = CmdResult::default().with_listed(records);
    result.add_message(CmdMessage::success(format!(
        "Success: imported {} releases for {}",
        result.listed.len(),
        SOFTWARE.object_repr(software_id)
    )));
    Ok(result)
}

fn imported(descriptor: &EndpointDescriptor, response: ActionResponse) -> Result<CmdResult> {
    let created = response.created();
    let record = Record::new(response.body);
    let id = record.id().ok_or_else(|| BrigidError::OperationFailed {
        message: format!("{} import returned no id", descriptor.object_name),
        errors: Default::default(),
    })?;
    info!("Imported {} (created={})", descriptor.object_repr(id), created);

    let message = if created {
        CmdMessage::success(format!("Success: created new {}", descriptor.object_repr(id)))
    } else {
        CmdMessage::info(format!("Success: updated {}", descriptor.object_repr(id)))
    };
    let mut result = CmdResult::default().with_affected(vec![record]);
    result.add_message(message);
    Ok(result)
}
