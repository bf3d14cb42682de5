use crate::client::ApiClient;
use crate::commands::resolve::resolve;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BrigidError, Result};
use crate::model::{Identifier, Record};
use crate::resources::EndpointDescriptor;
use log::info;
use serde_json::{json, Value};

/// Asks the remote to refresh one record from its upstream git provider.
pub fn run<C: ApiClient>(
    client: &mut C,
    descriptor: &EndpointDescriptor,
    identifier: &Identifier,
) -> Result<CmdResult> {
    let id = resolve(&*client, descriptor, identifier)?;
    let label = identifier.to_string();
    let response = client
        .action(descriptor.path, Some(id), "sync", &json!({}))
        .map_err(|e| {
            BrigidError::from_client(e, descriptor.object_name, Some(label.as_str()))
        })?;
    info!("Synced {}", descriptor.object_repr(id));

    let affected = match response.body {
        body @ Value::Object(_) => vec![Record::new(body)],
        _ => Vec::new(),
    };
    let mut result = CmdResult::default().with_affected(affected);
    result.add_message(CmdMessage::success(format!(
        "Success: updated {}",
        descriptor.object_repr(id)
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::{fixtures, Call};
    use crate::client::ActionResponse;
    use crate::resources::{RELEASES, SOFTWARE};

    #[test]
    fn syncs_release_by_name() {
        let mut client = fixtures::seeded();
        client.on_action(
            "releases",
            Some(11),
            "sync",
            ActionResponse {
                status: 200,
                body: json!({"id": 11}),
            },
        );

        let result = run(&mut client, &RELEASES, &"brigid:1.1.0".parse().unwrap()).unwrap();
        assert_eq!(result.messages[0].content, "Success: updated Release(id=11)");
        assert_eq!(result.affected.len(), 1);
        assert!(matches!(
            &client.calls()[1],
            Call::Action { id: Some(11), .. }
        ));
    }

    #[test]
    fn sync_of_missing_record_is_not_found() {
        let mut client = fixtures::seeded();
        let err = run(&mut client, &SOFTWARE, &Identifier::Id(99)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find a Software object that matches \"99\""
        );
    }
}
