use crate::client::ApiClient;
use crate::commands::resolve::resolve;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BrigidError, Result};
use crate::model::Identifier;
use crate::resources::EndpointDescriptor;
use log::info;

pub fn run<C: ApiClient>(
    client: &mut C,
    descriptor: &EndpointDescriptor,
    identifier: &Identifier,
) -> Result<CmdResult> {
    let id = resolve(&*client, descriptor, identifier)?;
    let label = identifier.to_string();
    client
        .delete(descriptor.path, id)
        .map_err(|e| {
            BrigidError::from_client(e, descriptor.object_name, Some(label.as_str()))
        })?;
    info!("Deleted {}", descriptor.object_repr(id));

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Deleted {}(\"{}\")",
        descriptor.object_name, label
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::fixtures;
    use crate::client::ClientError;
    use crate::resources::{RELEASES, SOFTWARE};

    #[test]
    fn deletes_by_name() {
        let mut client = fixtures::seeded();
        let result = run(&mut client, &RELEASES, &"brigid:1.0.0".parse().unwrap()).unwrap();
        assert_eq!(result.messages[0].content, "Deleted Release(\"brigid:1.0.0\")");
        assert_eq!(client.records("releases").len(), 2);
    }

    #[test]
    fn remote_failures_surface() {
        let mut client = fixtures::seeded();
        client.fail_next(ClientError::Failed {
            status: 409,
            message: "Software has releases".into(),
            errors: Default::default(),
        });
        let err = run(&mut client, &SOFTWARE, &Identifier::Id(1)).unwrap_err();
        assert!(matches!(err, BrigidError::OperationFailed { .. }));
        assert!(err.to_string().contains("Software has releases"));
    }
}
