use crate::client::ApiClient;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BrigidError, Result};
use crate::model::Record;
use crate::resources::EndpointDescriptor;
use log::info;
use serde_json::Value;

pub fn run<C: ApiClient>(
    client: &mut C,
    descriptor: &EndpointDescriptor,
    fields: Value,
) -> Result<CmdResult> {
    if !fields.is_object() {
        return Err(BrigidError::Configuration(format!(
            "{} data must be a mapping of field names to values",
            descriptor.object_name
        )));
    }

    let created = client
        .create(descriptor.path, &fields)
        .map_err(|e| BrigidError::from_client(e, descriptor.object_name, None))?;
    let record = Record::new(created);

    let label = match record.id() {
        Some(id) => descriptor.object_repr(id),
        None => descriptor.object_name.to_string(),
    };
    info!("Created {}", label);

    let mut result = CmdResult::default().with_affected(vec![record]);
    result.add_message(CmdMessage::success(format!("Created {}", label)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::{fixtures, InMemoryClient};
    use crate::client::ClientError;
    use crate::model::FieldErrors;
    use crate::resources::SOFTWARE;
    use serde_json::json;

    #[test]
    fn creates_record() {
        let mut client = fixtures::seeded();
        let result = run(
            &mut client,
            &SOFTWARE,
            json!({"machine_name": "new-thing", "name": "New Thing"}),
        )
        .unwrap();

        assert_eq!(result.affected[0].id(), Some(3));
        assert_eq!(result.messages[0].content, "Created Software(id=3)");
        assert_eq!(client.records("software").len(), 3);
    }

    #[test]
    fn rejects_non_mapping_input() {
        let mut client = InMemoryClient::new();
        let err = run(&mut client, &SOFTWARE, json!(["a", "b"])).unwrap_err();
        assert!(matches!(err, BrigidError::Configuration(_)));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn validation_errors_carry_fields() {
        let mut client = InMemoryClient::new();
        let mut errors = FieldErrors::new();
        errors.insert("machine_name".into(), vec!["This field is required.".into()]);
        client.fail_next(ClientError::Invalid(errors));

        let err = run(&mut client, &SOFTWARE, json!({"name": "x"})).unwrap_err();
        assert_eq!(err.to_string(), "Software failed validation");
        assert!(err.field_errors().unwrap().contains_key("machine_name"));
    }
}
