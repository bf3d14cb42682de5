use crate::client::{ApiClient, Query};
use crate::commands::resolve::resolve;
use crate::commands::CmdResult;
use crate::error::{BrigidError, Result};
use crate::model::{Identifier, Record};
use crate::resources::EndpointDescriptor;

/// Fetches one record. `expand` replaces the descriptor's retrieve expansions.
pub fn run<C: ApiClient>(
    client: &C,
    descriptor: &EndpointDescriptor,
    identifier: &Identifier,
    expand: Option<&str>,
) -> Result<CmdResult> {
    let id = resolve(client, descriptor, identifier)?;

    let mut query = Query::new();
    if let Some(expand) = expand.or(descriptor.retrieve_expands) {
        query.push("expand", expand);
    }

    let label = identifier.to_string();
    let record = client
        .retrieve(descriptor.path, id, &query)
        .map_err(|e| {
            BrigidError::from_client(e, descriptor.object_name, Some(label.as_str()))
        })?;

    Ok(CmdResult::default().with_affected(vec![Record::new(record)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::{fixtures, Call};
    use crate::resources::{RELEASES, SOFTWARE};

    #[test]
    fn retrieves_by_id_with_default_expands() {
        let client = fixtures::seeded();
        let result = run(&client, &SOFTWARE, &Identifier::Id(1), None).unwrap();
        assert_eq!(result.affected[0].get("machine_name").unwrap(), "brigid");

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::Retrieve { id, query, .. } => {
                assert_eq!(*id, 1);
                assert_eq!(
                    query.get("expand"),
                    Some("software.applications,software.authors")
                );
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn retrieves_by_name() {
        let client = fixtures::seeded();
        let result = run(&client, &RELEASES, &"brigid-cli:1.0.0".parse().unwrap(), None).unwrap();
        assert_eq!(result.affected[0].id(), Some(12));
        assert_eq!(client.calls().len(), 2);
    }

    #[test]
    fn missing_id_is_not_found() {
        let client = fixtures::seeded();
        let err = run(&client, &SOFTWARE, &Identifier::Id(404), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find a Software object that matches \"404\""
        );
    }

    #[test]
    fn explicit_expand_wins() {
        let client = fixtures::seeded();
        run(&client, &SOFTWARE, &Identifier::Id(1), Some("software.authors")).unwrap();
        match &client.calls()[0] {
            Call::Retrieve { query, .. } => {
                assert_eq!(query.get("expand"), Some("software.authors"))
            }
            other => panic!("unexpected call {:?}", other),
        }
    }
}
