use crate::client::{ApiClient, Query};
use crate::error::{BrigidError, Result};
use crate::model::{Identifier, Record};
use crate::resources::EndpointDescriptor;
use log::debug;

/// Turns what the user typed into a primary key.
///
/// Numeric identifiers are returned as-is without contacting the remote. Names are
/// converted to list filters by the descriptor and must match exactly one record.
pub fn resolve<C: ApiClient>(
    client: &C,
    descriptor: &EndpointDescriptor,
    identifier: &Identifier,
) -> Result<i64> {
    let name = match identifier {
        Identifier::Id(id) => return Ok(*id),
        Identifier::Name(name) => name,
    };

    let filters = descriptor.name_filters(name).ok_or_else(|| {
        BrigidError::NotFound(format!(
            "\"{}\" is not a valid {} identifier: use {}.id or {}",
            name, descriptor.object_name, descriptor.object_name, descriptor.name_format
        ))
    })?;
    debug!(
        "Resolving {} \"{}\" with filters {:?}",
        descriptor.object_name, name, filters
    );

    let query: Query = filters.into_iter().collect();
    let page = client
        .list(descriptor.path, &query)
        .map_err(|e| BrigidError::from_client(e, descriptor.object_name, Some(name.as_str())))?;

    match (page.total(), page.results.as_slice()) {
        (0, _) | (_, []) => Err(BrigidError::NotFound(format!(
            "Could not find a {} object that matches \"{}\"",
            descriptor.object_name, name
        ))),
        (1, [only]) => Record::new(only.clone()).id().ok_or_else(|| BrigidError::OperationFailed {
            message: format!(
                "{} matching \"{}\" has no id",
                descriptor.object_name, name
            ),
            errors: Default::default(),
        }),
        (count, _) => Err(BrigidError::AmbiguousIdentifier {
            object: descriptor.object_name.to_string(),
            identifier: name.clone(),
            count,
        }),
    }
}
