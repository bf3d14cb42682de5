use crate::client::{ApiClient, Query};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BrigidError, Result};
use crate::model::Record;
use crate::resources::{EndpointDescriptor, FilterKind};
use chrono::{DateTime, SecondsFormat, Utc};

pub const DEFAULT_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl FilterValue {
    fn kind(&self) -> FilterKind {
        match self {
            FilterValue::Text(_) => FilterKind::Text,
            FilterValue::Integer(_) => FilterKind::Integer,
            FilterValue::Timestamp(_) => FilterKind::Timestamp,
        }
    }

    fn to_param(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::Integer(i) => i.to_string(),
            FilterValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub filters: Vec<(String, FilterValue)>,
    pub limit: u32,
    /// Overrides the descriptor's list expansions when set.
    pub expand: Option<String>,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            limit: DEFAULT_LIMIT,
            expand: None,
        }
    }
}

impl ListRequest {
    pub fn filter(mut self, name: impl Into<String>, value: FilterValue) -> Self {
        self.filters.push((name.into(), value));
        self
    }
}

pub fn run<C: ApiClient>(
    client: &C,
    descriptor: &EndpointDescriptor,
    request: &ListRequest,
) -> Result<CmdResult> {
    let query = build_query(descriptor, request)?;
    let page = client
        .list(descriptor.path, &query)
        .map_err(|e| BrigidError::from_client(e, descriptor.object_name, None))?;

    let shown = page.results.len();
    let total = page.total();
    let mut result =
        CmdResult::default().with_listed(page.results.into_iter().map(Record::new).collect());
    if total > shown {
        result.add_message(CmdMessage::warning(format!(
            "Showing {} of {} {} objects; raise the limit to see more",
            shown, total, descriptor.object_name
        )));
    }
    Ok(result)
}

fn build_query(descriptor: &EndpointDescriptor, request: &ListRequest) -> Result<Query> {
    let mut query = Query::new();
    for (name, value) in &request.filters {
        let spec = descriptor.filter(name).ok_or_else(|| {
            BrigidError::Configuration(format!(
                "{} objects cannot be filtered by \"{}\"",
                descriptor.object_name, name
            ))
        })?;
        if spec.kind != value.kind() {
            return Err(BrigidError::Configuration(format!(
                "Filter \"{}\" expects a {:?} value",
                name, spec.kind
            )));
        }
        query.push(name.as_str(), value.to_param());
    }

    query.push("limit", request.limit.to_string());
    let expand = request.expand.as_deref().or(descriptor.list_expands);
    if let Some(expand) = expand {
        query.push("expand", expand);
    }
    Ok(query)
}
