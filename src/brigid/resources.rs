//! # Endpoint Descriptors
//!
//! Static configuration for each resource type the remote exposes. A descriptor says
//! where the resource lives, how it lists as a table, which fields may be patched,
//! which expansions to request and how a human-readable name maps onto list filters.
//!
//! Descriptors are plain `static` values: the CLI declares its flags per resource in
//! `cli/setup.rs`, and the command layer consults the descriptor to enforce the same
//! contract at runtime (allowed update fields, known filters).

use crate::model::Record;

/// The value type a list filter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    Integer,
    Timestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct FilterSpec {
    pub name: &'static str,
    pub kind: FilterKind,
}

/// Computes a table cell from the whole record, for columns that are not a plain path.
pub type CellFormatter = fn(&Record) -> String;

#[derive(Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    /// Field path (`__`-separated) or, with a formatter, just the column's key.
    pub field: &'static str,
    pub formatter: Option<CellFormatter>,
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("header", &self.header)
            .field("field", &self.field)
            .field("computed", &self.formatter.is_some())
            .finish()
    }
}

impl Column {
    const fn path(header: &'static str, field: &'static str) -> Self {
        Self {
            header,
            field,
            formatter: None,
        }
    }

    const fn computed(header: &'static str, field: &'static str, formatter: CellFormatter) -> Self {
        Self {
            header,
            field,
            formatter: Some(formatter),
        }
    }
}

/// How a non-numeric identifier becomes list filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameResolution {
    /// The whole name is matched against one filter.
    Field(&'static str),
    /// `<software machine_name>:<version>`.
    SoftwareVersion,
}

#[derive(Debug)]
pub struct EndpointDescriptor {
    pub object_name: &'static str,
    /// URL path segment below the API base, without slashes.
    pub path: &'static str,
    pub list_columns: &'static [Column],
    pub list_filters: &'static [FilterSpec],
    pub list_expands: Option<&'static str>,
    pub retrieve_expands: Option<&'static str>,
    pub partial_update_allowed: &'static [&'static str],
    pub detail_template: &'static str,
    pub name_resolution: NameResolution,
    /// Human description of the name form, used in help and error text.
    pub name_format: &'static str,
}

impl EndpointDescriptor {
    pub fn filter(&self, name: &str) -> Option<&FilterSpec> {
        self.list_filters.iter().find(|f| f.name == name)
    }

    /// Turns a name into list filters, or `None` when the name has the wrong shape.
    pub fn name_filters(&self, name: &str) -> Option<Vec<(String, String)>> {
        match self.name_resolution {
            NameResolution::Field(field) => Some(vec![(field.to_string(), name.to_string())]),
            NameResolution::SoftwareVersion => {
                let (software, version) = name.rsplit_once(':')?;
                if software.is_empty() || version.is_empty() {
                    return None;
                }
                Some(vec![
                    ("software_machine_name".to_string(), software.to_string()),
                    ("version".to_string(), version.to_string()),
                ])
            }
        }
    }

    /// Fields in `requested` that this endpoint refuses to patch, in request order.
    pub fn disallowed_fields<'a, I>(&self, requested: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        requested
            .into_iter()
            .filter(|field| !self.partial_update_allowed.contains(field))
            .map(str::to_string)
            .collect()
    }

    /// `Software(id=3)`
    pub fn object_repr(&self, id: i64) -> String {
        format!("{}(id={})", self.object_name, id)
    }
}

fn releaser(record: &Record) -> String {
    let Some(person) = record.get("released_by").and_then(|v| v.as_object()) else {
        return String::new();
    };
    let field = |name: &str| person.get(name).and_then(|v| v.as_str()).unwrap_or_default();
    format!("{} <{}>", field("fullname"), field("email"))
}

pub static SOFTWARE: EndpointDescriptor = EndpointDescriptor {
    object_name: "Software",
    path: "software",
    list_columns: &[
        Column::path("ID", "id"),
        Column::path("Machine Name", "machine_name"),
        Column::path("Human Name", "name"),
        Column::path("Repo Created", "repo_created"),
        Column::path("Repo Modified", "repo_modified"),
    ],
    list_filters: &[
        FilterSpec {
            name: "name",
            kind: FilterKind::Text,
        },
        FilterSpec {
            name: "machine_name",
            kind: FilterKind::Text,
        },
        FilterSpec {
            name: "author_username",
            kind: FilterKind::Text,
        },
    ],
    list_expands: None,
    retrieve_expands: Some("software.applications,software.authors"),
    partial_update_allowed: &["trello_board_url", "documentation_url", "name"],
    detail_template: "software.tmp",
    name_resolution: NameResolution::Field("machine_name"),
    name_format: "Software.machine_name",
};

pub static RELEASES: EndpointDescriptor = EndpointDescriptor {
    object_name: "Release",
    path: "releases",
    list_columns: &[
        Column::path("ID", "id"),
        Column::path("Software", "software__name"),
        Column::path("Version", "version"),
        Column::computed("Released By", "releaser", releaser),
        Column::path("Released", "release_time"),
    ],
    list_filters: &[
        FilterSpec {
            name: "software_machine_name",
            kind: FilterKind::Text,
        },
        FilterSpec {
            name: "software_id",
            kind: FilterKind::Integer,
        },
        FilterSpec {
            name: "version",
            kind: FilterKind::Text,
        },
        FilterSpec {
            name: "released_after",
            kind: FilterKind::Timestamp,
        },
        FilterSpec {
            name: "released_before",
            kind: FilterKind::Timestamp,
        },
    ],
    list_expands: Some("release.software,release.released_by"),
    retrieve_expands: Some("release.software,release.released_by"),
    partial_update_allowed: &["sha", "changelog"],
    detail_template: "release.tmp",
    name_resolution: NameResolution::SoftwareVersion,
    name_format: "\"{Software.machine_name}:{Release.version}\"",
};
