use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Field name → messages, as reported by the remote for rejected writes.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A resource as returned by the remote API.
///
/// Records are never mutated locally; each request materializes a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The record's numeric primary key, if the remote sent one.
    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn lookup(&self, path: &FieldPath) -> Option<&Value> {
        path.resolve(&self.0)
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A path into a nested record, e.g. `software__name` or `software.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Walks `value` one segment at a time. Only objects are traversed; arrays and
    /// scalars in the middle of a path end the walk with `None`.
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(value, |current, segment| current.as_object()?.get(segment))
    }
}

impl FromStr for FieldPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let separator = if s.contains("__") { "__" } else { "." };
        let segments: Vec<String> = s.split(separator).map(str::to_string).collect();
        if segments.iter().any(|seg| seg.is_empty()) {
            return Err(format!("Invalid field path: \"{}\"", s));
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("__"))
    }
}

/// What the user typed to pick a record: a primary key or a natural-language name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Id(i64),
    Name(String),
}

impl FromStr for Identifier {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(id) => Identifier::Id(id),
            Err(_) => Identifier::Name(trimmed.to_string()),
        })
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Id(id) => write!(f, "{}", id),
            Identifier::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Normalizes a remote error payload into [`FieldErrors`].
///
/// Lists of strings are kept as-is, a bare string becomes a one-element list and any
/// other JSON is stringified. Non-object payloads carry no field errors.
pub fn field_errors_from_value(value: &Value) -> FieldErrors {
    let Some(map) = value.as_object() else {
        return FieldErrors::new();
    };
    map.iter()
        .map(|(field, messages)| {
            let messages = match messages {
                Value::Array(items) => items.iter().map(value_to_message).collect(),
                other => vec![value_to_message(other)],
            };
            (field.clone(), messages)
        })
        .collect()
}

fn value_to_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_strings_are_ids() {
        assert_eq!("42".parse::<Identifier>().unwrap(), Identifier::Id(42));
        assert_eq!(" 7 ".parse::<Identifier>().unwrap(), Identifier::Id(7));
        assert_eq!(
            "brigid-cli".parse::<Identifier>().unwrap(),
            Identifier::Name("brigid-cli".into())
        );
        assert_eq!(
            "brigid:1.2.3".parse::<Identifier>().unwrap(),
            Identifier::Name("brigid:1.2.3".into())
        );
    }

    #[test]
    fn field_path_accepts_both_separators() {
        let dunder: FieldPath = "software__name".parse().unwrap();
        let dotted: FieldPath = "software.name".parse().unwrap();
        assert_eq!(dunder, dotted);
        assert_eq!(dunder.to_string(), "software__name");
        assert!("software__".parse::<FieldPath>().is_err());
        assert!("".parse::<FieldPath>().is_err());
    }

    #[test]
    fn nested_lookup() {
        let record = Record::new(json!({
            "id": 3,
            "software": {"name": "Brigid", "owner": {"username": "ads"}},
            "tags": ["a"],
        }));

        let path: FieldPath = "software__name".parse().unwrap();
        assert_eq!(record.lookup(&path), Some(&json!("Brigid")));

        let deep: FieldPath = "software__owner__username".parse().unwrap();
        assert_eq!(record.lookup(&deep), Some(&json!("ads")));

        let through_array: FieldPath = "tags__name".parse().unwrap();
        assert_eq!(record.lookup(&through_array), None);

        let missing: FieldPath = "software__version".parse().unwrap();
        assert_eq!(record.lookup(&missing), None);
        assert_eq!(record.id(), Some(3));
    }

    #[test]
    fn field_errors_normalization() {
        let errors = field_errors_from_value(&json!({
            "name": ["too long", "reserved"],
            "url": "not a url",
            "count": 3,
        }));
        assert_eq!(errors["name"], vec!["too long", "reserved"]);
        assert_eq!(errors["url"], vec!["not a url"]);
        assert_eq!(errors["count"], vec!["3"]);
        assert!(field_errors_from_value(&json!(["x"])).is_empty());
    }
}
