use super::{ActionResponse, ApiClient, ClientError, ClientResult, Page, Query};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

/// One recorded call against the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List { path: String, query: Query },
    Retrieve { path: String, id: i64, query: Query },
    Create { path: String, body: Value },
    PartialUpdate { path: String, id: i64, body: Value },
    Delete { path: String, id: i64 },
    Action {
        path: String,
        id: Option<i64>,
        action: String,
        body: Value,
    },
}

/// Query parameters that shape the response rather than filter it.
const CONTROL_PARAMS: &[&str] = &["limit", "expand", "offset"];

/// An in-memory stand-in for the remote API.
///
/// Collections are keyed by resource path. List filters are exact string matches
/// against top-level fields; `limit` truncates. Action endpoints answer with canned
/// responses registered through [`InMemoryClient::on_action`].
#[derive(Debug, Default)]
pub struct InMemoryClient {
    collections: HashMap<String, Vec<Value>>,
    actions: HashMap<(String, Option<i64>, String), ActionResponse>,
    /// Next free id per path; each collection is numbered on its own.
    next_ids: HashMap<String, i64>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<VecDeque<ClientError>>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record` under `path`, assigning an id when it has none.
    pub fn insert(&mut self, path: &str, mut record: Value) -> i64 {
        let next_id = self.next_ids.entry(path.to_string()).or_insert(1);
        let id = match record.get("id").and_then(Value::as_i64) {
            Some(id) => id,
            None => {
                let id = *next_id;
                if let Some(map) = record.as_object_mut() {
                    map.insert("id".to_string(), Value::from(id));
                }
                id
            }
        };
        *next_id = (*next_id).max(id + 1);
        self.collections
            .entry(path.to_string())
            .or_default()
            .push(record);
        id
    }

    pub fn on_action(
        &mut self,
        path: &str,
        id: Option<i64>,
        action: &str,
        response: ActionResponse,
    ) {
        self.actions
            .insert((path.to_string(), id, action.to_string()), response);
    }

    /// The next call fails with `error` instead of touching the collections.
    pub fn fail_next(&self, error: ClientError) {
        self.failures.borrow_mut().push_back(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn records(&self, path: &str) -> &[Value] {
        self.collections.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    fn record_call(&self, call: Call) -> ClientResult<()> {
        self.calls.borrow_mut().push(call);
        match self.failures.borrow_mut().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn find(&self, path: &str, id: i64) -> ClientResult<&Value> {
        self.collections
            .get(path)
            .and_then(|records| {
                records
                    .iter()
                    .find(|r| r.get("id").and_then(Value::as_i64) == Some(id))
            })
            .ok_or_else(|| ClientError::NotFound("Not found.".to_string()))
    }

    fn find_mut(&mut self, path: &str, id: i64) -> ClientResult<&mut Value> {
        self.collections
            .get_mut(path)
            .and_then(|records| {
                records
                    .iter_mut()
                    .find(|r| r.get("id").and_then(Value::as_i64) == Some(id))
            })
            .ok_or_else(|| ClientError::NotFound("Not found.".to_string()))
    }
}

fn matches_filter(record: &Value, key: &str, expected: &str) -> bool {
    match record.get(key) {
        Some(Value::String(s)) => s == expected,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == expected,
    }
}

impl ApiClient for InMemoryClient {
    fn list(&self, path: &str, query: &Query) -> ClientResult<Page> {
        self.record_call(Call::List {
            path: path.to_string(),
            query: query.clone(),
        })?;

        let limit = query
            .get("limit")
            .and_then(|l| l.parse::<usize>().ok())
            .unwrap_or(usize::MAX);

        let matching: Vec<&Value> = self
            .records(path)
            .iter()
            .filter(|record| {
                query
                    .params()
                    .iter()
                    .filter(|(k, _)| !CONTROL_PARAMS.contains(&k.as_str()))
                    .all(|(k, v)| matches_filter(record, k, v))
            })
            .collect();
        // Paginated like the remote: `count` is the total, `results` one page.
        Ok(Page {
            count: Some(matching.len()),
            results: matching.into_iter().take(limit).cloned().collect(),
        })
    }

    fn retrieve(&self, path: &str, id: i64, query: &Query) -> ClientResult<Value> {
        self.record_call(Call::Retrieve {
            path: path.to_string(),
            id,
            query: query.clone(),
        })?;
        self.find(path, id).cloned()
    }

    fn create(&mut self, path: &str, body: &Value) -> ClientResult<Value> {
        self.record_call(Call::Create {
            path: path.to_string(),
            body: body.clone(),
        })?;
        if !body.is_object() {
            return Err(ClientError::Failed {
                status: 400,
                message: "Expected a JSON object".to_string(),
                errors: Default::default(),
            });
        }
        let id = self.insert(path, body.clone());
        self.find(path, id).cloned()
    }

    fn partial_update(&mut self, path: &str, id: i64, body: &Value) -> ClientResult<Value> {
        self.record_call(Call::PartialUpdate {
            path: path.to_string(),
            id,
            body: body.clone(),
        })?;
        let record = self.find_mut(path, id)?;
        let empty = Map::new();
        let patch = body.as_object().unwrap_or(&empty);
        if let Some(map) = record.as_object_mut() {
            for (k, v) in patch {
                map.insert(k.clone(), v.clone());
            }
        }
        Ok(record.clone())
    }

    fn delete(&mut self, path: &str, id: i64) -> ClientResult<()> {
        self.record_call(Call::Delete {
            path: path.to_string(),
            id,
        })?;
        self.find(path, id)?;
        if let Some(records) = self.collections.get_mut(path) {
            records.retain(|r| r.get("id").and_then(Value::as_i64) != Some(id));
        }
        Ok(())
    }

    fn action(
        &mut self,
        path: &str,
        id: Option<i64>,
        action: &str,
        body: &Value,
    ) -> ClientResult<ActionResponse> {
        self.record_call(Call::Action {
            path: path.to_string(),
            id,
            action: action.to_string(),
            body: body.clone(),
        })?;
        if let Some(id) = id {
            self.find(path, id)?;
        }
        self.actions
            .get(&(path.to_string(), id, action.to_string()))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("No handler for {}/{}", path, action)))
    }
}

/// Canned records shaped like the remote's payloads.
#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::InMemoryClient;
    use serde_json::{json, Value};

    pub fn software(id: i64, machine_name: &str, name: &str) -> Value {
        json!({
            "id": id,
            "machine_name": machine_name,
            "name": name,
            "description": format!("{} description", name),
            "git_repo_url": format!("https://github.com/caltechads/{}", machine_name),
            "documentation_url": null,
            "trello_board_url": null,
            "repo_created": "2019-03-14T17:02:11Z",
            "repo_modified": "2021-06-01T08:30:00Z",
            "authors": [],
            "applications": [],
        })
    }

    pub fn release(id: i64, software: &Value, version: &str) -> Value {
        json!({
            "id": id,
            "software": software.clone(),
            "software_machine_name": software["machine_name"].clone(),
            "software_id": software["id"].clone(),
            "version": version,
            "sha": "0123abcd",
            "changelog": "Fixed things",
            "release_time": "2021-06-01T08:30:00Z",
            "released_by": {
                "username": "ads",
                "fullname": "Ada Lovelace",
                "email": "ada@example.com",
            },
        })
    }

    /// Two software records and three releases, one of which shares a version.
    pub fn seeded() -> InMemoryClient {
        let mut client = InMemoryClient::new();
        let brigid = software(1, "brigid", "Brigid");
        let cli = software(2, "brigid-cli", "Brigid CLI");
        client.insert("software", brigid.clone());
        client.insert("software", cli.clone());
        client.insert("releases", release(10, &brigid, "1.0.0"));
        client.insert("releases", release(11, &brigid, "1.1.0"));
        client.insert("releases", release(12, &cli, "1.0.0"));
        client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_assigns_ids() {
        let mut client = InMemoryClient::new();
        assert_eq!(client.insert("software", json!({"name": "a"})), 1);
        assert_eq!(client.insert("software", json!({"id": 7, "name": "b"})), 7);
        assert_eq!(client.insert("software", json!({"name": "c"})), 8);
    }

    #[test]
    fn ids_are_numbered_per_collection() {
        let mut client = fixtures::seeded();
        assert_eq!(client.insert("software", json!({"name": "new"})), 3);
        assert_eq!(client.insert("releases", json!({"version": "2.0.0"})), 13);
        assert_eq!(client.insert("applications", json!({"name": "app"})), 1);
    }

    #[test]
    fn list_filters_and_limits() {
        let client = fixtures::seeded();
        let query = Query::new().with("version", "1.0.0").with("limit", "100");
        assert_eq!(client.list("releases", &query).unwrap().results.len(), 2);

        let query = Query::new().with("software_id", "1");
        assert_eq!(client.list("releases", &query).unwrap().results.len(), 2);

        let query = Query::new().with("limit", "1");
        let page = client.list("releases", &query).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.count, Some(3));
        assert_eq!(page.total(), 3);

        assert!(client.list("nothing", &Query::new()).unwrap().results.is_empty());
    }

    #[test]
    fn partial_update_merges_fields() {
        let mut client = fixtures::seeded();
        let updated = client
            .partial_update("software", 1, &json!({"name": "Renamed"}))
            .unwrap();
        assert_eq!(updated["name"], "Renamed");
        assert_eq!(updated["machine_name"], "brigid");
    }

    #[test]
    fn missing_records_are_not_found() {
        let mut client = fixtures::seeded();
        assert!(matches!(
            client.retrieve("software", 99, &Query::new()),
            Err(ClientError::NotFound(_))
        ));
        assert!(matches!(
            client.delete("software", 99),
            Err(ClientError::NotFound(_))
        ));
    }

    #[test]
    fn queued_failures_and_call_log() {
        let client = fixtures::seeded();
        client.fail_next(ClientError::Failed {
            status: 500,
            message: "boom".into(),
            errors: Default::default(),
        });
        assert!(client.list("software", &Query::new()).is_err());
        assert!(client.list("software", &Query::new()).is_ok());
        assert_eq!(client.calls().len(), 2);
    }
}
