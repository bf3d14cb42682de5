use super::{ActionResponse, ApiClient, ClientError, ClientResult, Page, Query};
use crate::model::{field_errors_from_value, FieldErrors};
use log::{debug, trace};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// Blocking HTTP transport for the remote API.
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `<base>/<path>/[<id>/][<action>/]`
    fn url(&self, path: &str, id: Option<i64>, action: Option<&str>) -> String {
        let mut url = format!("{}/{}/", self.base_url, path.trim_matches('/'));
        if let Some(id) = id {
            url.push_str(&format!("{}/", id));
        }
        if let Some(action) = action {
            url.push_str(&format!("{}/", action.trim_matches('/')));
        }
        url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!("{} {}", method, url);
        let request = self
            .client
            .request(method, url)
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> ClientResult<(u16, Value)> {
        let response = request.send()?;
        let status = response.status().as_u16();
        let text = response.text()?;
        trace!("status={} body={}", status, text);
        let body = translate(status, &text)?;
        Ok((status, body))
    }
}

impl ApiClient for HttpClient {
    fn list(&self, path: &str, query: &Query) -> ClientResult<Page> {
        let url = self.url(path, None, None);
        let request = self.request(Method::GET, &url).query(query.params());
        let (_, body) = self.send(request)?;
        unwrap_list(body)
    }

    fn retrieve(&self, path: &str, id: i64, query: &Query) -> ClientResult<Value> {
        let url = self.url(path, Some(id), None);
        let request = self.request(Method::GET, &url).query(query.params());
        self.send(request).map(|(_, body)| body)
    }

    fn create(&mut self, path: &str, body: &Value) -> ClientResult<Value> {
        let url = self.url(path, None, None);
        let request = self.request(Method::POST, &url).json(body);
        self.send(request).map(|(_, body)| body)
    }

    fn partial_update(&mut self, path: &str, id: i64, body: &Value) -> ClientResult<Value> {
        let url = self.url(path, Some(id), None);
        let request = self.request(Method::PATCH, &url).json(body);
        self.send(request).map(|(_, body)| body)
    }

    fn delete(&mut self, path: &str, id: i64) -> ClientResult<()> {
        let url = self.url(path, Some(id), None);
        self.send(self.request(Method::DELETE, &url)).map(|_| ())
    }

    fn action(
        &mut self,
        path: &str,
        id: Option<i64>,
        action: &str,
        body: &Value,
    ) -> ClientResult<ActionResponse> {
        let url = self.url(path, id, Some(action));
        let request = self.request(Method::POST, &url).json(body);
        let (status, body) = self.send(request)?;
        Ok(ActionResponse { status, body })
    }
}

/// Maps a status and raw body onto the client error vocabulary.
///
/// Success bodies are parsed as JSON; an empty success body (204 on delete) is `Null`.
pub(crate) fn translate(status: u16, text: &str) -> ClientResult<Value> {
    let parsed: Option<Value> = if text.trim().is_empty() {
        None
    } else {
        serde_json::from_str(text).ok()
    };

    if (200..300).contains(&status) {
        return match parsed {
            Some(value) => Ok(value),
            None if text.trim().is_empty() => Ok(Value::Null),
            None => Err(ClientError::UnexpectedResponse(format!(
                "non-JSON body with status {}",
                status
            ))),
        };
    }

    let detail = parsed
        .as_ref()
        .and_then(|v| v.get("detail"))
        .and_then(Value::as_str)
        .map(str::to_string);

    match status {
        404 => Err(ClientError::NotFound(
            detail.unwrap_or_else(|| "Not found.".to_string()),
        )),
        400 => {
            let errors = parsed.as_ref().map(field_errors_without_detail);
            match errors {
                Some(errors) if !errors.is_empty() => Err(ClientError::Invalid(errors)),
                _ => Err(ClientError::Failed {
                    status,
                    message: detail.unwrap_or_else(|| fallback_message(status, text)),
                    errors: FieldErrors::new(),
                }),
            }
        }
        _ => Err(ClientError::Failed {
            status,
            message: detail.unwrap_or_else(|| fallback_message(status, text)),
            errors: parsed
                .as_ref()
                .map(field_errors_without_detail)
                .unwrap_or_default(),
        }),
    }
}

fn field_errors_without_detail(value: &Value) -> FieldErrors {
    let mut errors = field_errors_from_value(value);
    errors.remove("detail");
    errors
}

fn fallback_message(status: u16, text: &str) -> String {
    let text = text.trim();
    if !text.is_empty() && text.len() <= 200 && !text.starts_with('<') {
        return text.to_string();
    }
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}

/// Accepts both the paginated envelope `{"count", "results": [...]}` and a bare array.
pub(crate) fn unwrap_list(body: Value) -> ClientResult<Page> {
    match body {
        Value::Array(results) => Ok(Page {
            results,
            count: None,
        }),
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(results)) => Ok(Page {
                count: map
                    .get("count")
                    .and_then(Value::as_u64)
                    .map(|c| c as usize),
                results,
            }),
            _ => Err(ClientError::UnexpectedResponse(
                "list response has no \"results\" array".to_string(),
            )),
        },
        other => Err(ClientError::UnexpectedResponse(format!(
            "list response is not a collection: {}",
            other
        ))),
    }
}
