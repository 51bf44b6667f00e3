//! Dashboard platform API.

use crate::error::{CliError, Result};
use serde_json::{json, Value};
use tracing::{debug, info};

const CATEGORY_KEY: &str = "categoryUuid";

/// Result of a create or update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemoteOutcome {
    pub(crate) status: u16,
    pub(crate) uuid: Option<String>,
}

/// Remote dashboard storage.
pub(crate) trait DashboardApi {
    /// Create a dashboard in `category`.
    fn create(&self, document: &Value, category: &str) -> Result<RemoteOutcome>;

    /// Replace the dashboard `uuid`, keeping its category.
    fn update(&self, uuid: &str, document: &Value) -> Result<RemoteOutcome>;
}

/// Wrap `document` as `{categoryUuid, data}` unless it already is.
pub(crate) fn wrap(document: &Value, category: &str) -> Value {
    if document.get(CATEGORY_KEY).is_some() {
        document.clone()
    } else {
        json!({ CATEGORY_KEY: category, "data": document })
    }
}

fn response_uuid(body: &Value) -> Option<String> {
    body.get("uuid")
        .or_else(|| body.get("data").and_then(|d| d.get("uuid")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// HTTP implementation over `reqwest`'s blocking client.
pub(crate) struct HttpClient {
    base: String,
    api_key: String,
    http: reqwest::blocking::Client,
}

impl HttpClient {
    pub(crate) fn new(base: &str, api_key: String) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            api_key,
            http: reqwest::blocking::Client::new(),
        }
    }

    fn finish(response: reqwest::blocking::Response) -> Result<(u16, Value)> {
        let status = response.status();
        if !status.is_success() {
            return Err(CliError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        let body = response.json().unwrap_or(Value::Null);
        Ok((status.as_u16(), body))
    }
}

impl DashboardApi for HttpClient {
    fn create(&self, document: &Value, category: &str) -> Result<RemoteOutcome> {
        let url = format!("{}/create", self.base);
        info!(%url, category, "creating dashboard");
        let response = self
            .http
            .post(&url)
            .query(&[("api_key", &self.api_key)])
            .json(&wrap(document, category))
            .send()?;
        let (status, body) = Self::finish(response)?;
        Ok(RemoteOutcome {
            status,
            uuid: response_uuid(&body),
        })
    }

    fn update(&self, uuid: &str, document: &Value) -> Result<RemoteOutcome> {
        let url = format!("{}/{uuid}", self.base);
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", &self.api_key)])
            .send()?;
        let (_, current) = Self::finish(response)?;
        let category = current
            .get(CATEGORY_KEY)
            .and_then(Value::as_str)
            .unwrap_or("My Dashboards")
            .to_string();
        debug!(uuid, %category, "current dashboard category");

        info!(%url, "updating dashboard");
        let response = self
            .http
            .put(&url)
            .query(&[("api_key", &self.api_key)])
            .json(&json!({ CATEGORY_KEY: category, "data": document }))
            .send()?;
        let (status, _) = Self::finish(response)?;
        Ok(RemoteOutcome {
            status,
            uuid: Some(uuid.to_string()),
        })
    }
}
