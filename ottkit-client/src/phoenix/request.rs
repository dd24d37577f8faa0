//! Phoenix request values
//!
//! Requests are plain values: a service/action pair plus body parameters.
//! Several of them can be bundled into one multi-request, where later
//! entries may reference earlier results through placeholders that the
//! backend resolves.

use serde_json::{Map, Value};
use url::Url;

use crate::error::ClientError;

/// Client tag sent with every request. Part of the backend compatibility contract.
pub const CLIENT_TAG: &str = "java:16-09-10";

/// API version sent with every request. Part of the backend compatibility contract.
pub const API_VERSION: &str = "3.6.1078.11798";

const CLIENT_TAG_KEY: &str = "clientTag";
const API_VERSION_KEY: &str = "apiVersion";

/// Build a placeholder that the backend replaces with a field of an earlier
/// multi-request result. Indices are 1-based, matching the body keys.
///
/// `result_reference(1, "ks")` yields `"{1:result:ks}"`.
#[must_use]
pub fn result_reference(index: usize, field: &str) -> String {
    format!("{{{index}:result:{field}}}")
}

/// A single service/action call.
#[derive(Debug, Clone, PartialEq)]
pub struct OttRequest {
    base_url: String,
    service: String,
    action: String,
    params: Map<String, Value>,
}

impl OttRequest {
    pub fn new(
        base_url: impl Into<String>,
        service: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            service: service.into(),
            action: action.into(),
            params: Map::new(),
        }
    }

    /// Set a body parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Body parameters without the client identification fields
    #[must_use]
    pub const fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// `{base}/service/{service}/action/{action}`
    pub fn url(&self) -> Result<Url, ClientError> {
        let url = format!(
            "{}/service/{}/action/{}",
            self.base_url.trim_end_matches('/'),
            self.service,
            self.action
        );
        Ok(Url::parse(&url)?)
    }

    /// JSON body for a standalone call
    #[must_use]
    pub fn body(&self) -> Value {
        let mut body = self.params.clone();
        insert_client_params(&mut body);
        Value::Object(body)
    }

    /// JSON entry for this call inside a multi-request body
    fn multi_entry(&self) -> Value {
        let mut entry = self.params.clone();
        entry.insert("service".to_string(), Value::String(self.service.clone()));
        entry.insert("action".to_string(), Value::String(self.action.clone()));
        Value::Object(entry)
    }
}

/// Several calls sent as one `service/multirequest` round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiRequest {
    base_url: String,
    requests: Vec<OttRequest>,
}

impl MultiRequest {
    #[must_use]
    pub fn requests(&self) -> &[OttRequest] {
        &self.requests
    }

    pub fn url(&self) -> Result<Url, ClientError> {
        let url = format!("{}/service/multirequest", self.base_url.trim_end_matches('/'));
        Ok(Url::parse(&url)?)
    }

    #[must_use]
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        for (idx, request) in self.requests.iter().enumerate() {
            body.insert((idx + 1).to_string(), request.multi_entry());
        }
        insert_client_params(&mut body);
        Value::Object(body)
    }
}

/// Collects sub-requests for a multi-request.
#[derive(Debug, Clone)]
pub struct MultiRequestBuilder {
    base_url: String,
    requests: Vec<OttRequest>,
}

impl MultiRequestBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            requests: Vec::new(),
        }
    }

    /// Append a sub-request and return its 1-based index, usable with
    /// [`result_reference`].
    pub fn add(&mut self, request: OttRequest) -> usize {
        self.requests.push(request);
        self.requests.len()
    }

    #[must_use]
    pub fn build(self) -> Request {
        Request::Multi(MultiRequest {
            base_url: self.base_url,
            requests: self.requests,
        })
    }
}

/// Anything the executor can send.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Single(OttRequest),
    Multi(MultiRequest),
}

impl Request {
    pub fn url(&self) -> Result<Url, ClientError> {
        match self {
            Self::Single(request) => request.url(),
            Self::Multi(multi) => multi.url(),
        }
    }

    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            Self::Single(request) => request.body(),
            Self::Multi(multi) => multi.body(),
        }
    }

    #[must_use]
    pub const fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }
}

impl From<OttRequest> for Request {
    fn from(request: OttRequest) -> Self {
        Self::Single(request)
    }
}

fn insert_client_params(body: &mut Map<String, Value>) {
    body.insert(CLIENT_TAG_KEY.to_string(), Value::String(CLIENT_TAG.to_string()));
    body.insert(API_VERSION_KEY.to_string(), Value::String(API_VERSION.to_string()));
}
