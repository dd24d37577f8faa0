//! Request executors
//!
//! `RequestExecutor` is the seam between the resolution core and the
//! network. `HttpExecutor` is the reqwest implementation.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    header::{HeaderValue, ACCEPT, CONTENT_TYPE},
    Client,
};
use tracing::debug;

use super::request::Request;
use crate::error::{bytes_with_limit, check_response, ClientError};

/// Shared HTTP client for all backend requests (connection pooling)
/// Redirects are disabled to prevent SSRF via redirect to private IPs.
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build shared OTT HTTP client")
});

/// Sends one request and delivers its raw body exactly once.
///
/// An empty body is a successful send; interpreting it is the caller's job.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn send(&self, request: &Request) -> Result<Bytes, ClientError>;
}

/// reqwest-backed executor
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// Create an executor on the shared connection pool
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: SHARED_CLIENT.clone(),
        }
    }

    /// Create an executor with its own timeouts
    pub fn with_timeouts(connect_timeout: Duration, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

impl Default for HttpExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn send(&self, request: &Request) -> Result<Bytes, ClientError> {
        let url = request.url()?;
        debug!(url = %url, multi = request.is_multi(), "sending OTT request");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(&request.body())
            .send()
            .await?;

        let response = check_response(response)?;
        let body = bytes_with_limit(response).await?;
        debug!(bytes = body.len(), "OTT response received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phoenix::request::{OttRequest, CLIENT_TAG};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_posts_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api_v3/service/ottUser/action/anonymousLogin"))
            .and(body_partial_json(serde_json::json!({
                "partnerId": 3,
                "clientTag": CLIENT_TAG,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"result":{"ks":"abc"}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let request = OttRequest::new(format!("{}/api_v3", server.uri()), "ottUser", "anonymousLogin")
            .with_param("partnerId", 3);
        let body = HttpExecutor::new().send(&request.into()).await.unwrap();
        assert_eq!(&body[..], br#"{"result":{"ks":"abc"}}"#);
    }

    #[tokio::test]
    async fn test_send_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let request = OttRequest::new(server.uri(), "asset", "getPlaybackContext");
        let err = HttpExecutor::new().send(&request.into()).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Http { status, .. } if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn test_send_returns_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let request = OttRequest::new(server.uri(), "asset", "getPlaybackContext");
        let body = HttpExecutor::new().send(&request.into()).await.unwrap();
        assert!(body.is_empty());
    }
}
