//! HTTP transport for EWS and autodiscover requests

use crate::credentials::Credentials;
use crate::error::EwsResult;
use crate::types::TransportResponse;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Sends an XML request body to an endpoint as the given user
///
/// Non-2xx statuses are returned as responses, not errors; only failures to
/// get any response at all are errors.
#[async_trait]
pub trait EwsTransport: Send + Sync {
    async fn post(
        &self,
        url: &Url,
        credentials: &Credentials,
        body: String,
    ) -> EwsResult<TransportResponse>;
}

/// reqwest-backed transport using HTTP basic authentication
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EwsTransport for HttpTransport {
    async fn post(
        &self,
        url: &Url,
        credentials: &Credentials,
        body: String,
    ) -> EwsResult<TransportResponse> {
        debug!("EWS: POST {} ({} bytes)", url, body.len());

        let response = self
            .client
            .post(url.clone())
            .basic_auth(credentials.username(), Some(credentials.password()))
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .timeout(self.timeout)
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("EWS: {} answered {}", url, status);

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EwsError;
    use wiremock::matchers::{basic_auth, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_sends_basic_auth_and_xml() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/EWS/Exchange.asmx"))
            .and(basic_auth("host\\john", "Passw0rd!"))
            .and(header("content-type", "text/xml; charset=utf-8"))
            .and(body_string_contains("<ping/>"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<pong/>"))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/EWS/Exchange.asmx", server.uri())).unwrap();
        let creds = Credentials::new("host\\john", "Passw0rd!").unwrap();
        let response = HttpTransport::new()
            .post(&url, &creds, "<ping/>".to_string())
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.body, "<pong/>");
    }

    #[tokio::test]
    async fn test_error_status_is_a_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let creds = Credentials::new("john", "").unwrap();
        let response = HttpTransport::new()
            .post(&url, &creds, String::new())
            .await
            .unwrap();

        assert_eq!(response.status, 500);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_unreachable_is_transport_error() {
        // Port 9 (discard) is not expected to be listening on loopback.
        let url = Url::parse("http://127.0.0.1:9/autodiscover/autodiscover.xml").unwrap();
        let creds = Credentials::new("john", "").unwrap();
        let err = HttpTransport::new()
            .timeout(Duration::from_secs(5))
            .post(&url, &creds, String::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EwsError::Transport(_)));
    }
}
