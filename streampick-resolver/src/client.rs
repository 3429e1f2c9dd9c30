//! Metadata Service HTTP Client

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{check_response, json_with_limit, FetchError};
use crate::source::VideoId;
use crate::types::{Endpoint, RawPayload};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client for default-configured instances (connection pooling)
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    build_client(&ClientOptions::default()).expect("Failed to build shared metadata HTTP client")
});

/// Capability to fetch the raw metadata payload of a video.
///
/// Implementations must be safe to share between concurrent resolutions.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_metadata(
        &self,
        id: &VideoId,
        endpoint: &Endpoint,
    ) -> Result<RawPayload, FetchError>;
}

/// Timeouts applied to every metadata request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

fn build_client(options: &ClientOptions) -> Result<Client, FetchError> {
    Client::builder()
        .connect_timeout(options.connect_timeout)
        .timeout(options.request_timeout)
        .pool_max_idle_per_host(10)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| FetchError::Network(e.to_string()))
}

/// `reqwest`-backed [`MetadataSource`]
#[derive(Debug, Clone)]
pub struct MetadataClient {
    client: Client,
}

impl MetadataClient {
    /// Create a client with default timeouts (reuses shared connection pool)
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: SHARED_CLIENT.clone(),
        }
    }

    /// Create a client with its own connection pool and timeouts
    pub fn with_options(options: &ClientOptions) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(options)?,
        })
    }
}

impl Default for MetadataClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataSource for MetadataClient {
    async fn fetch_metadata(
        &self,
        id: &VideoId,
        endpoint: &Endpoint,
    ) -> Result<RawPayload, FetchError> {
        let url = endpoint.base_url();
        debug!(video_id = %id, url = %url, "Fetching stream metadata");

        let req = self.client.get(&url).query(&[("id", id.as_str())]);
        let resp = check_response(req.send().await?)?;
        json_with_limit(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn video_id() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    fn endpoint_of(server: &MockServer) -> Endpoint {
        let addr = server.address();
        Endpoint::new(addr.ip().to_string(), addr.port())
    }

    #[tokio::test]
    async fn test_fetch_sends_id_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("id", "dQw4w9WgXcQ"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "data": { "statusCode": 404 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let payload = MetadataClient::new()
            .fetch_metadata(&video_id(), &endpoint_of(&server))
            .await
            .unwrap();

        assert!(!payload.success);
        assert_eq!(payload.data.unwrap().status_code, Some(404));
    }

    #[tokio::test]
    async fn test_fetch_maps_server_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = MetadataClient::new()
            .fetch_metadata(&video_id(), &endpoint_of(&server))
            .await
            .unwrap_err();

        match err {
            FetchError::Http { status, url } => {
                assert_eq!(status.as_u16(), 503);
                assert!(url.contains("id=dQw4w9WgXcQ"));
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_maps_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = MetadataClient::new()
            .fetch_metadata(&video_id(), &endpoint_of(&server))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Parse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = MetadataClient::with_options(&ClientOptions {
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_millis(100),
        })
        .unwrap();

        let err = client
            .fetch_metadata(&video_id(), &endpoint_of(&server))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout(_)), "got {err:?}");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = MetadataClient::new()
            .fetch_metadata(&video_id(), &Endpoint::new("127.0.0.1", port))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_unbuildable_endpoint_is_not_transient() {
        let err = MetadataClient::new()
            .fetch_metadata(&video_id(), &Endpoint::new("bad host", 80))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::InvalidEndpoint(_)), "got {err:?}");
        assert!(!err.is_transient());
    }
}
