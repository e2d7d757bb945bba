use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::request::FetchRequestDescriptor;

pub const DEFAULT_IMAGERY_URL: &str = "https://nasa-fetcher.onrender.com/at";

/// HTTP client for the imagery service.
///
/// Each call is a single attempt: no retries and no backoff.
#[derive(Debug, Clone)]
pub struct ImageryClient {
    http: Client,
    endpoint: String,
}

impl ImageryClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `request` as JSON and return the image bytes of a 2xx response.
    pub async fn fetch(&self, request: &FetchRequestDescriptor) -> Result<Bytes, FetchError> {
        let resp = self.http.post(&self.endpoint).json(request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), endpoint = %self.endpoint, "imagery request rejected");
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        debug!(len = bytes.len(), "imagery received");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::ImageryClient;
    use crate::error::FetchError;
    use crate::request::{FetchRequestDescriptor, ResolutionTier, TextureMode, TimeEpoch};
    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use foundation::math::GeoPoint;
    use std::time::Duration;

    async fn echo_type(Json(body): Json<serde_json::Value>) -> (StatusCode, Vec<u8>) {
        let kind = body
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .as_bytes()
            .to_vec();
        (StatusCode::OK, kind)
    }

    async fn unavailable() -> StatusCode {
        StatusCode::SERVICE_UNAVAILABLE
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/at")
    }

    fn request() -> FetchRequestDescriptor {
        FetchRequestDescriptor::new(
            GeoPoint::new(10.0, 20.0).expect("valid"),
            ResolutionTier(4),
            TextureMode::Medium1km,
            TimeEpoch::new(2024),
        )
    }

    #[tokio::test]
    async fn posts_json_and_returns_body() {
        let url = serve(Router::new().route("/at", post(echo_type))).await;
        let client = ImageryClient::new(url, Duration::from_secs(5)).expect("client");

        let bytes = client.fetch(&request()).await.expect("fetch");
        assert_eq!(&bytes[..], b"1km");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let url = serve(Router::new().route("/at", post(unavailable))).await;
        let client = ImageryClient::new(url, Duration::from_secs(5)).expect("client");

        assert_eq!(client.fetch(&request()).await, Err(FetchError::Status(503)));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let client = ImageryClient::new(format!("http://{addr}/at"), Duration::from_secs(5))
            .expect("client");
        assert!(matches!(
            client.fetch(&request()).await,
            Err(FetchError::Network(_))
        ));
    }
}
