//! Transport seam for the management API

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Outcome of a single request-response exchange
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// A single exchange against the management API
///
/// Implementations perform no retries, caching or reconciliation; the
/// remote service is the sole source of truth.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse>;
}

/// HTTP/1.1 transport
#[derive(Debug)]
pub struct HttpTransport {
    endpoint: Url,
    token: Option<String>,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpTransport {
    /// Create a transport for the given endpoint
    ///
    /// The endpoint is the management gateway base URL; an optional bearer
    /// token is attached to every request.
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ClientError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if endpoint.scheme() != "http" {
            return Err(ClientError::InvalidEndpoint(format!(
                "{}: only http endpoints are supported",
                endpoint
            )));
        }

        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self {
            endpoint,
            token,
            client,
        })
    }

    fn uri_for(&self, path: &str) -> Result<hyper::Uri> {
        let url = self
            .endpoint
            .join(path)
            .map_err(|e| ClientError::InvalidEndpoint(format!("{}: {}", path, e)))?;
        url.as_str()
            .parse()
            .map_err(|e| ClientError::InvalidEndpoint(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse> {
        let uri = self.uri_for(path)?;
        debug!("{} {}", method, uri);

        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(value) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from(value.to_string()))),
            None => builder.body(Full::new(Bytes::new())),
        }
        .map_err(|e| ClientError::Transport(e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        debug!("response status {}", status);
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_endpoint() {
        assert!(matches!(
            HttpTransport::new("https://mgmt.example", None).unwrap_err(),
            ClientError::InvalidEndpoint(_)
        ));
        assert!(matches!(
            HttpTransport::new("not a url", None).unwrap_err(),
            ClientError::InvalidEndpoint(_)
        ));
    }

    #[test]
    fn test_uri_join() {
        let transport = HttpTransport::new("http://127.0.0.1:8765", None).unwrap();
        let uri = transport
            .uri_for("/workspaces/ws-dev?api-version=2024-04-01")
            .unwrap();
        assert_eq!(
            uri.to_string(),
            "http://127.0.0.1:8765/workspaces/ws-dev?api-version=2024-04-01"
        );
    }
}
