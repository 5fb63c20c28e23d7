//! HTTP transport.

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const CONTENT_TYPE_SOAP: &str = "text/xml; charset=utf-8";

/// Posts an encoded envelope and returns the raw response body.
///
/// Any status other than 200 is a [`ClientError::Transport`] that keeps the
/// body, so a fault sent with HTTP 500 can still be inspected through
/// [`ClientError::transport_fault`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, endpoint: &str, action: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn post(&self, endpoint: &str, action: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        (**self).post(endpoint, action, body).await
    }
}

/// [`Transport`] over reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                status: None,
                message: format!("failed to create HTTP client: {e}"),
                body: None,
            })?;
        Ok(Self { http })
    }

    /// Use an already configured client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, endpoint: &str, action: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let soap_action = HeaderValue::from_str(action).map_err(|e| ClientError::Transport {
            status: None,
            message: format!("invalid SOAPAction {action:?}: {e}"),
            body: None,
        })?;

        let response = self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, CONTENT_TYPE_SOAP)
            .header("SOAPAction", soap_action)
            .body(body)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                status: e.status().map(|s| s.as_u16()),
                message: format!("request to {endpoint} failed: {e}"),
                body: None,
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport {
                status: Some(status.as_u16()),
                message: format!("failed to read response body: {e}"),
                body: None,
            })?
            .to_vec();

        debug!(status = status.as_u16(), bytes = bytes.len(), "HTTP response");

        if status != StatusCode::OK {
            return Err(ClientError::Transport {
                status: Some(status.as_u16()),
                message: format!("HTTP {status}"),
                body: Some(bytes),
            });
        }
        Ok(bytes)
    }
}
