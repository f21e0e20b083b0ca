use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::transport::{
    Method, Transport, TransportRequest, TransportResponse, CONTENT_TYPE_JSON, CONTENT_TYPE_NDJSON,
};
use bytes::Bytes;
use quarry::prelude::*;
use quarry::response::StoreError;
use serde::Deserialize;
use tracing::{debug, warn};

/// Error body of a failed request
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<StoreError>,
}

/// Sends compiled requests through a [`Transport`] and decodes the responses
pub struct Client<T> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a search. The request is validated before anything is sent.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let mut request = request.clone();
        if request.indices.is_empty() {
            if let Some(index) = &self.config.default_index {
                request.indices.push(index.clone());
            }
        }
        if request.track_total_hits.is_none() {
            request.track_total_hits = self.config.track_total_hits;
        }

        let body = request.to_bytes()?;
        let response = self
            .send(Method::Post, request.path(), body, CONTENT_TYPE_JSON)
            .await?;
        Ok(SearchResponse::from_slice(&response.body)?)
    }

    /// Run a bulk request. Per-item failures are reported in the response,
    /// not as an error.
    pub async fn bulk(&self, mut request: BulkRequest) -> Result<BulkResponse> {
        if request.default_index.is_none() {
            request.default_index = self.config.default_index.clone();
        }
        if request.refresh.is_none() {
            request.refresh = self.config.refresh;
        }

        let body = request.to_bytes()?;
        let response = self
            .send(Method::Post, request.path(), body, CONTENT_TYPE_NDJSON)
            .await?;
        Ok(BulkResponse::from_slice(&response.body)?)
    }

    async fn send(
        &self,
        method: Method,
        path: String,
        body: Vec<u8>,
        content_type: &'static str,
    ) -> Result<TransportResponse> {
        let path = self.with_error_trace(path);
        debug!(method = method.as_str(), path = %path, bytes = body.len(), "sending request");

        let response = self
            .transport
            .send(TransportRequest {
                method,
                path: path.clone(),
                body: Some(Bytes::from(body)),
                content_type,
            })
            .await
            .map_err(ClientError::Transport)?;

        debug!(path = %path, status = response.status, "received response");
        if !response.is_success() {
            let error = serde_json::from_slice::<ErrorBody>(&response.body)
                .ok()
                .and_then(|body| body.error);
            warn!(path = %path, status = response.status, "request failed");
            return Err(ClientError::Status {
                status: response.status,
                error,
            });
        }
        Ok(response)
    }

    fn with_error_trace(&self, mut path: String) -> String {
        if self.config.error_trace {
            path.push(if path.contains('?') { '&' } else { '?' });
            path.push_str("error_trace=true");
        }
        path
    }
}
