//! HTTP-backed page fetcher for catalog operations

use super::request::{JsonPage, OperationRequest};
use super::types::OperationDefinition;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::pagination::PageFetcher;
use crate::types::JsonValue;
use async_trait::async_trait;
use tracing::debug;

/// Fetches pages of one operation over HTTP.
///
/// The client's base URL is the operation's service endpoint. Remote
/// failures are wrapped in [`Error::Page`] naming the operation.
pub struct HttpPageFetcher {
    client: HttpClient,
    definition: OperationDefinition,
}

impl HttpPageFetcher {
    /// Create a fetcher for `definition` using `client`
    pub fn new(client: HttpClient, definition: OperationDefinition) -> Self {
        Self { client, definition }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    type Request = OperationRequest;
    type Response = JsonPage;

    async fn fetch_page(&self, request: &OperationRequest) -> Result<JsonPage> {
        debug!(
            operation = %self.definition.name,
            method = ?request.method,
            path = %request.path,
            "calling service"
        );

        let body: JsonValue = self
            .client
            .request_json(request.method, &request.path, request.to_request_config())
            .await
            .map_err(|e| Error::page(&self.definition.name, e))?;

        JsonPage::from_body(body, &self.definition)
            .map_err(|e| Error::page(&self.definition.name, e))
    }
}
