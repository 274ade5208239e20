use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::error::{Result, TreeError};
use crate::protocol::{ErrorBody, TreeRequest, TreeResponse};

use super::Transport;

/// HTTP transport against the daemon's `/tree` endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    tree_url: Url,
}

impl HttpTransport {
    /// Build a transport for the daemon at `base_url`.
    ///
    /// The daemon's own timeout (if any) is otherwise the only bound on
    /// a request, so the client carries one of its own.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)?;
        let tree_url = base.join("/tree")?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, tree_url })
    }

    async fn call(&self, method: Method, request: &TreeRequest) -> Result<TreeResponse> {
        tracing::debug!(%method, path = %request.path, "tree request");
        let response = self
            .client
            .request(method, self.tree_url.clone())
            .json(request)
            .send()
            .await?;

        // A 500 carries `{"error": "..."}`; a 500 without that field is
        // still a failure, just an anonymous one.
        if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            let message = body
                .error
                .unwrap_or_else(|| "internal server error".to_string());
            return Err(TreeError::Server(message));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn list(&self, request: &TreeRequest) -> Result<TreeResponse> {
        self.call(Method::POST, request).await
    }

    async fn create(&self, request: &TreeRequest) -> Result<TreeResponse> {
        self.call(Method::PUT, request).await
    }
}
