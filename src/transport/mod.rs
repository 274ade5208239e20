mod http;

#[cfg(test)]
mod mock;

pub use http::HttpTransport;

#[cfg(test)]
pub use mock::{collection, leaf, MockTransport, Op};

use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::{TreeRequest, TreeResponse};

/// Network capability injected into the [`Loader`](crate::tree::Loader).
///
/// Both operations share the same request envelope; only the HTTP
/// method differs on the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    /// List the children of `request.path` (POST `/tree`).
    async fn list(&self, request: &TreeRequest) -> Result<TreeResponse>;

    /// Create a directory at `request.path` (PUT `/tree`).
    async fn create(&self, request: &TreeRequest) -> Result<TreeResponse>;
}
