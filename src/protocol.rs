//! Wire types for the daemon's `/tree` endpoint.
//!
//! The daemon speaks Go-style field casing (`EndpointURI`, `Path`,
//! `Children`), so every field carries an explicit rename. Unknown
//! fields are tolerated — the daemon sends far more metadata than the
//! browser needs.

use serde::{Deserialize, Serialize};

/// Entry type marking a directory-like node. Only these become tree nodes.
pub const COLLECTION: &str = "COLLECTION";

/// Request envelope shared by the list (POST) and create (PUT) calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeRequest {
    /// Identifier selecting which remote storage root the call targets.
    #[serde(rename = "EndpointURI")]
    pub endpoint_uri: String,
    /// Path within that root; `""` or `"/"` is the root itself.
    #[serde(rename = "Path")]
    pub path: String,
}

/// Successful response body for both calls. `mkdir` responses are
/// parsed but otherwise unused.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeResponse {
    #[serde(rename = "Children", default)]
    pub children: Vec<ChildDescriptor>,
}

/// One entry of a listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChildDescriptor {
    #[serde(rename = "Path", default)]
    pub path: String,
    #[serde(rename = "Type", default)]
    pub node_type: String,
    #[serde(rename = "MetaStore", default)]
    pub meta_store: Option<MetaStore>,
}

/// Node metadata; only the workspace label is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaStore {
    pub ws_label: Option<String>,
}

/// Error body attached to HTTP 500 responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

impl ChildDescriptor {
    /// Whether this entry is directory-like and should become a node.
    pub fn is_collection(&self) -> bool {
        self.node_type == COLLECTION
    }

    /// Display label from metadata, with the JSON-encoding quotes the
    /// daemon stores stripped out.
    pub fn ws_label(&self) -> Option<String> {
        self.meta_store
            .as_ref()
            .and_then(|m| m.ws_label.as_ref())
            .map(|label| label.replace('"', ""))
    }
}
