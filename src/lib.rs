pub mod config;
pub mod error;
pub mod protocol;
pub mod render;
pub mod transport;
pub mod tree;

pub use error::{Result, TreeError};
pub use transport::{HttpTransport, Transport};
pub use tree::{Loader, NodeId, TreeNode};
