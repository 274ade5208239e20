mod loader;
mod node;

pub use loader::{ErrorHandler, Loader};
pub use node::{NodeId, Notifier, TreeNode};
