use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, TreeError};
use crate::protocol::{ChildDescriptor, TreeRequest, TreeResponse};

use super::Transport;

/// Which wire operation a scripted response belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Op {
    List,
    Create,
}

#[derive(Clone, Debug)]
enum Response {
    Ok(Vec<ChildDescriptor>),
    Err(String),
}

/// Scripted transport for tests: per-path responses, call recording,
/// and optional per-path delays for exercising overlapping loads.
///
/// The response is captured when a call starts; a delayed call returns
/// what was scripted at call time even if the script changed since.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    responses: HashMap<(Op, String), Response>,
    delays: HashMap<(Op, String), Duration>,
    calls: Vec<(Op, String)>,
}

impl MockTransport {
    pub fn set_children(&self, path: impl Into<String>, entries: Vec<ChildDescriptor>) {
        let mut inner = self.inner.lock().expect("mock transport lock");
        inner
            .responses
            .insert((Op::List, path.into()), Response::Ok(entries));
    }

    pub fn set_list_error(&self, path: impl Into<String>, message: impl Into<String>) {
        let mut inner = self.inner.lock().expect("mock transport lock");
        inner
            .responses
            .insert((Op::List, path.into()), Response::Err(message.into()));
    }

    pub fn set_create_ok(&self, path: impl Into<String>) {
        let mut inner = self.inner.lock().expect("mock transport lock");
        inner
            .responses
            .insert((Op::Create, path.into()), Response::Ok(Vec::new()));
    }

    pub fn set_create_error(&self, path: impl Into<String>, message: impl Into<String>) {
        let mut inner = self.inner.lock().expect("mock transport lock");
        inner
            .responses
            .insert((Op::Create, path.into()), Response::Err(message.into()));
    }

    pub fn set_list_delay(&self, path: impl Into<String>, delay: Duration) {
        let mut inner = self.inner.lock().expect("mock transport lock");
        inner.delays.insert((Op::List, path.into()), delay);
    }

    pub fn clear_list_delay(&self, path: &str) {
        let mut inner = self.inner.lock().expect("mock transport lock");
        inner.delays.remove(&(Op::List, path.to_string()));
    }

    pub fn calls(&self) -> Vec<(Op, String)> {
        let inner = self.inner.lock().expect("mock transport lock");
        inner.calls.clone()
    }

    async fn respond(&self, op: Op, request: &TreeRequest) -> Result<TreeResponse> {
        let key = (op, request.path.clone());
        let (response, delay) = {
            let mut inner = self.inner.lock().expect("mock transport lock");
            inner.calls.push(key.clone());
            (
                inner.responses.get(&key).cloned(),
                inner.delays.get(&key).copied(),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match response {
            Some(Response::Ok(children)) => Ok(TreeResponse { children }),
            Some(Response::Err(message)) => Err(TreeError::Server(message)),
            None => Err(TreeError::Server(format!(
                "no mock response for {:?} {}",
                key.0, key.1
            ))),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn list(&self, request: &TreeRequest) -> Result<TreeResponse> {
        self.respond(Op::List, request).await
    }

    async fn create(&self, request: &TreeRequest) -> Result<TreeResponse> {
        self.respond(Op::Create, request).await
    }
}

/// Build a COLLECTION descriptor, as the daemon would list a folder.
pub fn collection(path: &str) -> ChildDescriptor {
    ChildDescriptor {
        path: path.to_string(),
        node_type: crate::protocol::COLLECTION.to_string(),
        meta_store: None,
    }
}

/// Build a plain-file (leaf) descriptor.
pub fn leaf(path: &str) -> ChildDescriptor {
    ChildDescriptor {
        path: path.to_string(),
        node_type: "LEAF".to_string(),
        meta_store: None,
    }
}
