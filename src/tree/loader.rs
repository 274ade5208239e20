use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, TreeError};
use crate::protocol::{ChildDescriptor, TreeRequest};
use crate::transport::Transport;

/// Side-channel callback for user-visible error display.
pub type ErrorHandler = Box<dyn Fn(&TreeError) + Send + Sync>;

/// Gateway used by every node of one tree to list and create remote
/// directories.
///
/// One `Loader` is created per tree session and [`close`](Loader::close)d
/// when its consumer goes away; apart from the closed flag it holds no
/// mutable state.
pub struct Loader {
    root_label: String,
    endpoint_uri: String,
    allow_create: bool,
    closed: AtomicBool,
    transport: Arc<dyn Transport>,
    error_handler: Option<ErrorHandler>,
}

impl Loader {
    pub fn new(
        root_label: impl Into<String>,
        endpoint_uri: impl Into<String>,
        allow_create: bool,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            root_label: root_label.into(),
            endpoint_uri: endpoint_uri.into(),
            allow_create,
            closed: AtomicBool::new(false),
            transport,
            error_handler: None,
        }
    }

    /// Attach the error-display handler.
    pub fn with_error_handler(
        mut self,
        handler: impl Fn(&TreeError) + Send + Sync + 'static,
    ) -> Self {
        self.error_handler = Some(Box::new(handler));
        self
    }

    /// Display name for the tree root when its path is empty.
    pub fn root_label(&self) -> &str {
        &self.root_label
    }

    /// Identifier of the remote storage root this tree browses.
    pub fn endpoint_uri(&self) -> &str {
        &self.endpoint_uri
    }

    /// Whether non-root nodes offer a create-folder slot.
    pub fn allow_create(&self) -> bool {
        self.allow_create
    }

    /// Stop delivering errors to the external handler. Late-arriving
    /// failures from in-flight requests are logged instead.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn request(&self, path: &str) -> TreeRequest {
        TreeRequest {
            endpoint_uri: self.endpoint_uri.clone(),
            path: path.to_string(),
        }
    }

    fn report(&self, err: &TreeError) {
        if self.is_closed() {
            tracing::warn!(error = %err, "loader closed, dropping error");
            return;
        }
        match &self.error_handler {
            Some(handler) => handler(err),
            None => tracing::warn!(error = %err, "no error handler set"),
        }
    }

    /// List the children of `path` (`""` or `"/"` is the root).
    ///
    /// An empty listing for the root is the empty-root sentinel failure;
    /// an empty non-root folder is a valid empty result. Every failure
    /// is routed through the error handler, then returned to the caller.
    pub async fn ls(&self, path: &str) -> Result<Vec<ChildDescriptor>> {
        let result = self.ls_inner(path).await;
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    async fn ls_inner(&self, path: &str) -> Result<Vec<ChildDescriptor>> {
        let response = self.transport.list(&self.request(path)).await?;
        let children = response.children;
        if (path.is_empty() || path == "/") && children.is_empty() {
            return Err(TreeError::EmptyRoot);
        }
        Ok(children)
    }

    /// Create a directory at `path`. Failures are logged, routed through
    /// the error handler, and returned.
    pub async fn mkdir(&self, path: &str) -> Result<()> {
        match self.transport.create(&self.request(path)).await {
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::error!(error = %err, path, "mkdir failed");
                self.report(&err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{collection, MockTransport, Op};
    use std::sync::Mutex;

    fn loader_with(transport: &MockTransport) -> Loader {
        Loader::new("Server", "fs:///data", false, Arc::new(transport.clone()))
    }

    /// Collects handler invocations for assertions.
    fn capturing_handler() -> (Arc<Mutex<Vec<String>>>, impl Fn(&TreeError) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = move |err: &TreeError| {
            sink.lock().expect("handler sink lock").push(err.to_string());
        };
        (seen, handler)
    }

    #[tokio::test]
    async fn ls_returns_children() {
        let transport = MockTransport::default();
        transport.set_children("/sub", vec![collection("/sub/a"), collection("/sub/b")]);
        let loader = loader_with(&transport);

        let children = loader.ls("/sub").await.unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(transport.calls(), vec![(Op::List, "/sub".to_string())]);
    }

    #[tokio::test]
    async fn empty_root_is_an_error_for_both_spellings() {
        let transport = MockTransport::default();
        transport.set_children("", vec![]);
        transport.set_children("/", vec![]);
        let loader = loader_with(&transport);

        assert!(loader.ls("").await.unwrap_err().is_empty_root());
        assert!(loader.ls("/").await.unwrap_err().is_empty_root());
    }

    #[tokio::test]
    async fn empty_non_root_folder_is_valid() {
        let transport = MockTransport::default();
        transport.set_children("/sub", vec![]);
        let loader = loader_with(&transport);

        assert!(loader.ls("/sub").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failures_reach_the_error_handler_and_the_caller() {
        let transport = MockTransport::default();
        transport.set_list_error("/sub", "endpoint unavailable");
        let (seen, handler) = capturing_handler();
        let loader = loader_with(&transport).with_error_handler(handler);

        let err = loader.ls("/sub").await.unwrap_err();
        assert!(err.to_string().contains("endpoint unavailable"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_root_sentinel_also_routes_through_handler() {
        let transport = MockTransport::default();
        transport.set_children("", vec![]);
        let (seen, handler) = capturing_handler();
        let loader = loader_with(&transport).with_error_handler(handler);

        let _ = loader.ls("").await;
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["remote root is empty or inaccessible"]
        );
    }

    #[tokio::test]
    async fn close_gates_the_handler() {
        let transport = MockTransport::default();
        transport.set_list_error("/sub", "boom");
        let (seen, handler) = capturing_handler();
        let loader = loader_with(&transport).with_error_handler(handler);

        loader.close();
        let result = loader.ls("/sub").await;
        // Still fails for the caller, but the handler never hears of it.
        assert!(result.is_err());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mkdir_success_and_failure() {
        let transport = MockTransport::default();
        transport.set_create_ok("/sub/new");
        transport.set_create_error("/sub/denied", "read-only endpoint");
        let (seen, handler) = capturing_handler();
        let loader = loader_with(&transport).with_error_handler(handler);

        loader.mkdir("/sub/new").await.unwrap();
        let err = loader.mkdir("/sub/denied").await.unwrap_err();
        assert!(err.to_string().contains("read-only endpoint"));
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(
            transport.calls(),
            vec![
                (Op::Create, "/sub/new".to_string()),
                (Op::Create, "/sub/denied".to_string()),
            ]
        );
    }
}
