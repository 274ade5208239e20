use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Result, TreeError};
use crate::tree::Loader;

/// Tree-wide change observer, injected at root construction and cloned
/// into every created child. Any node mutation reaches this single
/// callback directly — no parent-chain walk, no stale parent hazard
/// after a subtree is rebuilt.
pub type Notifier = Arc<dyn Fn() + Send + Sync>;

/// Node identity: a real remote path, or the synthetic trailing
/// "create folder" slot a creatable node appends after its children.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NodeId {
    /// Full path-like identifier, used as the server-side path key.
    /// The root's path is empty.
    Real(String),
    /// Create-folder UI slot; has no remote counterpart.
    CreatePlaceholder,
}

/// One entry in the lazily-loaded remote directory tree.
///
/// `TreeNode` is a cheap cloneable handle; clones share state. Children
/// are rebuilt wholesale on each successful [`load`](TreeNode::load) and
/// never reused across reloads.
#[derive(Clone)]
pub struct TreeNode {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    id: NodeId,
    depth: usize,
    loader: Arc<Loader>,
    notifier: Option<Notifier>,
    /// Monotonic load generation. A completing request that finds the
    /// generation advanced discards its result instead of overwriting
    /// fresher state.
    generation: AtomicU64,
    state: Mutex<NodeState>,
}

struct NodeState {
    children: Vec<TreeNode>,
    loading: bool,
    loaded: bool,
    collapsed: bool,
    label: Option<String>,
}

impl NodeState {
    fn new(label: Option<String>) -> Self {
        Self {
            children: Vec::new(),
            loading: false,
            loaded: false,
            collapsed: true,
            label,
        }
    }
}

impl TreeNode {
    /// Create the root node of a tree bound to `loader`.
    pub fn root(loader: Arc<Loader>) -> Self {
        Self::new(NodeId::Real(String::new()), 0, loader, None, None)
    }

    /// Create the root node with a change observer. The observer fires
    /// once per mutation anywhere in the tree.
    pub fn root_with_observer(
        loader: Arc<Loader>,
        observer: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            NodeId::Real(String::new()),
            0,
            loader,
            Some(Arc::new(observer)),
            None,
        )
    }

    fn new(
        id: NodeId,
        depth: usize,
        loader: Arc<Loader>,
        notifier: Option<Notifier>,
        label: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                id,
                depth,
                loader,
                notifier,
                generation: AtomicU64::new(0),
                state: Mutex::new(NodeState::new(label)),
            }),
        }
    }

    /// Build a child handle one level below this node, sharing its
    /// loader and notifier.
    fn spawn_child(&self, id: NodeId, label: Option<String>) -> TreeNode {
        TreeNode::new(
            id,
            self.inner.depth + 1,
            Arc::clone(&self.inner.loader),
            self.inner.notifier.clone(),
            label,
        )
    }

    fn state(&self) -> MutexGuard<'_, NodeState> {
        self.inner.state.lock().expect("node state lock")
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn id(&self) -> &NodeId {
        &self.inner.id
    }

    /// Remote path key; `None` for the create-placeholder.
    pub fn path(&self) -> Option<&str> {
        match &self.inner.id {
            NodeId::Real(path) => Some(path),
            NodeId::CreatePlaceholder => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.inner.id, NodeId::CreatePlaceholder)
    }

    /// Number of levels above the root; the root is 0.
    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    /// Last path segment, or the loader's root label for the empty
    /// root path. The create-placeholder has no name of its own.
    pub fn name(&self) -> String {
        match &self.inner.id {
            NodeId::CreatePlaceholder => String::new(),
            NodeId::Real(path) => {
                let base = path.rsplit('/').next().unwrap_or_default();
                if base.is_empty() {
                    self.inner.loader.root_label().to_string()
                } else {
                    base.to_string()
                }
            }
        }
    }

    /// Display override from server metadata, when present.
    pub fn label(&self) -> Option<String> {
        self.state().label.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn is_loaded(&self) -> bool {
        self.state().loaded
    }

    pub fn is_collapsed(&self) -> bool {
        self.state().collapsed
    }

    pub fn set_collapsed(&self, collapsed: bool) {
        self.state().collapsed = collapsed;
    }

    /// Snapshot of the current children (handles, not copies).
    pub fn children(&self) -> Vec<TreeNode> {
        self.state().children.clone()
    }

    /// Invoke the tree-wide observer, if one was registered.
    pub fn notify(&self) {
        if let Some(notifier) = &self.inner.notifier {
            notifier();
        }
    }

    /// Depth-first pre-order traversal over this node and everything
    /// below it. Not mutation-safe during traversal.
    pub fn walk(&self, visitor: &mut dyn FnMut(&TreeNode)) {
        visitor(self);
        for child in self.children() {
            child.walk(visitor);
        }
    }

    // ── Loading ──────────────────────────────────────────────────────────

    /// Fetch this node's children from the remote, optionally
    /// auto-descending into `initial_path`.
    ///
    /// On the create-placeholder this resolves immediately with no state
    /// change and no notification. Failures are absorbed here: the node
    /// ends `loaded` and force-`collapsed`, the previous children are
    /// left untouched, and the error is logged — callers see no
    /// rejection. A load superseded by a newer one on the same node
    /// discards its outcome entirely.
    pub fn load<'a>(
        &'a self,
        initial_path: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let path = match &self.inner.id {
                NodeId::Real(path) => path.clone(),
                NodeId::CreatePlaceholder => return,
            };

            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            {
                let mut state = self.state();
                state.loading = true;
                state.loaded = false;
            }
            self.notify();

            match self.inner.loader.ls(&path).await {
                Ok(entries) => {
                    let mut children = Vec::new();
                    let mut next_child: Option<TreeNode> = None;
                    for entry in &entries {
                        if !entry.is_collection() {
                            continue;
                        }
                        let child =
                            self.spawn_child(NodeId::Real(entry.path.clone()), entry.ws_label());
                        if let Some(target) = initial_path {
                            // The daemon may omit the leading slash on
                            // child paths; normalize before comparing.
                            let mut comp_key = entry.path.clone();
                            if !comp_key.is_empty() && !comp_key.starts_with('/') {
                                comp_key.insert(0, '/');
                            }
                            // Proper-prefix match: descend further, but
                            // not into the target itself. Last matching
                            // sibling wins.
                            if target.starts_with(&comp_key) && target != comp_key {
                                next_child = Some(child.clone());
                            }
                        }
                        children.push(child);
                    }
                    if self.inner.depth >= 1 && self.inner.loader.allow_create() {
                        children.push(self.spawn_child(NodeId::CreatePlaceholder, None));
                    }
                    {
                        let mut state = self.state();
                        if self.inner.generation.load(Ordering::SeqCst) != generation {
                            tracing::debug!(path, "discarding superseded load");
                            return;
                        }
                        state.children = children;
                        state.loading = false;
                        state.loaded = true;
                        // Root always expands; so does any node a
                        // deep-link load was called on.
                        if self.inner.depth == 0 || initial_path.is_some() {
                            state.collapsed = false;
                        }
                    }
                    self.notify();
                    if let Some(next) = next_child {
                        next.load(initial_path).await;
                    }
                }
                Err(err) => {
                    {
                        let mut state = self.state();
                        if self.inner.generation.load(Ordering::SeqCst) != generation {
                            tracing::debug!(path, "discarding superseded load failure");
                            return;
                        }
                        state.loading = false;
                        state.loaded = true;
                        state.collapsed = true;
                    }
                    tracing::error!(error = %err, path, "failed to load children");
                    self.notify();
                }
            }
        })
    }

    /// Create `new_name` under this node's path, then reload to pick up
    /// the new folder. Unlike browsing, creation failures propagate.
    pub async fn create_child_folder(&self, new_name: &str) -> Result<()> {
        let base = match &self.inner.id {
            NodeId::Real(path) => path.clone(),
            NodeId::CreatePlaceholder => {
                return Err(TreeError::InvalidTarget(
                    "create placeholder has no remote path".into(),
                ))
            }
        };
        self.inner.loader.mkdir(&format!("{base}/{new_name}")).await?;
        self.load(None).await;
        Ok(())
    }
}
