use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use synctree::config::AppConfig;
use synctree::error::{Result, TreeError};
use synctree::render;
use synctree::transport::HttpTransport;
use synctree::tree::{Loader, TreeNode};

/// Browse a sync daemon's remote directory tree.
#[derive(Parser, Debug)]
#[command(name = "synctree", version, about)]
struct Cli {
    /// Deep-link path to auto-descend to (e.g. /personal-files/docs)
    path: Option<String>,

    /// Endpoint URI of the remote storage root to browse
    #[arg(long)]
    endpoint: Option<String>,

    /// Base URL of the daemon's HTTP API
    #[arg(long)]
    base_url: Option<String>,

    /// Display label for the tree root
    #[arg(long)]
    root_label: Option<String>,

    /// Offer create-folder slots on non-root nodes
    /// (bare flag enables; `--allow-create=false` overrides a config file)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    allow_create: Option<bool>,

    /// Create this folder (path relative to the root) before browsing
    #[arg(long)]
    mkdir: Option<String>,

    /// Explicit config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Partial config carrying only the flags that were actually set.
    fn overrides(&self) -> AppConfig {
        let mut overrides = AppConfig::default();
        overrides.connection.base_url = self.base_url.clone();
        overrides.tree.endpoint_uri = self.endpoint.clone();
        overrides.tree.root_label = self.root_label.clone();
        overrides.tree.allow_create = self.allow_create;
        overrides
    }
}

/// `create_child_folder` already reloads the node it was called on, so
/// a plain `--mkdir` run has a fresh root; only a deep link still needs
/// its own descending load.
fn needs_initial_load(did_mkdir: bool, deep_link: Option<&str>) -> bool {
    !did_mkdir || deep_link.is_some()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("synctree=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    if config.endpoint_uri().is_empty() {
        return Err(TreeError::Config(
            "no endpoint URI configured; pass --endpoint or set [tree] endpoint_uri".into(),
        ));
    }

    let transport = HttpTransport::new(
        config.base_url(),
        Duration::from_secs(config.timeout_secs()),
    )?;
    let loader = Arc::new(
        Loader::new(
            config.root_label(),
            config.endpoint_uri(),
            config.allow_create(),
            Arc::new(transport),
        )
        .with_error_handler(|err| tracing::error!(error = %err, "daemon error")),
    );

    let root = TreeNode::root(Arc::clone(&loader));

    if let Some(new_folder) = cli.mkdir.as_deref() {
        let name = new_folder.trim_start_matches('/');
        root.create_child_folder(name).await?;
        tracing::info!(path = name, "folder created");
    }

    if needs_initial_load(cli.mkdir.is_some(), cli.path.as_deref()) {
        root.load(cli.path.as_deref()).await;
    }
    if !root.is_loaded() || root.is_collapsed() {
        // Load failures are absorbed by the node; the forced collapse is
        // the only visible trace. Report it as a browse failure here.
        loader.close();
        return Err(TreeError::Server("could not load remote tree".into()));
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render::write_tree(&mut out, &root)?;

    loader.close();
    Ok(())
}
