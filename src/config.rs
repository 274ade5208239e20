//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--config`, `--base-url`, `--endpoint`, etc.)
//! 2. `$SYNCTREE_CONFIG` environment variable (path to config file)
//! 3. Project-local `.synctree.toml` in the current working directory
//! 4. Global `~/.config/synctree/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

// ── Section configs ──────────────────────────────────────────────────────────

/// Daemon connection settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Base URL of the sync daemon's HTTP API.
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Tree browsing settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Endpoint URI selecting which remote storage root to browse.
    pub endpoint_uri: Option<String>,
    /// Display name for the tree root when its path is empty.
    pub root_label: Option<String>,
    /// Whether non-root nodes offer a create-folder slot.
    pub allow_create: Option<bool>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    pub tree: TreeConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default daemon API address (the daemon binds localhost only).
pub const DEFAULT_BASE_URL: &str = "http://localhost:3636";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default root display label.
pub const DEFAULT_ROOT_LABEL: &str = "Server";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path — that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. $SYNCTREE_CONFIG environment variable
    if let Ok(env_path) = std::env::var("SYNCTREE_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    // 2. Project-local `.synctree.toml` in CWD
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".synctree.toml"));
    }

    // 3. Global `~/.config/synctree/config.toml`
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("synctree").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning logged).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return None,
    };
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!("failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self` — `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            connection: ConnectionConfig {
                base_url: other
                    .connection
                    .base_url
                    .clone()
                    .or(self.connection.base_url),
                timeout_secs: other.connection.timeout_secs.or(self.connection.timeout_secs),
            },
            tree: TreeConfig {
                endpoint_uri: other.tree.endpoint_uri.clone().or(self.tree.endpoint_uri),
                root_label: other.tree.root_label.clone().or(self.tree.root_label),
                allow_create: other.tree.allow_create.or(self.tree.allow_create),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        // Start with built-in defaults (all None — the struct Default).
        let mut config = AppConfig::default();

        // Load from candidate files (lowest priority first so higher overwrites).
        let paths = candidate_paths();
        // Walk in reverse so that highest-priority (env var) overwrites lower.
        for path in paths.iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        // Explicit --config file has higher priority than candidates.
        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        // CLI flag overrides are highest priority.
        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    /// Daemon API base URL.
    pub fn base_url(&self) -> &str {
        self.connection.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Request timeout in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.connection.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Endpoint URI to browse; empty means "not configured".
    pub fn endpoint_uri(&self) -> &str {
        self.tree.endpoint_uri.as_deref().unwrap_or("")
    }

    /// Root display label.
    pub fn root_label(&self) -> &str {
        self.tree.root_label.as_deref().unwrap_or(DEFAULT_ROOT_LABEL)
    }

    /// Whether create-folder slots are offered.
    pub fn allow_create(&self) -> bool {
        self.tree.allow_create.unwrap_or(false)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
