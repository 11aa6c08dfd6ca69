use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tuono::{ComponentRegistry, SharedComponent};
use tuono_router::{RouteDescriptor, TreeSlot};

/// A change to the route descriptor file
#[derive(Debug, Clone)]
pub struct RoutesChanged {
    pub path: PathBuf,
}

/// Watches the descriptor file the route scanner writes
pub struct HotReloadWatcher {
    tx: broadcast::Sender<RoutesChanged>,
    _watcher: notify::RecommendedWatcher,
}

impl HotReloadWatcher {
    pub fn new(routes_file: PathBuf) -> Result<Self> {
        let (tx, _) = broadcast::channel(100);
        let tx_clone = tx.clone();
        let file_name = routes_file.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                for path in event.paths {
                    if path.file_name().map(|n| n.to_os_string()) != file_name {
                        continue;
                    }
                    info!("Routes changed: {:?}", path);
                    // No receiver just means nobody reloads
                    let _ = tx_clone.send(RoutesChanged { path });
                }
            }
            Err(e) => error!("Watch error: {:?}", e),
        })?;

        // Editors often replace the file, so watch its directory
        let dir = match routes_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if dir.exists() {
            watcher.watch(&dir, RecursiveMode::NonRecursive)?;
            info!("Watching: {:?}", routes_file);
        } else {
            warn!("Path does not exist: {:?}", dir);
        }

        Ok(Self { tx, _watcher: watcher })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoutesChanged> {
        self.tx.subscribe()
    }
}

/// Reads the scanner's JSON descriptor list
pub fn load_descriptors(path: impl AsRef<Path>) -> Result<Vec<RouteDescriptor>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read routes file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse routes file: {}", path.display()))
}

/// Rebuilds `slot` from `path`; the old tree stays on any failure
pub fn reload_tree(
    slot: &TreeSlot<SharedComponent>,
    registry: &ComponentRegistry,
    path: &Path,
) -> Result<usize> {
    let descriptors = load_descriptors(path)?;
    let tree = slot
        .reload(&descriptors, |d| registry.resolve(d))
        .with_context(|| format!("Invalid routes in {}", path.display()))?;
    Ok(tree.len())
}

/// Rebuilds the tree on every change and then calls `on_reload`
pub fn spawn_reloader<F>(
    watcher: HotReloadWatcher,
    slot: Arc<TreeSlot<SharedComponent>>,
    registry: Arc<ComponentRegistry>,
    on_reload: F,
) -> tokio::task::JoinHandle<()>
where
    F: Fn() + Send + 'static,
{
    let mut rx = watcher.subscribe();
    tokio::spawn(async move {
        let _watcher = watcher;
        loop {
            match rx.recv().await {
                Ok(change) => match reload_tree(&slot, &registry, &change.path) {
                    Ok(nodes) => {
                        info!(nodes, "Route tree reloaded");
                        on_reload();
                    }
                    Err(e) => warn!("Keeping previous routes: {:#}", e),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Reloader lagged behind file events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
