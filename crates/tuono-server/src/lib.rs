//! # tuono-server
//!
//! Reference SSR host. Every request is matched against the current
//! route tree: `/__tuono/data/<pathname>` answers with the route's data
//! as JSON, anything else is rendered through the layout chain with the
//! server payload embedded for hydration.

pub mod handler;
pub mod hot_reload;
pub mod manifest;
pub mod page;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tuono::{Config, Mode, SharedComponent};
use tuono_router::TreeSlot;

pub use handler::{HandlerRegistry, HandlerResponse, RequestContext};
pub use manifest::{Manifest, RouteBundle};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub tree: Arc<TreeSlot<SharedComponent>>,
    pub handlers: Arc<HandlerRegistry>,
    pub manifest: Arc<Manifest>,
    pub config: Arc<Config>,
    pub mode: Mode,
}

impl AppState {
    pub fn new(tree: Arc<TreeSlot<SharedComponent>>, handlers: HandlerRegistry, config: Config, mode: Mode) -> Self {
        Self {
            tree,
            handlers: Arc::new(handlers),
            manifest: Arc::new(Manifest::empty()),
            config: Arc::new(config),
            mode,
        }
    }

    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = Arc::new(manifest);
        self
    }
}

/// Directory holding the client build, two levels above the manifest
pub fn client_dir(config: &Config) -> PathBuf {
    Path::new(&config.build.manifest_path)
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("out/client"))
}

/// Directory of static files answered before any page
///
/// Dev serves `build.public_dir`; prod serves the whole client build.
pub fn static_dir(config: &Config, mode: Mode) -> PathBuf {
    match mode {
        Mode::Dev => PathBuf::from(&config.build.public_dir),
        Mode::Prod => client_dir(config),
    }
}

/// Static files first; every path without a file is a page or data request
///
/// Data and page requests share one catch-all and are told apart in
/// [`page::handle`].
pub fn app(state: AppState) -> Router {
    let files = ServeDir::new(static_dir(&state.config, state.mode));
    let pages = Router::new()
        .route("/", get(page::handle))
        .route("/*path", get(page::handle))
        .with_state(state);

    Router::new()
        .fallback_service(files.fallback(pages))
        .layer(TraceLayer::new_for_http())
}
