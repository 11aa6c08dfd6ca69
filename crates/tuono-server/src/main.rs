use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use maud::html;
use serde_json::json;
use tower_livereload::LiveReloadLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tuono::{ComponentRegistry, Config, FnComponent, Mode};
use tuono_router::{RouteDescriptor, RouteTree, TreeSlot};
use tuono_server::hot_reload::{load_descriptors, spawn_reloader, HotReloadWatcher};
use tuono_server::{app, AppState, HandlerRegistry, HandlerResponse, Manifest, RequestContext};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load_default().unwrap_or_else(|e| {
        warn!("Failed to load config: {:#}, using defaults", e);
        Config::default()
    });
    let mode = Mode::from_env();
    info!(?mode, port = config.server.port, "tuono starting");

    let routes_file = Path::new(&config.routing.routes_file).to_path_buf();
    let descriptors = if routes_file.exists() {
        load_descriptors(&routes_file)?
    } else {
        warn!("No routes file at {:?}, serving the demo routes", routes_file);
        demo_routes()
    };

    let registry = Arc::new(demo_components());
    let tree = RouteTree::build(&descriptors, |d| registry.resolve(d)).context("Invalid route descriptors")?;
    info!("Built route tree with {} nodes", tree.len());
    for page in tree.pages() {
        info!("  {} -> {}", page.id(), page.component().name());
    }
    let slot = Arc::new(TreeSlot::new(tree));

    let mut state = AppState::new(Arc::clone(&slot), demo_handlers(), config.clone(), mode);
    if mode == Mode::Prod {
        let manifest = Manifest::load(&config.build.manifest_path)?;
        state = state.with_manifest(manifest);
    }

    let hot_reload = mode.is_dev() && config.dev.hot_reload;
    let router = app(state);
    let router = if hot_reload {
        let livereload = LiveReloadLayer::new();
        let reloader = livereload.reloader();
        match HotReloadWatcher::new(routes_file) {
            Ok(watcher) => {
                spawn_reloader(watcher, Arc::clone(&slot), Arc::clone(&registry), move || reloader.reload());
            }
            Err(e) => warn!("Failed to create file watcher: {:#}", e),
        }
        router.layer(livereload)
    } else {
        router
    };

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at {}", config.server.origin());
    axum::serve(listener, router).await.context("Server error")?;
    Ok(())
}

fn demo_routes() -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor::new("__layout.tsx", "/__layout").with_variable_name("RootLayout"),
        RouteDescriptor::new("index.tsx", "/").with_variable_name("Index"),
        RouteDescriptor::new("about.tsx", "/about").with_variable_name("About"),
        RouteDescriptor::new("posts/__layout.tsx", "/posts/__layout").with_variable_name("PostsLayout"),
        RouteDescriptor::new("posts/[post].tsx", "/posts/[post]")
            .with_variable_name("Post")
            .with_remote_data(),
    ]
}

fn demo_components() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry
        .register(
            "RootLayout",
            FnComponent::new("RootLayout", |_, content| {
                html! {
                    nav { a href="/" { "Home" } " " a href="/about" { "About" } }
                    main { (content) }
                }
            })
            .shared(),
        )
        .register("Index", FnComponent::new("Index", |_, _| html! { h1 { "tuono" } }).shared())
        .register("About", FnComponent::new("About", |_, _| html! { h1 { "About" } }).shared())
        .register(
            "PostsLayout",
            FnComponent::new("PostsLayout", |_, content| html! { section class="posts" { (content) } }).shared(),
        )
        .register(
            "Post",
            FnComponent::new("Post", |props, _| {
                let title = props
                    .data
                    .and_then(|d| d.get("title"))
                    .and_then(|t| t.as_str())
                    .unwrap_or("Loading...");
                html! { article { h1 { (title) } } }
            })
            .shared(),
        );
    registry
}

fn demo_handlers() -> HandlerRegistry {
    let mut handlers = HandlerRegistry::new();
    handlers.register("/posts/[post]", |ctx: RequestContext| async move {
        match ctx.param("post") {
            Some("old") => HandlerResponse::redirect("/posts/new"),
            Some(post) => HandlerResponse::Props(json!({ "title": post })),
            None => HandlerResponse::NotFound,
        }
    });
    handlers
}
