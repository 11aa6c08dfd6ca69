//! Renderable route components
//!
//! A [`Component`] is the shared definition a route node points at. Each
//! render position mounts its own [`MountedComponent`] instance, which is
//! where per-instance UI state lives (open menus, scroll offsets, ...).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use maud::{html, Markup};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use tuono_router::RouteDescriptor;

use crate::error::RouterError;

/// Props shared by every component of the rendered chain
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteProps<'a> {
    pub data: Option<&'a Value>,
    pub is_loading: bool,
}

/// Fetch/evaluate a component's code ahead of navigation
///
/// Must be idempotent: calling it again after completion is a no-op.
#[async_trait]
pub trait Preload: Send + Sync {
    async fn preload(&self) -> Result<(), RouterError>;

    fn is_loaded(&self) -> bool {
        true
    }
}

pub trait Component: Preload {
    fn name(&self) -> &str;

    /// Creates a fresh instance for one position in the render tree
    fn mount(&self) -> Box<dyn MountedComponent>;
}

pub trait MountedComponent: Send {
    /// Renders this instance around `content`, the next-inner render
    fn render(&mut self, props: RouteProps<'_>, content: Markup) -> Markup;
}

pub type SharedComponent = Arc<dyn Component>;

type RenderFn = dyn Fn(RouteProps<'_>, Markup) -> Markup + Send + Sync;

/// Stateless component backed by a render function
#[derive(Clone)]
pub struct FnComponent {
    name: String,
    render: Arc<RenderFn>,
}

impl FnComponent {
    pub fn new<F>(name: impl Into<String>, render: F) -> Self
    where
        F: Fn(RouteProps<'_>, Markup) -> Markup + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            render: Arc::new(render),
        }
    }

    pub fn shared(self) -> SharedComponent {
        Arc::new(self)
    }
}

impl fmt::Debug for FnComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComponent").field("name", &self.name).finish()
    }
}

#[async_trait]
impl Preload for FnComponent {
    async fn preload(&self) -> Result<(), RouterError> {
        Ok(())
    }
}

impl Component for FnComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn mount(&self) -> Box<dyn MountedComponent> {
        Box::new(FnInstance(Arc::clone(&self.render)))
    }
}

struct FnInstance(Arc<RenderFn>);

impl MountedComponent for FnInstance {
    fn render(&mut self, props: RouteProps<'_>, content: Markup) -> Markup {
        (self.0)(props, content)
    }
}

/// Renders nested content unchanged; stands in for unregistered layouts
#[derive(Debug, Clone, Default)]
pub struct Outlet;

#[async_trait]
impl Preload for Outlet {
    async fn preload(&self) -> Result<(), RouterError> {
        Ok(())
    }
}

impl Component for Outlet {
    fn name(&self) -> &str {
        "Outlet"
    }

    fn mount(&self) -> Box<dyn MountedComponent> {
        Box::new(Outlet)
    }
}

impl MountedComponent for Outlet {
    fn render(&mut self, _props: RouteProps<'_>, content: Markup) -> Markup {
        content
    }
}

/// Loads the real component on first use
pub type Loader = Arc<dyn Fn() -> BoxFuture<'static, Result<SharedComponent, String>> + Send + Sync>;

/// Code-split component
///
/// Until [`Preload::preload`] has completed, mounted instances render
/// nothing (suspended). The first render after loading mounts the real
/// component and keeps it (resumed).
#[derive(Clone)]
pub struct LazyComponent {
    name: String,
    loader: Loader,
    loaded: Arc<OnceCell<SharedComponent>>,
}

impl LazyComponent {
    pub fn new<F>(name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<SharedComponent, String>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            loader: Arc::new(loader),
            loaded: Arc::new(OnceCell::new()),
        }
    }

    pub fn shared(self) -> SharedComponent {
        Arc::new(self)
    }
}

impl fmt::Debug for LazyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyComponent")
            .field("name", &self.name)
            .field("loaded", &self.loaded.initialized())
            .finish()
    }
}

#[async_trait]
impl Preload for LazyComponent {
    async fn preload(&self) -> Result<(), RouterError> {
        if self.loaded.initialized() {
            return Ok(());
        }
        match self.loaded.get_or_try_init(|| (self.loader)()).await {
            Ok(_) => {
                debug!(component = %self.name, "component loaded");
                Ok(())
            }
            Err(reason) => Err(RouterError::Preload {
                route_id: self.name.clone(),
                reason,
            }),
        }
    }

    fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }
}

impl Component for LazyComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn mount(&self) -> Box<dyn MountedComponent> {
        Box::new(LazyInstance {
            loaded: Arc::clone(&self.loaded),
            inner: None,
        })
    }
}

struct LazyInstance {
    loaded: Arc<OnceCell<SharedComponent>>,
    inner: Option<Box<dyn MountedComponent>>,
}

impl MountedComponent for LazyInstance {
    fn render(&mut self, props: RouteProps<'_>, content: Markup) -> Markup {
        if self.inner.is_none() {
            self.inner = self.loaded.get().map(|component| component.mount());
        }
        match self.inner.as_mut() {
            Some(inner) => inner.render(props, content),
            None => html! {},
        }
    }
}

/// Components by the scanner's `variableName`
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    components: HashMap<String, SharedComponent>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, variable_name: impl Into<String>, component: SharedComponent) -> &mut Self {
        self.components.insert(variable_name.into(), component);
        self
    }

    pub fn get(&self, variable_name: &str) -> Option<&SharedComponent> {
        self.components.get(variable_name)
    }

    /// Component for a descriptor, an [`Outlet`] when none is registered
    pub fn resolve(&self, descriptor: &RouteDescriptor) -> SharedComponent {
        match self.get(&descriptor.variable_name) {
            Some(component) => Arc::clone(component),
            None => {
                warn!(
                    file = %descriptor.file_path,
                    variable = %descriptor.variable_name,
                    "no component registered, rendering an outlet"
                );
                Arc::new(Outlet)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.components.keys()).finish()
    }
}
