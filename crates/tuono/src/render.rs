//! Render composer: nests the matched page inside its layouts

use maud::{html, Markup};
use tracing::debug;
use tuono_router::{RouteNode, RouteTree, ROOT_ROUTE_ID};

use crate::component::{MountedComponent, RouteProps, SharedComponent};
use crate::error::RouterError;
use crate::payload::Mode;

/// Built-in not-found content
pub fn default_not_found() -> Markup {
    html! {
        h1 { "404 Not found" }
        a href="/" { "Return home" }
    }
}

/// Error surface shown in place of the page
///
/// `Dev` lists the full cause chain; `Prod` shows a generic message and
/// nothing about internals.
pub fn error_overlay(err: &RouterError, mode: Mode) -> Markup {
    match mode {
        Mode::Dev => {
            let chain = err.chain();
            html! {
                div id="tuono-error-overlay" {
                    h1 {
                        @if err.is_configuration() { "Route configuration error" } @else { "Unhandled error" }
                    }
                    p class="message" { (err.to_string()) }
                    @if chain.len() > 1 {
                        ul class="causes" {
                            @for cause in chain.iter().skip(1) {
                                li { (cause) }
                            }
                        }
                    }
                }
            }
        }
        Mode::Prod => html! {
            div id="tuono-error" {
                h1 { "Something went wrong" }
                p { "Please try again later." }
            }
        },
    }
}

struct Mounted {
    id: String,
    instance: Box<dyn MountedComponent>,
}

/// Keeps mounted instances for the current chain between renders
///
/// Instances are keyed by route id. When the leaf changes, ancestors
/// shared with the previous chain keep their instances and only the
/// diverging tail is mounted again. Rendering the same leaf twice mounts
/// nothing.
#[derive(Default)]
pub struct RenderComposer {
    leaf: Option<String>,
    mounted: Vec<Mounted>,
}

impl std::fmt::Debug for RenderComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderComposer")
            .field("leaf", &self.leaf)
            .field("mounted", &self.mounted_ids())
            .finish()
    }
}

impl RenderComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `leaf` inside its layouts, or the not-found fallback
    ///
    /// Without a leaf, a page bound to `/404` is rendered with its own
    /// chain; otherwise the root layout wraps [`default_not_found`].
    pub fn compose(
        &mut self,
        tree: &RouteTree<SharedComponent>,
        leaf: Option<&RouteNode<SharedComponent>>,
        props: RouteProps<'_>,
    ) -> Markup {
        match leaf.or_else(|| tree.not_found_route()) {
            Some(leaf) => {
                self.reconcile(&tree.chain(leaf));
                self.fold(props, html! {})
            }
            None => {
                self.reconcile(&[tree.root()]);
                self.fold(props, default_not_found())
            }
        }
    }

    /// Drops every instance, e.g. after the tree was rebuilt
    pub fn reset(&mut self) {
        self.leaf = None;
        self.mounted.clear();
    }

    /// Ids of mounted instances, root first
    pub fn mounted_ids(&self) -> Vec<&str> {
        self.mounted.iter().map(|m| m.id.as_str()).collect()
    }

    fn reconcile(&mut self, chain: &[&RouteNode<SharedComponent>]) {
        let leaf_id = chain.last().map_or(ROOT_ROUTE_ID, |n| n.id());
        let unchanged = self.leaf.as_deref() == Some(leaf_id) && self.mounted.len() == chain.len();
        if unchanged {
            return;
        }

        let shared = self
            .mounted
            .iter()
            .zip(chain)
            .take_while(|(mounted, node)| mounted.id == node.id())
            .count();
        self.mounted.truncate(shared);

        for node in &chain[shared..] {
            debug!(route = %node.id(), component = %node.component().name(), "mounting");
            self.mounted.push(Mounted {
                id: node.id().to_string(),
                instance: node.component().mount(),
            });
        }
        self.leaf = Some(leaf_id.to_string());
    }

    fn fold(&mut self, props: RouteProps<'_>, innermost: Markup) -> Markup {
        self.mounted
            .iter_mut()
            .rev()
            .fold(innermost, |content, mounted| mounted.instance.render(props, content))
    }
}
