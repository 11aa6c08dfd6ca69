//! Route tree assembly
//!
//! The tree is an arena: nodes live in a `Vec`, parents and children are
//! referenced by [`NodeId`]. Once built it is read-only; a source change in
//! development produces a brand-new tree (see [`crate::TreeSlot`]).

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::TreeError;
use crate::path::PathHierarchy;
use crate::route::{
    NodeId, NormalizedRoute, Pattern, RouteDescriptor, RouteNode, LAYOUT_FILE_STEM,
    NOT_FOUND_ROUTE_ID, ROOT_ROUTE_ID,
};

/// Id of a nested layout living at `path`
pub fn layout_id(path: &str) -> String {
    format!("{}/{LAYOUT_FILE_STEM}", path.trim_end_matches('/'))
}

#[derive(Debug, Clone)]
pub struct RouteTree<C> {
    nodes: Vec<RouteNode<C>>,
    by_id: HashMap<String, NodeId>,
    /// Pages in precedence order: pattern specificity, then insertion
    candidates: Vec<NodeId>,
}

struct Prepared<'a> {
    desc: &'a RouteDescriptor,
    route: NormalizedRoute,
    pattern: Pattern,
}

impl Prepared<'_> {
    fn is_root(&self) -> bool {
        self.route.is_layout && self.route.path == "/"
    }

    fn id(&self) -> String {
        if self.is_root() {
            ROOT_ROUTE_ID.to_string()
        } else if self.route.is_layout {
            layout_id(&self.route.path)
        } else {
            self.route.path.clone()
        }
    }

    /// Layout paths to try as a parent, nearest first
    ///
    /// An index page owns its directory, so its own path is tried first.
    /// Other pages and layouts start one level up.
    fn parent_search(&self) -> PathHierarchy<'_> {
        if self.route.is_index && !self.route.is_layout {
            PathHierarchy::new(&self.route.path)
        } else {
            PathHierarchy::above(&self.route.path)
        }
    }
}

impl<C> RouteTree<C> {
    /// Assembles descriptors into a tree
    ///
    /// `component_for` is called once per descriptor, in processing order.
    ///
    /// # Errors
    ///
    /// - [`TreeError::MalformedDescriptor`] for unparsable paths
    /// - [`TreeError::MissingRootLayout`] without a layout at `/`
    /// - [`TreeError::DuplicateRoute`] when two descriptors share an id
    pub fn build<F>(descriptors: &[RouteDescriptor], mut component_for: F) -> Result<Self, TreeError>
    where
        F: FnMut(&RouteDescriptor) -> C,
    {
        let mut prepared = descriptors
            .iter()
            .map(|desc| {
                let route = desc.normalize()?;
                let pattern = Pattern::parse(&route.path)
                    .map_err(|reason| TreeError::malformed(&desc.file_path, reason))?;
                Ok(Prepared {
                    desc,
                    route,
                    pattern,
                })
            })
            .collect::<Result<Vec<_>, TreeError>>()?;

        if !prepared.iter().any(Prepared::is_root) {
            return Err(TreeError::MissingRootLayout);
        }

        // Layouts first, then shallower paths, then index pages before their siblings.
        // Stable, so scanner order breaks the remaining ties.
        prepared.sort_by_key(|p| {
            (
                !p.route.is_layout,
                p.pattern.segments().len(),
                !p.route.is_index,
            )
        });

        let mut tree = Self {
            nodes: Vec::with_capacity(prepared.len()),
            by_id: HashMap::with_capacity(prepared.len()),
            candidates: Vec::new(),
        };
        let mut layouts: HashMap<&str, NodeId> = HashMap::new();

        for p in &prepared {
            let id = p.id();
            if let Some(existing) = tree.by_id.get(&id) {
                return Err(TreeError::DuplicateRoute {
                    path: p.route.path.clone(),
                    first: tree.nodes[existing.0].file_path.clone(),
                    second: p.desc.file_path.clone(),
                });
            }

            let key = NodeId(tree.nodes.len());
            let is_root = p.is_root();
            let parent = if is_root {
                None
            } else {
                Some(resolve_parent(p, &layouts))
            };
            let depth = parent.map_or(0, |k| tree.nodes[k.0].depth + 1);

            trace!(id = %id, parent = ?parent, "linking route");

            tree.nodes.push(RouteNode {
                key,
                id: id.clone(),
                path_pattern: (!is_root).then(|| p.pattern.clone()),
                is_root,
                is_layout: p.route.is_layout,
                parent,
                children: Vec::new(),
                component: component_for(p.desc),
                has_remote_data: p.desc.has_remote_data,
                file_path: p.desc.file_path.clone(),
                variable_name: p.desc.variable_name.clone(),
                depth,
            });
            if let Some(parent) = parent {
                tree.nodes[parent.0].children.push(key);
            }
            if p.route.is_layout {
                layouts.insert(p.route.path.as_str(), key);
            }
            tree.by_id.insert(id, key);
        }

        let mut candidates: Vec<NodeId> = tree
            .nodes
            .iter()
            .filter(|n| n.is_page())
            .map(|n| n.key)
            .collect();
        candidates.sort_by_cached_key(|k| {
            let node = &tree.nodes[k.0];
            let specificity = node.path_pattern.as_ref().map(Pattern::specificity);
            (specificity, node.key)
        });
        tree.candidates = candidates;

        debug!(
            routes = tree.nodes.len(),
            pages = tree.candidates.len(),
            "route tree built"
        );

        Ok(tree)
    }

    /// The unique root layout
    pub fn root(&self) -> &RouteNode<C> {
        // build() rejects lists without a root and sorts it first
        &self.nodes[0]
    }

    pub fn get(&self, id: &str) -> Option<&RouteNode<C>> {
        self.by_id.get(id).and_then(|k| self.node(*k))
    }

    pub fn node(&self, key: NodeId) -> Option<&RouteNode<C>> {
        self.nodes.get(key.0)
    }

    pub fn parent(&self, node: &RouteNode<C>) -> Option<&RouteNode<C>> {
        node.parent.and_then(|k| self.node(k))
    }

    /// Children in the order they were linked
    pub fn children<'a>(
        &'a self,
        node: &'a RouteNode<C>,
    ) -> impl Iterator<Item = &'a RouteNode<C>> + 'a {
        node.children.iter().filter_map(move |k| self.node(*k))
    }

    /// Root-first chain ending at `node` itself
    pub fn chain<'a>(&'a self, node: &'a RouteNode<C>) -> Vec<&'a RouteNode<C>> {
        let mut chain = Vec::with_capacity(node.depth + 1);
        let mut current = Some(node);
        while let Some(n) = current {
            chain.push(n);
            current = self.parent(n);
        }
        chain.reverse();
        chain
    }

    /// The user-defined not-found page, if one was registered
    pub fn not_found_route(&self) -> Option<&RouteNode<C>> {
        self.get(NOT_FOUND_ROUTE_ID).filter(|n| n.is_page())
    }

    /// Every page (layouts excluded), in precedence order
    pub fn pages(&self) -> impl Iterator<Item = &RouteNode<C>> {
        self.candidates.iter().filter_map(|k| self.node(*k))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteNode<C>> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn resolve_parent(p: &Prepared<'_>, layouts: &HashMap<&str, NodeId>) -> NodeId {
    let hinted = p
        .desc
        .parent
        .as_deref()
        .and_then(|hint| hint.normalize().ok())
        .filter(|hint| hint.is_layout)
        .and_then(|hint| layouts.get(hint.path.as_str()).copied());

    hinted
        .or_else(|| {
            p.parent_search()
                .find_map(|candidate| layouts.get(candidate).copied())
        })
        .unwrap_or(NodeId(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(routes: &[(&str, &str)]) -> RouteTree<String> {
        let descriptors: Vec<RouteDescriptor> = routes
            .iter()
            .map(|(file, route)| RouteDescriptor::new(*file, *route))
            .collect();
        RouteTree::build(&descriptors, |d| d.file_path.clone()).unwrap()
    }

    #[test]
    fn layout_ids() {
        assert_eq!(layout_id("/posts"), "/posts/__layout");
        assert_eq!(layout_id("/posts/[post]/"), "/posts/[post]/__layout");
    }

    #[test]
    fn root_is_first_and_depth_zero() {
        let tree = build(&[("about.tsx", "/about"), ("__layout.tsx", "/__layout")]);
        assert_eq!(tree.root().id(), ROOT_ROUTE_ID);
        assert_eq!(tree.root().depth(), 0);
        assert!(tree.root().path_pattern().is_none());
        assert_eq!(tree.get("/about").map(RouteNode::depth), Some(1));
    }

    #[test]
    fn nested_layout_collects_its_directory() {
        let tree = build(&[
            ("__layout.tsx", "/__layout"),
            ("posts/[post].tsx", "/posts/[post]"),
            ("posts/index.tsx", "/posts/"),
            ("posts/__layout.tsx", "/posts/__layout"),
            ("about.tsx", "/about"),
        ]);

        let posts_layout = tree.get("/posts/__layout").unwrap();
        let children: Vec<&str> = tree.children(posts_layout).map(RouteNode::id).collect();
        assert_eq!(children, vec!["/posts", "/posts/[post]"]);

        let root_children: Vec<&str> = tree.children(tree.root()).map(RouteNode::id).collect();
        assert_eq!(root_children, vec!["/posts/__layout", "/about"]);
    }

    #[test]
    fn chain_is_root_first() {
        let tree = build(&[
            ("__layout.tsx", "/__layout"),
            ("posts/__layout.tsx", "/posts/__layout"),
            ("posts/[post]/__layout.tsx", "/posts/[post]/__layout"),
            ("posts/[post]/edit.tsx", "/posts/[post]/edit"),
        ]);
        let leaf = tree.get("/posts/[post]/edit").unwrap();
        let ids: Vec<&str> = tree.chain(leaf).into_iter().map(RouteNode::id).collect();
        assert_eq!(
            ids,
            vec![
                ROOT_ROUTE_ID,
                "/posts/__layout",
                "/posts/[post]/__layout",
                "/posts/[post]/edit"
            ]
        );
    }

    #[test]
    fn parent_hint_wins_over_search() {
        let descriptors = vec![
            RouteDescriptor::new("__layout.tsx", "/__layout"),
            RouteDescriptor::new("docs/__layout.tsx", "/docs/__layout"),
            RouteDescriptor::new("guide.tsx", "/guide")
                .with_parent(RouteDescriptor::new("docs/__layout.tsx", "/docs/__layout")),
        ];
        let tree = RouteTree::build(&descriptors, |_| ()).unwrap();
        let guide = tree.get("/guide").unwrap();
        assert_eq!(tree.parent(guide).map(RouteNode::id), Some("/docs/__layout"));
    }
}
