use super::pattern::{MatchClass, Pattern};

/// Id of the root layout, distinct from the `/` page id
pub const ROOT_ROUTE_ID: &str = "__root__";

/// Id a user-defined not-found page binds to
pub const NOT_FOUND_ROUTE_ID: &str = "/404";

/// Index of a node inside its [`crate::RouteTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One routable unit: a page or a layout
///
/// Nodes are created by [`crate::RouteTree::build`] and never mutated
/// afterwards. The parent link is an index; resolve it through
/// [`crate::RouteTree::parent`].
#[derive(Debug, Clone)]
pub struct RouteNode<C> {
    pub(crate) key: NodeId,
    pub(crate) id: String,
    pub(crate) path_pattern: Option<Pattern>,
    pub(crate) is_root: bool,
    pub(crate) is_layout: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) component: C,
    pub(crate) has_remote_data: bool,
    pub(crate) file_path: String,
    pub(crate) variable_name: String,
    pub(crate) depth: usize,
}

impl<C> RouteNode<C> {
    pub fn key(&self) -> NodeId {
        self.key
    }

    /// Canonical id: the normalized path for pages, `<path>/__layout` for
    /// nested layouts and [`ROOT_ROUTE_ID`] for the root
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `None` only for the root
    pub fn path_pattern(&self) -> Option<&Pattern> {
        self.path_pattern.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn is_layout(&self) -> bool {
        self.is_layout
    }

    /// Pages are the only match candidates
    pub fn is_page(&self) -> bool {
        !self.is_layout
    }

    pub fn parent_key(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn child_keys(&self) -> &[NodeId] {
        &self.children
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    pub fn has_remote_data(&self) -> bool {
        self.has_remote_data
    }

    /// Source file relative to the routes folder, used for asset correlation
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn variable_name(&self) -> &str {
        &self.variable_name
    }

    /// Nesting depth below the root (root is 0)
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn match_class(&self) -> MatchClass {
        self.path_pattern
            .as_ref()
            .map(Pattern::class)
            .unwrap_or(MatchClass::Static)
    }
}
