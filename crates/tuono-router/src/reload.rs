//! Live route tree for development reloads

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{info, warn};

use crate::error::TreeError;
use crate::route::RouteDescriptor;
use crate::tree::RouteTree;

/// Holds the active tree and swaps it wholesale on reload
///
/// Readers take a cheap snapshot with [`TreeSlot::current`] and keep using
/// it even if a reload lands mid-request. A reload that fails to build
/// leaves the previous tree in place.
#[derive(Debug)]
pub struct TreeSlot<C> {
    current: ArcSwap<RouteTree<C>>,
}

impl<C> TreeSlot<C> {
    pub fn new(tree: RouteTree<C>) -> Self {
        Self {
            current: ArcSwap::from_pointee(tree),
        }
    }

    pub fn current(&self) -> Arc<RouteTree<C>> {
        self.current.load_full()
    }

    /// Rebuilds from `descriptors`; on error the old tree stays active
    pub fn reload<F>(&self, descriptors: &[RouteDescriptor], component_for: F) -> Result<Arc<RouteTree<C>>, TreeError>
    where
        F: FnMut(&RouteDescriptor) -> C,
    {
        match RouteTree::build(descriptors, component_for) {
            Ok(tree) => {
                let tree = Arc::new(tree);
                self.current.store(Arc::clone(&tree));
                info!(routes = tree.len(), "route tree reloaded");
                Ok(tree)
            }
            Err(err) => {
                warn!(error = %err, "route tree reload failed, keeping previous tree");
                Err(err)
            }
        }
    }
}
