//! Pathname to route resolution

use tracing::trace;

use crate::path::{normalize_path, segments, strip_query_and_hash};
use crate::route::{MatchClass, Params, RouteNode};
use crate::tree::RouteTree;

/// The best page for a pathname plus its extracted params
#[derive(Debug)]
pub struct RouteMatch<'a, C> {
    pub route: &'a RouteNode<C>,
    pub params: Params,
}

impl<C> Clone for RouteMatch<'_, C> {
    fn clone(&self) -> Self {
        Self {
            route: self.route,
            params: self.params.clone(),
        }
    }
}

impl<C> RouteTree<C> {
    /// Returns the highest-precedence page matching `pathname`
    ///
    /// Precedence: an exact literal hit, then static patterns, then
    /// dynamic ones, then catch-alls. Ties go to the shallower node, then
    /// to the one linked first. Query and fragment suffixes are ignored and
    /// `/posts/` is treated as `/posts`.
    ///
    /// `None` is not an error: callers render the not-found fallback.
    ///
    /// ```
    /// use tuono_router::{RouteDescriptor, RouteTree};
    ///
    /// let tree = RouteTree::build(
    ///     &[
    ///         RouteDescriptor::new("__layout.tsx", "/__layout"),
    ///         RouteDescriptor::new("posts/[post].tsx", "/posts/[post]"),
    ///     ],
    ///     |_| (),
    /// )
    /// .unwrap();
    ///
    /// let found = tree.match_path("/posts/hello?ref=home").unwrap();
    /// assert_eq!(found.route.id(), "/posts/[post]");
    /// assert_eq!(found.params["post"], "hello");
    /// assert!(tree.match_path("/nope").is_none());
    /// ```
    pub fn match_path(&self, pathname: &str) -> Option<RouteMatch<'_, C>> {
        let pathname = normalize_path(strip_query_and_hash(pathname));

        if let Some(route) = self
            .get(&pathname)
            .filter(|n| n.is_page() && n.match_class() == MatchClass::Static)
        {
            return Some(RouteMatch {
                route,
                params: Params::new(),
            });
        }

        let request: Vec<&str> = segments(&pathname).collect();
        let found = self.pages().find_map(|route| {
            let pattern = route.path_pattern()?;
            pattern
                .matches(&request)
                .map(|params| RouteMatch { route, params })
        });

        if found.is_none() {
            trace!(pathname = %pathname, "no route matched");
        }
        found
    }

    /// Whether any page matches `pathname`
    pub fn has_match(&self, pathname: &str) -> bool {
        self.match_path(pathname).is_some()
    }
}
