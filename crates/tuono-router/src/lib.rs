//! # tuono-router
//!
//! File-based route tree and path matcher.
//!
//! The file-system scanner emits a flat list of [`RouteDescriptor`]s. The
//! builder links them into a [`RouteTree`] of pages and nested layouts
//! and the matcher resolves a pathname to its best page:
//!
//! ```
//! use tuono_router::{RouteDescriptor, RouteTree, ROOT_ROUTE_ID};
//!
//! let descriptors = vec![
//!     RouteDescriptor::new("__layout.tsx", "/__layout"),
//!     RouteDescriptor::new("index.tsx", "/"),
//!     RouteDescriptor::new("posts/[post].tsx", "/posts/[post]"),
//!     RouteDescriptor::new("blog/[...catchAll].tsx", "/blog/[...catchAll]"),
//! ];
//! let tree = RouteTree::build(&descriptors, |d| d.variable_name.clone()).unwrap();
//!
//! assert_eq!(tree.root().id(), ROOT_ROUTE_ID);
//! assert_eq!(tree.match_path("/posts/hello").unwrap().route.id(), "/posts/[post]");
//! assert_eq!(tree.match_path("/blog").unwrap().route.id(), "/blog/[...catchAll]");
//! ```
//!
//! Components are generic (`C`), so the tree knows nothing about rendering.

pub mod error;
pub mod matcher;
pub mod path;
pub mod reload;
pub mod route;
pub mod tree;

pub use error::TreeError;
pub use matcher::RouteMatch;
pub use reload::TreeSlot;
pub use route::{
    MatchClass, NodeId, Params, Pattern, RouteDescriptor, RouteNode, Segment, NOT_FOUND_ROUTE_ID,
    ROOT_ROUTE_ID,
};
pub use tree::{layout_id, RouteTree};
