pub mod descriptor;
pub mod node;
pub mod pattern;

pub use descriptor::{NormalizedRoute, RouteDescriptor, LAYOUT_FILE_STEM};
pub use node::{NodeId, RouteNode, NOT_FOUND_ROUTE_ID, ROOT_ROUTE_ID};
pub use pattern::{MatchClass, Params, Pattern, Segment};
