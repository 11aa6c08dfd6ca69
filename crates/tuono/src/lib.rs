//! # tuono
//!
//! Client runtime of the tuono framework.
//!
//! - [`store::LocationStore`]: current location and transition flag
//! - [`navigation::NavigationController`]: push/replace, popstate, link interception
//! - [`data::DataSynchronizer`]: server data reuse, refetch and stale discard
//! - [`render::RenderComposer`]: nested layouts with preserved instances
//! - [`app::ClientRouter`]: all of the above behind one handle
//!
//! Route trees come from [`tuono_router`].

pub mod app;
pub mod component;
pub mod config;
pub mod data;
pub mod error;
pub mod history;
pub mod location;
pub mod navigation;
pub mod payload;
pub mod render;
pub mod store;

pub use app::{ClientRouter, NavigationOutcome, PendingNavigation, RouterContext, SharedTree, MAX_REDIRECTS};
pub use component::{
    Component, ComponentRegistry, FnComponent, LazyComponent, MountedComponent, Outlet, Preload, RouteProps,
    SharedComponent,
};
pub use config::Config;
pub use data::{DataFetcher, DataResponse, DataSynchronizer, HttpDataFetcher, DATA_ENDPOINT_PREFIX};
pub use error::{FetchError, HandoffError, RouterError};
pub use history::{History, MemoryHistory};
pub use location::ParsedLocation;
pub use navigation::{HistoryMode, LinkClick, LinkOutcome, Modifiers, NavigateOptions, NavigationController};
pub use payload::{Mode, PayloadHandoff, ServerLocation, ServerPayload};
pub use render::RenderComposer;
pub use store::{LocationStore, NavigationId, NavigationState, TransitionStatus};

pub use tuono_router;
