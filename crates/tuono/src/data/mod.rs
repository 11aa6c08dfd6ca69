//! Data synchronizer: keeps route data in step with the location
//!
//! A navigation is split at its only suspension point: [`DataSynchronizer::on_navigation`]
//! decides synchronously whether a fetch is needed, the fetch future from
//! [`DataSynchronizer::request`] runs without borrowing the synchronizer,
//! and [`DataSynchronizer::complete`] applies the result if it is still
//! current.

mod fetcher;

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, error, info};
use tuono_router::RouteNode;

use crate::error::{FetchError, RouterError};
use crate::store::{LocationStore, NavigationId};

pub use fetcher::{data_endpoint, DataFetcher, DataResponse, HttpDataFetcher, ResponseInfo, DATA_ENDPOINT_PREFIX};

/// A fetch issued for one navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub navigation_id: NavigationId,
    pub pathname: String,
    pub route_id: String,
}

/// What a navigation needs before it can render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStep {
    /// No fetch; the transition is already closed
    Ready,
    Fetch(FetchTicket),
}

/// How a finished fetch was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Applied,
    /// The endpoint asked for a navigation to this destination instead
    Redirect(String),
    /// The navigation moved on before the fetch finished
    Discarded,
}

pub struct DataSynchronizer {
    store: LocationStore,
    fetcher: Arc<dyn DataFetcher>,
    data: Option<Value>,
    /// Pathname the held data belongs to
    owner: Option<String>,
}

impl std::fmt::Debug for DataSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSynchronizer")
            .field("data", &self.data)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl DataSynchronizer {
    pub fn new(store: LocationStore, fetcher: Arc<dyn DataFetcher>) -> Self {
        Self {
            store,
            fetcher,
            data: None,
            owner: None,
        }
    }

    /// Adopts server-rendered data for the current location, without fetching
    pub fn hydrate(&mut self, initial: Option<Value>) {
        self.owner = Some(self.store.pathname());
        self.data = initial;
        debug!(pathname = ?self.owner, "hydrated with server data");
    }

    /// Reacts to a committed navigation
    ///
    /// Data held for a different pathname is dropped. Routes without
    /// remote data close the transition right away.
    pub fn on_navigation<C>(&mut self, route: Option<&RouteNode<C>>) -> SyncStep {
        let state = self.store.snapshot();
        let pathname = state.location.pathname;

        if self.owner.as_deref() != Some(pathname.as_str()) {
            self.data = None;
            self.owner = None;
        }

        match route {
            Some(route) if route.has_remote_data() => SyncStep::Fetch(FetchTicket {
                navigation_id: state.navigation_id,
                pathname,
                route_id: route.id().to_string(),
            }),
            _ => {
                self.store.stop_transitioning(state.navigation_id);
                SyncStep::Ready
            }
        }
    }

    /// The fetch for `ticket`, detached from `self`
    pub fn request(&self, ticket: &FetchTicket) -> BoxFuture<'static, Result<DataResponse, FetchError>> {
        let fetcher = Arc::clone(&self.fetcher);
        let pathname = ticket.pathname.clone();
        Box::pin(async move { fetcher.fetch(&pathname).await })
    }

    /// Applies a finished fetch if its navigation is still current
    ///
    /// A current result always closes the transition first, whatever the
    /// result is. A fetch error is returned with its cause attached.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<DataResponse, FetchError>,
    ) -> Result<SyncOutcome, RouterError> {
        let state = self.store.snapshot();
        if state.navigation_id != ticket.navigation_id || state.location.pathname != ticket.pathname {
            debug!(
                navigation_id = ticket.navigation_id,
                pathname = %ticket.pathname,
                current = state.navigation_id,
                "discarding stale data"
            );
            return Ok(SyncOutcome::Discarded);
        }

        self.store.stop_transitioning(ticket.navigation_id);

        match result {
            Err(source) => {
                error!(pathname = %ticket.pathname, error = %source, "data fetch failed");
                Err(RouterError::DataFetch {
                    pathname: ticket.pathname,
                    source,
                })
            }
            Ok(response) => match response.info.redirect_destination {
                Some(destination) => {
                    info!(from = %ticket.pathname, to = %destination, "data endpoint redirect");
                    Ok(SyncOutcome::Redirect(destination))
                }
                None => {
                    self.data = response.data;
                    self.owner = Some(ticket.pathname);
                    Ok(SyncOutcome::Applied)
                }
            },
        }
    }

    /// Runs the fetch for `ticket` and applies it
    pub async fn resolve(&mut self, ticket: FetchTicket) -> Result<SyncOutcome, RouterError> {
        let result = self.request(&ticket).await;
        self.complete(ticket, result)
    }

    /// Data for route consumers; absent while a transition is pending
    pub fn data(&self) -> Option<&Value> {
        if self.store.is_transitioning() {
            None
        } else {
            self.data.as_ref()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_transitioning()
    }
}
