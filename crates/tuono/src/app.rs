//! Client router: hydration, navigation lifecycle and rendering

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use maud::Markup;
use tracing::{debug, error, warn};
use tuono_router::{RouteMatch, RouteTree};
use url::Url;

use crate::component::{RouteProps, SharedComponent};
use crate::data::{DataFetcher, DataResponse, DataSynchronizer, SyncOutcome, SyncStep};
use crate::error::{FetchError, RouterError};
use crate::history::History;
use crate::location::ParsedLocation;
use crate::navigation::{HistoryMode, LinkClick, LinkOutcome, NavigateOptions, NavigationController};
use crate::payload::{Mode, PayloadHandoff, ServerPayload};
use crate::render::{error_overlay, RenderComposer};
use crate::store::{LocationStore, NavigationId, NavigationState};

/// Redirects followed by [`ClientRouter::finish`] before giving up
pub const MAX_REDIRECTS: usize = 5;

pub type SharedTree = Arc<RouteTree<SharedComponent>>;

/// A committed navigation that may still need its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNavigation {
    pub navigation_id: NavigationId,
    pub pathname: String,
    pub step: SyncStep,
}

impl PendingNavigation {
    pub fn needs_fetch(&self) -> bool {
        matches!(self.step, SyncStep::Fetch(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Data is in place; `matched` is false for the not-found render
    Settled { pathname: String, matched: bool },
    /// A newer navigation took over before this one finished
    Superseded,
    /// The endpoint redirected; the replacement navigation is pending
    Redirected(PendingNavigation),
}

/// Read-only view handed down the render tree
pub struct RouterContext<'a> {
    pub state: NavigationState,
    pub route: Option<RouteMatch<'a, SharedComponent>>,
    pub tree: &'a RouteTree<SharedComponent>,
    pub mode: Mode,
}

impl std::fmt::Debug for RouterContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterContext")
            .field("state", &self.state)
            .field("route", &self.route.as_ref().map(|m| m.route.id()))
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl RouterContext<'_> {
    pub fn pathname(&self) -> &str {
        &self.state.location.pathname
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.state.location.search
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.is_transitioning
    }

    pub fn route_id(&self) -> Option<&str> {
        self.route.as_ref().map(|m| m.route.id())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.route.as_ref()?.params.get(name).map(String::as_str)
    }
}

pub struct ClientRouter<H> {
    tree: SharedTree,
    navigation: NavigationController<H>,
    sync: DataSynchronizer,
    composer: RenderComposer,
    mode: Mode,
    /// Last successful render, kept on screen after a failed fetch
    last_good: Option<Markup>,
    /// Pathname whose data failed to load, with its overlay
    failure: Option<(String, Markup)>,
}

impl<H> std::fmt::Debug for ClientRouter<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRouter")
            .field("mode", &self.mode)
            .field("routes", &self.tree.len())
            .field("sync", &self.sync)
            .field("composer", &self.composer)
            .finish_non_exhaustive()
    }
}

impl<H: History> ClientRouter<H> {
    /// Seeds the router from the server payload
    ///
    /// The payload's data is adopted as-is; nothing is fetched.
    pub fn hydrate(
        tree: SharedTree,
        payload: ServerPayload,
        origin: Url,
        history: H,
        fetcher: Arc<dyn DataFetcher>,
    ) -> Result<Self, RouterError> {
        let location = ParsedLocation::from_server(&origin, &payload.location)?;
        debug!(pathname = %location.pathname, mode = ?payload.mode, "hydrating");

        let store = LocationStore::new(location);
        let mut sync = DataSynchronizer::new(store.clone(), fetcher);
        sync.hydrate(payload.initial_data());

        Ok(Self {
            tree,
            navigation: NavigationController::new(store, history, origin),
            sync,
            composer: RenderComposer::new(),
            mode: payload.mode,
            last_good: None,
            failure: None,
        })
    }

    /// Like [`ClientRouter::hydrate`], taking the payload from a handoff slot
    pub fn hydrate_from(
        handoff: &PayloadHandoff,
        tree: SharedTree,
        origin: Url,
        history: H,
        fetcher: Arc<dyn DataFetcher>,
    ) -> Result<Self, RouterError> {
        let payload = handoff.take()?;
        Self::hydrate(tree, payload, origin, history, fetcher)
    }

    pub fn store(&self) -> &LocationStore {
        self.navigation.store()
    }

    pub fn history(&self) -> &H {
        self.navigation.history()
    }

    pub fn history_mut(&mut self) -> &mut H {
        self.navigation.history_mut()
    }

    pub fn tree(&self) -> &SharedTree {
        &self.tree
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        self.sync.data()
    }

    pub fn is_loading(&self) -> bool {
        self.sync.is_loading()
    }

    pub fn context(&self) -> RouterContext<'_> {
        let state = self.store().snapshot();
        RouterContext {
            route: self.tree.match_path(&state.location.pathname),
            state,
            tree: &self.tree,
            mode: self.mode,
        }
    }

    /// Commits a navigation and decides whether data must be fetched
    pub fn begin(
        &mut self,
        target: &str,
        mode: HistoryMode,
        options: NavigateOptions,
    ) -> Result<PendingNavigation, RouterError> {
        let id = self.navigation.navigate(target, mode, options)?;
        Ok(self.after_commit(id))
    }

    /// Back/forward to `live_href`
    pub fn popstate(&mut self, live_href: &str) -> Result<PendingNavigation, RouterError> {
        let id = self.navigation.on_popstate(live_href)?;
        Ok(self.after_commit(id))
    }

    /// Handles a link activation; `None` when the browser keeps it
    pub fn click(&mut self, click: &LinkClick) -> Result<Option<PendingNavigation>, RouterError> {
        match self.navigation.handle_link_click(click)? {
            LinkOutcome::Native => Ok(None),
            LinkOutcome::Navigated(id) => Ok(Some(self.after_commit(id))),
        }
    }

    fn after_commit(&mut self, navigation_id: NavigationId) -> PendingNavigation {
        let pathname = self.navigation.pathname();
        let tree = Arc::clone(&self.tree);
        let route = tree.match_path(&pathname).map(|m| m.route);
        if route.is_none() {
            debug!(pathname = %pathname, "no route matched, rendering not found");
        }
        let step = self.sync.on_navigation(route);
        PendingNavigation {
            navigation_id,
            pathname,
            step,
        }
    }

    /// Detached fetch for a pending navigation, `None` when nothing to fetch
    pub fn request(
        &self,
        pending: &PendingNavigation,
    ) -> Option<BoxFuture<'static, Result<DataResponse, FetchError>>> {
        match &pending.step {
            SyncStep::Fetch(ticket) => Some(self.sync.request(ticket)),
            SyncStep::Ready => None,
        }
    }

    /// Applies the fetch result of a pending navigation
    ///
    /// Redirects commit a `replace` navigation to the destination and
    /// return it as [`NavigationOutcome::Redirected`].
    pub fn complete(
        &mut self,
        pending: PendingNavigation,
        result: Result<DataResponse, FetchError>,
    ) -> Result<NavigationOutcome, RouterError> {
        self.apply(pending, result, true)
    }

    fn apply(
        &mut self,
        pending: PendingNavigation,
        result: Result<DataResponse, FetchError>,
        follow_redirect: bool,
    ) -> Result<NavigationOutcome, RouterError> {
        let ticket = match pending.step {
            SyncStep::Ready => return Ok(self.settled(pending.pathname)),
            SyncStep::Fetch(ticket) => ticket,
        };

        match self.sync.complete(ticket, result) {
            Ok(SyncOutcome::Applied) => Ok(self.settled(pending.pathname)),
            Ok(SyncOutcome::Discarded) => Ok(NavigationOutcome::Superseded),
            Ok(SyncOutcome::Redirect(destination)) if !follow_redirect => {
                warn!(pathname = %pending.pathname, to = %destination, "redirect limit reached");
                Err(RouterError::RedirectLoop {
                    pathname: pending.pathname,
                })
            }
            Ok(SyncOutcome::Redirect(destination)) => self
                .begin(&destination, HistoryMode::Replace, NavigateOptions::default())
                .map(NavigationOutcome::Redirected),
            Err(err) => {
                error!(error = %err, "navigation data failed");
                self.failure = Some((pending.pathname, error_overlay(&err, self.mode)));
                Err(err)
            }
        }
    }

    fn settled(&mut self, pathname: String) -> NavigationOutcome {
        self.failure = None;
        NavigationOutcome::Settled {
            matched: self.tree.has_match(&pathname),
            pathname,
        }
    }

    /// Drives a pending navigation to completion, following at most
    /// [`MAX_REDIRECTS`] redirects
    pub async fn finish(&mut self, pending: PendingNavigation) -> Result<NavigationOutcome, RouterError> {
        let mut pending = pending;
        let mut redirects = 0;
        loop {
            let result = match self.request(&pending) {
                Some(fetch) => fetch.await,
                None => Ok(DataResponse::default()),
            };
            match self.apply(pending, result, redirects < MAX_REDIRECTS)? {
                NavigationOutcome::Redirected(next) => {
                    redirects += 1;
                    pending = next;
                }
                outcome => return Ok(outcome),
            }
        }
    }

    pub async fn push(&mut self, target: &str) -> Result<NavigationOutcome, RouterError> {
        let pending = self.begin(target, HistoryMode::Push, NavigateOptions::default())?;
        self.finish(pending).await
    }

    pub async fn replace(&mut self, target: &str) -> Result<NavigationOutcome, RouterError> {
        let pending = self.begin(target, HistoryMode::Replace, NavigateOptions::default())?;
        self.finish(pending).await
    }

    /// Preloads the component behind `href`, e.g. when a link scrolls into view
    ///
    /// Returns `false` when no route matches.
    pub async fn preload(&self, href: &str) -> Result<bool, RouterError> {
        let url = self.navigation.resolve(href)?;
        let tree = Arc::clone(&self.tree);
        let component = match tree.match_path(url.path()) {
            Some(found) => Arc::clone(found.route.component()),
            None => return Ok(false),
        };
        component.preload().await?;
        Ok(true)
    }

    /// Called when a link scrolls into view
    ///
    /// Links that opted out of preloading or leave the origin are skipped.
    pub async fn link_in_view(&self, link: &LinkClick) -> Result<bool, RouterError> {
        if !link.preload {
            return Ok(false);
        }
        let url = self.navigation.resolve(&link.href)?;
        if !self.navigation.is_same_origin(&url) {
            return Ok(false);
        }
        self.preload(url.as_str()).await
    }

    /// Renders the current location
    ///
    /// After a failed fetch for the current pathname the last settled
    /// render stays on screen; loading renders never become it.
    pub fn render(&mut self) -> Markup {
        let pathname = self.navigation.pathname();
        if let Some((failed, _)) = &self.failure {
            if *failed == pathname {
                if let Some(last_good) = &self.last_good {
                    return last_good.clone();
                }
            }
        }

        let tree = Arc::clone(&self.tree);
        let leaf = tree.match_path(&pathname).map(|m| m.route);
        let props = RouteProps {
            data: self.sync.data(),
            is_loading: self.sync.is_loading(),
        };
        let markup = self.composer.compose(&tree, leaf, props);
        if !props.is_loading {
            self.last_good = Some(markup.clone());
        }
        markup
    }

    /// Overlay for the latest data failure of the current pathname
    pub fn error_overlay(&self) -> Option<Markup> {
        let pathname = self.navigation.pathname();
        self.failure
            .as_ref()
            .filter(|(failed, _)| *failed == pathname)
            .map(|(_, overlay)| overlay.clone())
    }

    /// Installs a rebuilt tree; mounted layouts start over
    pub fn replace_tree(&mut self, tree: SharedTree) {
        debug!(routes = tree.len(), "route tree replaced");
        self.tree = tree;
        self.composer.reset();
    }
}
