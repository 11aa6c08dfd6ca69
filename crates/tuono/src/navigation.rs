//! Navigation controller: link interception and imperative push/replace

use std::collections::BTreeMap;

use tracing::{debug, trace};
use url::Url;

use crate::error::RouterError;
use crate::history::History;
use crate::location::ParsedLocation;
use crate::store::{LocationStore, NavigationId};

/// Options for push/replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Reset the scroll position to the top of the page
    pub scroll: bool,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self { scroll: true }
    }
}

impl NavigateOptions {
    pub fn no_scroll() -> Self {
        Self { scroll: false }
    }
}

/// Which history write a navigation performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Push,
    Replace,
}

/// Modifier keys held during a link activation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.meta || self.ctrl || self.shift || self.alt
    }
}

/// A link activation as seen by the router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkClick {
    pub href: String,
    pub target: Option<String>,
    pub modifiers: Modifiers,
    pub replace: bool,
    pub scroll: bool,
    /// Preload the target route once the link is in view
    pub preload: bool,
}

impl LinkClick {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            target: None,
            modifiers: Modifiers::default(),
            replace: false,
            scroll: true,
            preload: true,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }

    pub fn without_scroll(mut self) -> Self {
        self.scroll = false;
        self
    }

    pub fn without_preload(mut self) -> Self {
        self.preload = false;
        self
    }

    fn targets_same_window(&self) -> bool {
        matches!(self.target.as_deref(), None | Some("") | Some("_self"))
    }
}

/// What happened to a link activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Left to the browser; default action not prevented
    Native,
    /// Taken over client-side; default action prevented
    Navigated(NavigationId),
}

impl LinkOutcome {
    pub fn prevents_default(&self) -> bool {
        matches!(self, Self::Navigated(_))
    }
}

/// Translates navigation intents into store and history writes
#[derive(Debug)]
pub struct NavigationController<H> {
    store: LocationStore,
    history: H,
    origin: Url,
}

impl<H: History> NavigationController<H> {
    pub fn new(store: LocationStore, history: H, origin: Url) -> Self {
        Self {
            store,
            history,
            origin,
        }
    }

    pub fn store(&self) -> &LocationStore {
        &self.store
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn pathname(&self) -> String {
        self.store.pathname()
    }

    pub fn query(&self) -> BTreeMap<String, String> {
        self.store.location().search
    }

    /// Resolves `target` against the current location
    pub fn resolve(&self, target: &str) -> Result<Url, RouterError> {
        let base = Url::parse(&self.store.location().href).unwrap_or_else(|_| self.origin.clone());
        ParsedLocation::resolve(&base, target)
    }

    pub(crate) fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    pub fn push(&mut self, target: &str, options: NavigateOptions) -> Result<NavigationId, RouterError> {
        self.navigate(target, HistoryMode::Push, options)
    }

    pub fn replace(&mut self, target: &str, options: NavigateOptions) -> Result<NavigationId, RouterError> {
        self.navigate(target, HistoryMode::Replace, options)
    }

    /// Commits a client-side navigation
    ///
    /// The store enters `Transitioning` before the history write, so
    /// observers see the new target synchronously.
    pub fn navigate(
        &mut self,
        target: &str,
        mode: HistoryMode,
        options: NavigateOptions,
    ) -> Result<NavigationId, RouterError> {
        let url = self.resolve(target)?;
        if !self.is_same_origin(&url) {
            return Err(RouterError::CrossOrigin {
                target: target.to_string(),
            });
        }

        let location = ParsedLocation::from_url(&url);
        let href = location.relative_href();
        let id = self.store.begin_navigation(location);

        match mode {
            HistoryMode::Push => self.history.push_state(&href),
            HistoryMode::Replace => self.history.replace_state(&href),
        }
        if options.scroll {
            self.history.scroll_to(0, 0);
        }

        debug!(navigation_id = id, href = %href, ?mode, "navigated");
        Ok(id)
    }

    /// Back/forward: re-derives the location from the live href
    ///
    /// History is already in place, so nothing is written to it.
    pub fn on_popstate(&mut self, live_href: &str) -> Result<NavigationId, RouterError> {
        let url = ParsedLocation::resolve(&self.origin, live_href)?;
        let id = self.store.begin_navigation(ParsedLocation::from_url(&url));
        debug!(navigation_id = id, href = %live_href, "popstate");
        Ok(id)
    }

    /// Whether a link activation should stay with the browser
    pub fn is_native(&self, click: &LinkClick) -> bool {
        if click.href.starts_with('#') || click.modifiers.any() || !click.targets_same_window() {
            return true;
        }
        match self.resolve(&click.href) {
            Ok(url) => !self.is_same_origin(&url),
            Err(_) => true,
        }
    }

    pub fn handle_link_click(&mut self, click: &LinkClick) -> Result<LinkOutcome, RouterError> {
        if self.is_native(click) {
            trace!(href = %click.href, "link left to the browser");
            return Ok(LinkOutcome::Native);
        }

        let mode = if click.replace {
            HistoryMode::Replace
        } else {
            HistoryMode::Push
        };
        let options = NavigateOptions {
            scroll: click.scroll,
        };
        self.navigate(&click.href, mode, options)
            .map(LinkOutcome::Navigated)
    }
}
