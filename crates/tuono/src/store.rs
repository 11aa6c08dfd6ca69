//! Location store: the single source of truth for "where are we now"

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::location::ParsedLocation;

/// Identifies one navigation; larger is newer
pub type NavigationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStatus {
    Idle,
    Transitioning,
}

/// Current location plus the transition flag of the latest navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub location: ParsedLocation,
    pub is_transitioning: bool,
    pub navigation_id: NavigationId,
}

impl NavigationState {
    pub fn status(&self) -> TransitionStatus {
        if self.is_transitioning {
            TransitionStatus::Transitioning
        } else {
            TransitionStatus::Idle
        }
    }
}

/// Shared, observable navigation state
///
/// Cloning yields another handle to the same state. Only the navigation
/// controller and the data synchronizer write to it; everything else
/// reads a snapshot or subscribes. Writes are visible to subscribers
/// immediately, there is no batching.
#[derive(Debug, Clone)]
pub struct LocationStore {
    tx: Arc<watch::Sender<NavigationState>>,
}

impl LocationStore {
    /// Seeds the store with the hydrated location, idle
    pub fn new(location: ParsedLocation) -> Self {
        let (tx, _) = watch::channel(NavigationState {
            location,
            is_transitioning: false,
            navigation_id: 0,
        });
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> NavigationState {
        self.tx.borrow().clone()
    }

    pub fn location(&self) -> ParsedLocation {
        self.tx.borrow().location.clone()
    }

    pub fn pathname(&self) -> String {
        self.tx.borrow().location.pathname.clone()
    }

    pub fn is_transitioning(&self) -> bool {
        self.tx.borrow().is_transitioning
    }

    pub fn navigation_id(&self) -> NavigationId {
        self.tx.borrow().navigation_id
    }

    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.tx.subscribe()
    }

    /// Commits a navigation target and enters `Transitioning`
    pub(crate) fn begin_navigation(&self, location: ParsedLocation) -> NavigationId {
        let mut id = 0;
        self.tx.send_modify(|state| {
            state.navigation_id += 1;
            state.location = location;
            state.is_transitioning = true;
            id = state.navigation_id;
        });
        debug!(navigation_id = id, pathname = %self.pathname(), "navigation committed");
        id
    }

    /// Returns to `Idle` if `id` is still the current navigation
    ///
    /// Only the first call for a navigation has an effect; later calls and
    /// calls for superseded navigations return `false`.
    pub(crate) fn stop_transitioning(&self, id: NavigationId) -> bool {
        let closed = self.tx.send_if_modified(|state| {
            if state.navigation_id == id && state.is_transitioning {
                state.is_transitioning = false;
                true
            } else {
                false
            }
        });
        if closed {
            debug!(navigation_id = id, "transition closed");
        }
        closed
    }
}
