//! Session history abstraction
//!
//! In a browser this maps onto `pushState`, `replaceState` and
//! `scrollTo`. [`MemoryHistory`] keeps the same semantics in memory for
//! servers, tests and non-browser hosts.

/// Writes the router performs against session history
pub trait History {
    /// Adds an entry after the current one, dropping any forward entries
    fn push_state(&mut self, href: &str);

    /// Overwrites the current entry
    fn replace_state(&mut self, href: &str);

    fn scroll_to(&mut self, x: u32, y: u32);
}

/// In-memory session history with back/forward traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
    scroll: (u32, u32),
}

impl MemoryHistory {
    pub fn new(initial_href: impl Into<String>) -> Self {
        Self {
            entries: vec![initial_href.into()],
            index: 0,
            scroll: (0, 0),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    pub fn scroll_position(&self) -> (u32, u32) {
        self.scroll
    }

    /// Simulates the user scrolling the page
    pub fn set_scroll(&mut self, x: u32, y: u32) {
        self.scroll = (x, y);
    }

    /// Moves back one entry and returns the now-live href
    ///
    /// Feed the result to the router's popstate handler.
    pub fn back(&mut self) -> Option<String> {
        self.index = self.index.checked_sub(1)?;
        Some(self.current().to_string())
    }

    pub fn forward(&mut self) -> Option<String> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.current().to_string())
    }
}

impl History for MemoryHistory {
    fn push_state(&mut self, href: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(href.to_string());
        self.index = self.entries.len() - 1;
    }

    fn replace_state(&mut self, href: &str) {
        self.entries[self.index] = href.to_string();
    }

    fn scroll_to(&mut self, x: u32, y: u32) {
        self.scroll = (x, y);
    }
}
