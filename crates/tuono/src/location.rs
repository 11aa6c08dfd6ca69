//! Parsed URL locations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RouterError;
use crate::payload::ServerLocation;

/// A URL split the way route consumers read it
///
/// `pathname` never carries the query or the fragment. `search_str` keeps
/// its leading `?` and `hash` its leading `#`; both are empty when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLocation {
    pub href: String,
    pub pathname: String,
    /// Query parameters; a repeated key keeps its last value
    pub search: BTreeMap<String, String>,
    pub search_str: String,
    pub hash: String,
}

impl ParsedLocation {
    pub fn from_url(url: &Url) -> Self {
        let search_str = match url.query() {
            Some(query) if !query.is_empty() => format!("?{query}"),
            _ => String::new(),
        };
        let hash = match url.fragment() {
            Some(fragment) if !fragment.is_empty() => format!("#{fragment}"),
            _ => String::new(),
        };

        Self {
            href: url.to_string(),
            pathname: url.path().to_string(),
            search: url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            search_str,
            hash,
        }
    }

    /// Parses an absolute href
    pub fn parse(href: &str) -> Result<Self, RouterError> {
        Url::parse(href)
            .map(|url| Self::from_url(&url))
            .map_err(|source| RouterError::InvalidLocation {
                target: href.to_string(),
                source,
            })
    }

    /// Resolves `target` (absolute, root-relative or relative) against `base`
    pub fn resolve(base: &Url, target: &str) -> Result<Url, RouterError> {
        base.join(target)
            .map_err(|source| RouterError::InvalidLocation {
                target: target.to_string(),
                source,
            })
    }

    /// Seeds a location from the server payload
    ///
    /// The payload's `href` is trusted when it parses; otherwise the
    /// location is rebuilt from `pathname` and `search_str` on `origin`.
    pub fn from_server(origin: &Url, location: &ServerLocation) -> Result<Self, RouterError> {
        if let Ok(url) = Url::parse(&location.href) {
            return Ok(Self::from_url(&url));
        }
        let target = format!("{}{}", location.pathname, location.search_str);
        Self::resolve(origin, &target).map(|url| Self::from_url(&url))
    }

    /// `pathname + search + hash`, suitable for history entries
    pub fn relative_href(&self) -> String {
        format!("{}{}{}", self.pathname, self.search_str, self.hash)
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.search.get(key).map(String::as_str)
    }
}
