//! Route pattern parsing and per-segment matching
//!
//! A pattern is a canonical path whose segments are either literals,
//! `[name]` (one segment) or `[...name]` (every remaining segment, possibly
//! none). `[[...name]]` is accepted as a spelling of the latter.

use std::collections::HashMap;
use std::fmt;

use crate::path;

/// Parameters extracted by a successful match
pub type Params = HashMap<String, String>;

/// One segment of a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, e.g. `about`
    Static(String),
    /// `[name]`
    Dynamic(String),
    /// `[...name]` or `[[...name]]`
    CatchAll(String),
}

impl Segment {
    pub fn class(&self) -> MatchClass {
        match self {
            Self::Static(_) => MatchClass::Static,
            Self::Dynamic(_) => MatchClass::Dynamic,
            Self::CatchAll(_) => MatchClass::CatchAll,
        }
    }
}

/// Precedence class of a whole pattern, weakest segment wins
///
/// Ordering is precedence order: `Static` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchClass {
    Static,
    Dynamic,
    CatchAll,
}

/// Classifies a single path segment
///
/// ```
/// use tuono_router::route::pattern::{classify_segment, Segment};
///
/// assert_eq!(classify_segment("about"), Ok(Segment::Static("about".into())));
/// assert_eq!(classify_segment("[post]"), Ok(Segment::Dynamic("post".into())));
/// assert_eq!(classify_segment("[...all]"), Ok(Segment::CatchAll("all".into())));
/// assert_eq!(classify_segment("[[...all]]"), Ok(Segment::CatchAll("all".into())));
/// assert!(classify_segment("[post").is_err());
/// assert!(classify_segment("[]").is_err());
/// ```
pub fn classify_segment(segment: &str) -> Result<Segment, String> {
    if let Some(inner) = segment
        .strip_prefix("[[...")
        .and_then(|s| s.strip_suffix("]]"))
    {
        return param_name(segment, inner).map(Segment::CatchAll);
    }

    if let Some(inner) = segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return match inner.strip_prefix("...") {
            Some(name) => param_name(segment, name).map(Segment::CatchAll),
            None => param_name(segment, inner).map(Segment::Dynamic),
        };
    }

    if segment.contains(['[', ']']) {
        return Err(format!("unbalanced brackets in segment `{segment}`"));
    }

    Ok(Segment::Static(segment.to_string()))
}

fn param_name(segment: &str, name: &str) -> Result<String, String> {
    if name.is_empty() || name.contains(['[', ']', '.']) {
        return Err(format!("invalid parameter name in segment `{segment}`"));
    }
    Ok(name.to_string())
}

/// A parsed, canonical route pattern such as `/posts/[post]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parses a canonical path into a pattern
    ///
    /// A catch-all segment is only allowed in last position.
    pub fn parse(path: &str) -> Result<Self, String> {
        let raw = path::normalize_path(path).into_owned();
        let segments = path::segments(&raw)
            .map(classify_segment)
            .collect::<Result<Vec<_>, _>>()?;

        let misplaced = segments
            .iter()
            .rev()
            .skip(1)
            .any(|s| matches!(s, Segment::CatchAll(_)));
        if misplaced {
            return Err(format!("catch-all segment must be last in `{raw}`"));
        }

        Ok(Self { raw, segments })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Sort key among patterns that may match the same request
    ///
    /// Weakest class first, then segment classes left to right, so
    /// `/shop/[item]` outranks `/[section]/[item]`.
    pub fn specificity(&self) -> (MatchClass, Vec<MatchClass>) {
        (self.class(), self.segments.iter().map(Segment::class).collect())
    }

    pub fn class(&self) -> MatchClass {
        self.segments
            .iter()
            .map(Segment::class)
            .max()
            .unwrap_or(MatchClass::Static)
    }

    /// Matches already-split request segments, returning extracted params
    ///
    /// ```
    /// use tuono_router::route::pattern::Pattern;
    ///
    /// let pattern = Pattern::parse("/blog/[...slug]").unwrap();
    /// assert_eq!(pattern.matches(&["blog", "x", "y"]).unwrap()["slug"], "x/y");
    /// assert_eq!(pattern.matches(&["blog"]).unwrap()["slug"], "");
    /// assert!(pattern.matches(&["docs"]).is_none());
    /// ```
    pub fn matches(&self, request: &[&str]) -> Option<Params> {
        let mut params = Params::new();

        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll(name) => {
                    let rest = request.get(idx..).unwrap_or_default();
                    params.insert(name.clone(), rest.join("/"));
                    return Some(params);
                }
                Segment::Static(literal) => {
                    if request.get(idx) != Some(&literal.as_str()) {
                        return None;
                    }
                }
                Segment::Dynamic(name) => {
                    let value = request.get(idx).filter(|v| !v.is_empty())?;
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        (request.len() == self.segments.len()).then_some(params)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
