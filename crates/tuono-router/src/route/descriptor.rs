//! Route descriptors produced by the file-system scanner

use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::path;

/// Reserved file stem marking a layout
pub const LAYOUT_FILE_STEM: &str = "__layout";

/// Reserved file stem collapsing to its directory path
pub const INDEX_FILE_STEM: &str = "index";

/// One entry of the scanner's route list
///
/// ```
/// use tuono_router::RouteDescriptor;
///
/// let desc: RouteDescriptor = serde_json::from_str(
///     r#"{ "filePath": "posts/[post].tsx", "routePath": "/posts/[post]", "variableName": "PostsPost" }"#,
/// ).unwrap();
/// assert!(desc.parent.is_none());
/// assert!(!desc.has_remote_data);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    pub file_path: String,

    /// Route path as emitted by the scanner; derived from `file_path` when empty
    #[serde(default)]
    pub route_path: String,

    #[serde(default)]
    pub variable_name: String,

    #[serde(default)]
    pub parent: Option<Box<RouteDescriptor>>,

    /// Whether a server data handler exists for this route
    #[serde(default, alias = "hasHandler")]
    pub has_remote_data: bool,
}

impl RouteDescriptor {
    pub fn new(file_path: impl Into<String>, route_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            route_path: route_path.into(),
            variable_name: String::new(),
            parent: None,
            has_remote_data: false,
        }
    }

    pub fn with_variable_name(mut self, name: impl Into<String>) -> Self {
        self.variable_name = name.into();
        self
    }

    pub fn with_remote_data(mut self) -> Self {
        self.has_remote_data = true;
        self
    }

    pub fn with_parent(mut self, parent: RouteDescriptor) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Computes the URL-facing path and the kind of this descriptor
    pub fn normalize(&self) -> Result<NormalizedRoute, TreeError> {
        let source = if self.route_path.trim().is_empty() {
            self.file_path.as_str()
        } else {
            self.route_path.as_str()
        };
        if source.trim().is_empty() {
            return Err(TreeError::malformed(
                &self.file_path,
                "empty route path and file path",
            ));
        }

        let source = source.replace('\\', "/");
        let trailing_slash = source.len() > 1 && source.ends_with('/');

        let mut segments: Vec<String> = path::segments(&source).map(str::to_string).collect();
        if let Some(last) = segments.last_mut() {
            *last = strip_extension(last).to_string();
        }

        let is_layout = segments.last().is_some_and(|s| s == LAYOUT_FILE_STEM);
        if is_layout {
            segments.pop();
        }

        let is_index = !is_layout
            && (trailing_slash
                || segments.is_empty()
                || segments.last().is_some_and(|s| s == INDEX_FILE_STEM));
        if segments.last().is_some_and(|s| s == INDEX_FILE_STEM) {
            segments.pop();
        }

        let cleaned: Vec<&str> = segments
            .iter()
            .filter(|s| !is_group_segment(s))
            .map(|s| strip_private_prefix(s))
            .filter(|s| !s.is_empty())
            .collect();

        let path = if cleaned.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", cleaned.join("/"))
        };

        Ok(NormalizedRoute {
            path,
            is_layout,
            is_index,
        })
    }
}

/// Result of [`RouteDescriptor::normalize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRoute {
    /// Canonical path, e.g. `/posts/[post]`; a layout's path is its directory
    pub path: String,
    pub is_layout: bool,
    pub is_index: bool,
}

/// `(marketing)` style folders only organize files
fn is_group_segment(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('(') && segment.ends_with(')')
}

fn strip_private_prefix(segment: &str) -> &str {
    if segment.starts_with('[') {
        segment
    } else {
        segment.trim_start_matches('_')
    }
}

/// `about.tsx` -> `about`, `[...slug].mdx` -> `[...slug]`, `[...slug]` untouched
fn strip_extension(segment: &str) -> &str {
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => segment,
    }
}
