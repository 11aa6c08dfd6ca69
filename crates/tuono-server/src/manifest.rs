//! Vite build manifest and per-route bundles
//!
//! Bundles are correlated through the matched chain: every node whose
//! source file appears in the manifest contributes its chunk, its css and
//! the chunks it imports. Layout bundles therefore follow the tree rather
//! than path prefixes.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tuono_router::{RouteNode, RouteTree};

/// Key of the client entry chunk
pub const CLIENT_ENTRY: &str = "client-main.tsx";

/// Prefix vite puts in front of route sources
pub const ROUTES_PREFIX: &str = "../src/routes/";

/// One manifest entry, as written by `build.manifest`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BundleInfo {
    pub file: String,
    #[serde(default)]
    pub css: Vec<String>,
    #[serde(default)]
    pub imports: Vec<String>,
}

pub type ViteManifest = HashMap<String, BundleInfo>;

/// Files a page needs, in load order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteBundle {
    pub js_files: Vec<String>,
    pub css_files: Vec<String>,
}

impl RouteBundle {
    fn push_js(&mut self, file: &str) {
        if !self.js_files.iter().any(|f| f == file) {
            self.js_files.push(file.to_string());
        }
    }

    fn push_css<'a>(&mut self, files: impl IntoIterator<Item = &'a String>) {
        for file in files {
            if !self.css_files.contains(file) {
                self.css_files.push(file.clone());
            }
        }
    }

    fn extend_with(&mut self, info: &BundleInfo) {
        self.push_js(&info.file);
        self.push_css(&info.css);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: ViteManifest,
}

impl Manifest {
    /// Manifest with no entries, as in dev mode
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_vite(entries: ViteManifest) -> Self {
        Self { entries }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;
        let entries: ViteManifest = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest file: {}", path.display()))?;
        Ok(Self::from_vite(entries))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&BundleInfo> {
        self.entries.get(key)
    }

    /// Entry chunk first, then each chain node root-first with its imports
    pub fn bundles_for<C>(&self, tree: &RouteTree<C>, leaf: Option<&RouteNode<C>>) -> RouteBundle {
        let mut bundle = RouteBundle::default();
        if let Some(entry) = self.entries.get(CLIENT_ENTRY) {
            bundle.extend_with(entry);
        }

        let chain = match leaf {
            Some(leaf) => tree.chain(leaf),
            None => vec![tree.root()],
        };

        for node in chain {
            let Some(info) = self.entries.get(&source_key(node.file_path())) else {
                continue;
            };
            bundle.extend_with(info);
            for import in info.imports.iter().filter(|i| i.as_str() != CLIENT_ENTRY) {
                if let Some(imported) = self.entries.get(import) {
                    bundle.extend_with(imported);
                }
            }
        }

        bundle
    }
}

/// `posts/[post].tsx` into `../src/routes/posts/[post].tsx`
fn source_key(file_path: &str) -> String {
    let relative = file_path
        .replace('\\', "/")
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_string();
    let relative = relative.strip_prefix("src/routes/").unwrap_or(&relative);
    format!("{ROUTES_PREFIX}{relative}")
}
