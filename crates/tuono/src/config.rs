// File: src/config.rs
// Purpose: Configuration parsing from tuono.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE: &str = "tuono.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub dev: DevConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Public origin when served behind a proxy, e.g. `https://example.com`
    #[serde(default)]
    pub origin: Option<String>,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// JSON route descriptor list written by the scanner
    #[serde(default = "default_routes_file")]
    pub routes_file: String,
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,

    /// Static files served in dev; prod serves the client build instead
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

/// Development configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevConfig {
    #[serde(default = "default_true")]
    pub hot_reload: bool,

    /// Port of the bundler dev server
    #[serde(default = "default_dev_server_port")]
    pub dev_server_port: u16,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_dev_server_port() -> u16 {
    3001
}

fn default_routes_file() -> String {
    ".tuono/routes.json".to_string()
}

fn default_manifest_path() -> String {
    "out/client/.vite/manifest.json".to_string()
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            origin: None,
        }
    }
}

impl ServerConfig {
    /// Configured origin, or `http://host:port`
    pub fn origin(&self) -> String {
        self.origin
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            routes_file: default_routes_file(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            manifest_path: default_manifest_path(),
            public_dir: default_public_dir(),
        }
    }
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            hot_reload: true,
            dev_server_port: default_dev_server_port(),
        }
    }
}

impl Config {
    /// Load configuration from a toml file
    ///
    /// A missing or empty file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from ./tuono.toml
    pub fn load_default() -> Result<Self> {
        Self::load(CONFIG_FILE)
    }
}
