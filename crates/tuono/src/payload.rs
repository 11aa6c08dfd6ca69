//! Server-to-client payload and its one-shot handoff
//!
//! The SSR host serializes a [`ServerPayload`] into the page as a global.
//! The client reads it exactly once at hydration; afterwards the live
//! location is the only source of truth.

use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HandoffError;

/// Name of the global the payload is assigned to
pub const PAYLOAD_GLOBAL: &str = "__TUONO_SSR_PROPS__";

/// Environment variable selecting the [`Mode`]
pub const MODE_ENV: &str = "TUONO_MODE";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Dev,
    Prod,
}

impl Mode {
    /// `TUONO_MODE=prod` (or `production`) selects `Prod`; anything else is `Dev`
    pub fn from_env() -> Self {
        match std::env::var(MODE_ENV) {
            Ok(value) if matches!(value.to_ascii_lowercase().as_str(), "prod" | "production") => {
                Self::Prod
            }
            _ => Self::Dev,
        }
    }

    pub fn is_dev(self) -> bool {
        self == Self::Dev
    }
}

/// The request location as the server saw it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerLocation {
    pub href: String,
    pub pathname: String,
    #[serde(default)]
    pub search_str: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPayload {
    pub mode: Mode,
    pub location: ServerLocation,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js_bundles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_bundles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_server_config: Option<DevServerConfig>,
}

impl ServerPayload {
    pub fn new(mode: Mode, location: ServerLocation, data: Value) -> Self {
        Self {
            mode,
            location,
            data,
            js_bundles: None,
            css_bundles: None,
            dev_server_config: None,
        }
    }

    /// Data as handed to the first render; `null` means none
    pub fn initial_data(&self) -> Option<Value> {
        (!self.data.is_null()).then(|| self.data.clone())
    }

    /// `<script>` tag assigning the payload to [`PAYLOAD_GLOBAL`]
    pub fn to_script(&self) -> Result<String, HandoffError> {
        let json = serde_json::to_string(self)?.replace("</", "<\\/");
        Ok(format!("<script>window.{PAYLOAD_GLOBAL} = {json}</script>"))
    }

    /// Reads a payload back out of rendered HTML
    pub fn extract_from_html(html: &str) -> Result<Self, HandoffError> {
        let marker = format!("window.{PAYLOAD_GLOBAL} = ");
        let start = html.find(&marker).ok_or(HandoffError::NotPublished)? + marker.len();
        let rest = &html[start..];
        let end = rest.find("</script>").unwrap_or(rest.len());
        Ok(serde_json::from_str(rest[..end].trim_end_matches([';', ' ', '\n']))?)
    }
}

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Ready(Box<ServerPayload>),
    Consumed,
}

/// Write-once, read-once channel for the server payload
#[derive(Debug, Default)]
pub struct PayloadHandoff {
    slot: Mutex<Slot>,
}

static GLOBAL: Lazy<PayloadHandoff> = Lazy::new(PayloadHandoff::default);

impl PayloadHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide handoff slot
    pub fn global() -> &'static PayloadHandoff {
        &GLOBAL
    }

    pub fn publish(&self, payload: ServerPayload) -> Result<(), HandoffError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match *slot {
            Slot::Empty => {
                *slot = Slot::Ready(Box::new(payload));
                Ok(())
            }
            _ => Err(HandoffError::AlreadyPublished),
        }
    }

    /// Extracts the payload from server HTML and publishes it
    pub fn publish_html(&self, html: &str) -> Result<(), HandoffError> {
        self.publish(ServerPayload::extract_from_html(html)?)
    }

    pub fn take(&self) -> Result<ServerPayload, HandoffError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *slot, Slot::Consumed) {
            Slot::Ready(payload) => Ok(*payload),
            Slot::Empty => {
                *slot = Slot::Empty;
                Err(HandoffError::NotPublished)
            }
            Slot::Consumed => Err(HandoffError::AlreadyConsumed),
        }
    }
}
