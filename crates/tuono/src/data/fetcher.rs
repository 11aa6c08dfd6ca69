use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;
use url::Url;

use crate::error::FetchError;

/// Path prefix of the remote data endpoint
pub const DATA_ENDPOINT_PREFIX: &str = "/__tuono/data";

/// Endpoint path serving the data of `pathname`
///
/// ```
/// assert_eq!(tuono::data::data_endpoint("/posts/a"), "/__tuono/data/posts/a");
/// assert_eq!(tuono::data::data_endpoint("/"), "/__tuono/data/");
/// ```
pub fn data_endpoint(pathname: &str) -> String {
    format!("{DATA_ENDPOINT_PREFIX}{pathname}")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_destination: Option<String>,
}

/// Body returned by the data endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default)]
    pub info: ResponseInfo,
}

impl DataResponse {
    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            info: ResponseInfo::default(),
        }
    }

    pub fn redirect(destination: impl Into<String>) -> Self {
        Self {
            data: None,
            info: ResponseInfo {
                redirect_destination: Some(destination.into()),
            },
        }
    }

    pub fn redirect_destination(&self) -> Option<&str> {
        self.info.redirect_destination.as_deref()
    }
}

/// Loads route data for a pathname
#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn fetch(&self, pathname: &str) -> Result<DataResponse, FetchError>;
}

/// [`DataFetcher`] issuing `GET <origin>/__tuono/data<pathname>`
#[derive(Debug, Clone)]
pub struct HttpDataFetcher {
    client: reqwest::Client,
    origin: Url,
}

impl HttpDataFetcher {
    pub fn new(origin: Url) -> Self {
        Self::with_client(reqwest::Client::new(), origin)
    }

    /// Reuses a configured client, e.g. one with timeouts
    pub fn with_client(client: reqwest::Client, origin: Url) -> Self {
        Self { client, origin }
    }

    pub fn endpoint_url(&self, pathname: &str) -> Result<Url, FetchError> {
        Ok(self.origin.join(&data_endpoint(pathname))?)
    }
}

#[async_trait]
impl DataFetcher for HttpDataFetcher {
    async fn fetch(&self, pathname: &str) -> Result<DataResponse, FetchError> {
        let url = self.endpoint_url(pathname)?;
        trace!(%url, "fetching route data");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
