//! Server-side data handlers, one per route id

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::http::Uri;
use futures::future::BoxFuture;
use serde_json::Value;
use tuono_router::Params;

/// What a data handler sees of the request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub pathname: String,
    pub params: Params,
    pub query: HashMap<String, String>,
    pub uri: Uri,
}

impl RequestContext {
    pub fn new(uri: Uri, pathname: impl Into<String>, params: Params) -> Self {
        let query = uri.query().map(parse_query).unwrap_or_default();
        Self {
            pathname: pathname.into(),
            params,
            query,
            uri,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// `a=1&b=two%20words` into a map; a repeated key keeps its last value
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(component: &str) -> String {
    let component = component.replace('+', " ");
    urlencoding::decode(&component)
        .map(|s| s.into_owned())
        .unwrap_or(component)
}

/// Result of a data handler
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResponse {
    /// Data handed to the route's components
    Props(Value),
    Redirect { destination: String, permanent: bool },
    NotFound,
}

impl HandlerResponse {
    pub fn redirect(destination: impl Into<String>) -> Self {
        Self::Redirect {
            destination: destination.into(),
            permanent: false,
        }
    }
}

pub type HandlerFn = Arc<dyn Fn(RequestContext) -> BoxFuture<'static, HandlerResponse> + Send + Sync>;

/// Data handlers keyed by route id (e.g. `/posts/[post]`)
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerFn>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, Fut>(&mut self, route_id: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResponse> + Send + 'static,
    {
        let handler: HandlerFn =
            Arc::new(move |ctx: RequestContext| -> BoxFuture<'static, HandlerResponse> { Box::pin(f(ctx)) });
        self.handlers.insert(route_id.into(), handler);
        self
    }

    pub fn get(&self, route_id: &str) -> Option<&HandlerFn> {
        self.handlers.get(route_id)
    }

    pub fn contains(&self, route_id: &str) -> bool {
        self.handlers.contains_key(route_id)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}
