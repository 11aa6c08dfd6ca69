//! Request dispatch, data endpoint and the SSR document

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Json, Redirect, Response},
};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde_json::Value;
use tracing::{debug, error};
use tuono::data::DATA_ENDPOINT_PREFIX;
use tuono::payload::DevServerConfig;
use tuono::render::error_overlay;
use tuono::{DataResponse, Mode, RenderComposer, RouteProps, RouterError, ServerLocation, ServerPayload, SharedComponent};
use tuono_router::{Params, RouteNode, RouteTree};

use crate::handler::{HandlerResponse, RequestContext};
use crate::manifest::RouteBundle;
use crate::AppState;

/// Id of the element the client mounts into
pub const MOUNT_ID: &str = "__tuono";

pub async fn handle(State(state): State<AppState>, uri: Uri) -> Response {
    match data_pathname(uri.path()) {
        Some(pathname) => {
            let pathname = pathname.to_string();
            data_response(&state, &pathname, &uri).await
        }
        None => page_response(&state, &uri).await,
    }
}

/// `/__tuono/data/posts/a` into `/posts/a`; `None` for page requests
pub fn data_pathname(path: &str) -> Option<&str> {
    match path.strip_prefix(DATA_ENDPOINT_PREFIX)? {
        "" => Some("/"),
        rest if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

fn decode_params(params: Params) -> Params {
    params
        .into_iter()
        .map(|(name, value)| {
            let decoded = urlencoding::decode(&value).map(|v| v.into_owned()).unwrap_or(value);
            (name, decoded)
        })
        .collect()
}

async fn run_handler(
    state: &AppState,
    route: &RouteNode<SharedComponent>,
    ctx: RequestContext,
) -> Option<HandlerResponse> {
    if !route.has_remote_data() {
        return None;
    }
    let Some(handler) = state.handlers.get(route.id()) else {
        debug!(route = %route.id(), "route has remote data but no handler registered");
        return None;
    };
    Some(handler(ctx).await)
}

async fn data_response(state: &AppState, pathname: &str, uri: &Uri) -> Response {
    let tree = state.tree.current();
    let Some(found) = tree.match_path(pathname) else {
        return (StatusCode::NOT_FOUND, Json(DataResponse::default())).into_response();
    };

    let ctx = RequestContext::new(uri.clone(), pathname, decode_params(found.params.clone()));
    match run_handler(state, found.route, ctx).await {
        None => Json(DataResponse::default()).into_response(),
        Some(HandlerResponse::Props(data)) => Json(DataResponse::with_data(data)).into_response(),
        Some(HandlerResponse::Redirect { destination, .. }) => Json(DataResponse::redirect(destination)).into_response(),
        Some(HandlerResponse::NotFound) => (StatusCode::NOT_FOUND, Json(DataResponse::default())).into_response(),
    }
}

async fn page_response(state: &AppState, uri: &Uri) -> Response {
    let tree = state.tree.current();
    let pathname = uri.path();
    let found = tree.match_path(pathname);

    let mut data = Value::Null;
    let mut leaf = found.as_ref().map(|m| m.route);

    if let Some(found) = &found {
        let ctx = RequestContext::new(uri.clone(), pathname, decode_params(found.params.clone()));
        match run_handler(state, found.route, ctx).await {
            Some(HandlerResponse::Props(props)) => data = props,
            Some(HandlerResponse::Redirect { destination, permanent }) => {
                return if permanent {
                    Redirect::permanent(&destination).into_response()
                } else {
                    Redirect::temporary(&destination).into_response()
                };
            }
            Some(HandlerResponse::NotFound) => leaf = None,
            None => {}
        }
    }

    let status = if leaf.is_some() { StatusCode::OK } else { StatusCode::NOT_FOUND };

    if let Err(err) = preload_chain(&tree, leaf).await {
        error!(pathname = %pathname, error = %err, "failed to load route components");
        return (StatusCode::INTERNAL_SERVER_ERROR, Html(error_overlay(&err, state.mode).into_string())).into_response();
    }

    let body = {
        let mut composer = RenderComposer::new();
        let props = RouteProps {
            data: (!data.is_null()).then_some(&data),
            is_loading: false,
        };
        composer.compose(&tree, leaf, props)
    };

    let bundle = state.manifest.bundles_for(&tree, leaf.or_else(|| tree.not_found_route()));
    let payload = server_payload(state, uri, data, &bundle);
    match document(state, &payload, &bundle, body) {
        Ok(markup) => (status, Html(markup.into_string())).into_response(),
        Err(err) => {
            error!(pathname = %pathname, error = %err, "failed to serialize the server payload");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(error_overlay(&err, state.mode).into_string())).into_response()
        }
    }
}

/// Every component of the chain that will render, loaded
async fn preload_chain(
    tree: &RouteTree<SharedComponent>,
    leaf: Option<&RouteNode<SharedComponent>>,
) -> Result<(), RouterError> {
    let chain = match leaf.or_else(|| tree.not_found_route()) {
        Some(leaf) => tree.chain(leaf),
        None => vec![tree.root()],
    };
    for node in chain {
        node.component().preload().await?;
    }
    Ok(())
}

pub fn server_payload(state: &AppState, uri: &Uri, data: Value, bundle: &RouteBundle) -> ServerPayload {
    let search_str = uri.query().filter(|q| !q.is_empty()).map(|q| format!("?{q}")).unwrap_or_default();
    let location = ServerLocation {
        href: format!("{}{}{}", state.config.server.origin(), uri.path(), search_str),
        pathname: uri.path().to_string(),
        search_str,
    };

    let mut payload = ServerPayload::new(state.mode, location, data);
    match state.mode {
        Mode::Dev => {
            payload.dev_server_config = Some(DevServerConfig {
                host: state.config.server.host.clone(),
                port: state.config.dev.dev_server_port,
                origin: state.config.server.origin.clone(),
            });
        }
        Mode::Prod => {
            payload.js_bundles = Some(bundle.js_files.clone());
            payload.css_bundles = Some(bundle.css_files.clone());
        }
    }
    payload
}

fn dev_client_url(state: &AppState) -> String {
    format!(
        "http://{}:{}/vite-server/client-main.tsx",
        state.config.server.host, state.config.dev.dev_server_port
    )
}

/// Full HTML document around a rendered body
pub fn document(
    state: &AppState,
    payload: &ServerPayload,
    bundle: &RouteBundle,
    body: Markup,
) -> Result<Markup, RouterError> {
    let script = payload.to_script()?;
    Ok(html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if state.mode == Mode::Prod {
                    @for css in &bundle.css_files {
                        link rel="stylesheet" type="text/css" href={ "/" (css) };
                    }
                }
            }
            body {
                div id=(MOUNT_ID) { (body) }
                (PreEscaped(script))
                @match state.mode {
                    Mode::Dev => {
                        script type="module" src=(dev_client_url(state)) {}
                    }
                    Mode::Prod => {
                        @for js in &bundle.js_files {
                            script type="module" src={ "/" (js) } {}
                        }
                    }
                }
            }
        }
    })
}
