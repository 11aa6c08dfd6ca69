//! End-to-end behaviour of the client router: hydration, navigation,
//! redirects, failures and nested-layout rendering

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{origin, site, Reply, ScriptedFetcher, Site, ORIGIN};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tuono::{
    ClientRouter, HandoffError, LinkClick, MemoryHistory, Mode, NavigationOutcome, PayloadHandoff,
    RouterError, ServerLocation, ServerPayload,
};

fn payload(start: &str, data: Value) -> ServerPayload {
    ServerPayload::new(
        Mode::Dev,
        ServerLocation {
            href: format!("{ORIGIN}{start}"),
            pathname: start.to_string(),
            search_str: String::new(),
        },
        data,
    )
}

fn router(site: &Site, fetcher: &Arc<ScriptedFetcher>, start: &str, data: Value) -> ClientRouter<MemoryHistory> {
    ClientRouter::hydrate(
        Arc::clone(&site.tree),
        payload(start, data),
        origin(),
        MemoryHistory::new(start),
        fetcher.clone(),
    )
    .unwrap()
}

fn settled(pathname: &str, matched: bool) -> NavigationOutcome {
    NavigationOutcome::Settled {
        pathname: pathname.to_string(),
        matched,
    }
}

#[tokio::test]
async fn test_hydration_renders_server_data_without_fetching() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    let mut router = router(&site, &fetcher, "/posts/first", json!({ "title": "First" }));

    let html = router.render().into_string();

    assert!(html.contains(r#"data-page="post""#));
    assert!(html.contains("First"));
    assert!(fetcher.calls().is_empty());
    assert!(!router.is_loading());
}

#[tokio::test]
async fn test_sibling_navigation_keeps_layout_instances() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    fetcher.reply("/posts/defined-post", Reply::Data(json!({ "title": "Defined" })));
    let mut router = router(&site, &fetcher, "/posts/first", json!({ "title": "First" }));

    let first = router.render().into_string();
    assert!(first.contains(r#"data-layout="posts" data-instance="1" data-renders="1""#));

    let outcome = router.push("/posts/defined-post").await.unwrap();
    assert_eq!(outcome, settled("/posts/defined-post", true));

    let second = router.render().into_string();
    assert!(second.contains(r#"data-layout="posts" data-instance="1" data-renders="2""#));
    assert!(second.contains(r#"data-layout="root" data-instance="1" data-renders="2""#));
    assert!(second.contains("Defined"));
    assert_eq!(site.root_mounts.load(Ordering::SeqCst), 1);
    assert_eq!(site.posts_mounts.load(Ordering::SeqCst), 1);

    // Re-rendering the same leaf mounts nothing new
    router.render();
    assert_eq!(site.posts_mounts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_leaving_a_layout_unmounts_it() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    let mut router = router(&site, &fetcher, "/posts/first", json!({ "title": "First" }));
    router.render();

    router.push("/about").await.unwrap();
    let html = router.render().into_string();
    assert!(!html.contains(r#"data-layout="posts""#));

    router.push("/posts/again").await.unwrap();
    let html = router.render().into_string();
    assert!(html.contains(r#"data-layout="posts" data-instance="2""#));
    assert_eq!(site.root_mounts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pending_navigation_renders_loading_without_data() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    let mut router = router(&site, &fetcher, "/posts/first", json!({ "title": "First" }));

    let pending = router
        .begin("/posts/second", tuono::HistoryMode::Push, Default::default())
        .unwrap();
    assert!(pending.needs_fetch());

    let html = router.render().into_string();
    assert!(html.contains(r#"data-loading="true""#));
    assert!(!html.contains("First"));

    router.finish(pending).await.unwrap();
    assert!(router.render().into_string().contains(r#"data-loading="false""#));
}

#[tokio::test]
async fn test_default_not_found_is_wrapped_by_root_layout() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    let mut router = router(&site, &fetcher, "/", Value::Null);

    let outcome = router.push("/totally/unknown").await.unwrap();
    assert_eq!(outcome, settled("/totally/unknown", false));

    let html = router.render().into_string();
    assert!(html.starts_with(r#"<div data-layout="root""#));
    assert!(html.contains("<h1>404 Not found</h1>"));
    assert!(html.contains(r#"<a href="/">Return home</a>"#));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_custom_not_found_route_renders_its_chain() {
    let site = site(true);
    let fetcher = ScriptedFetcher::new();
    let mut router = router(&site, &fetcher, "/", Value::Null);

    router.push("/totally/unknown").await.unwrap();

    let html = router.render().into_string();
    assert!(html.contains(r#"data-page="not-found""#));
    assert!(!html.contains("404 Not found"));
}

#[tokio::test]
async fn test_redirect_replaces_history_entry() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    fetcher.reply("/account", Reply::Redirect("/about".to_string()));
    let mut router = router(&site, &fetcher, "/", Value::Null);

    let outcome = router.push("/account").await.unwrap();

    assert_eq!(outcome, settled("/about", true));
    assert_eq!(router.history().entries(), ["/", "/about"]);
    assert!(!router.store().is_transitioning());
    assert!(router.render().into_string().contains(r#"data-page="about""#));
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    fetcher.reply("/posts/a", Reply::Redirect("/posts/b".to_string()));
    fetcher.reply("/posts/b", Reply::Redirect("/posts/a".to_string()));
    let mut router = router(&site, &fetcher, "/", Value::Null);

    let err = router.push("/posts/a").await.unwrap_err();

    assert!(matches!(err, RouterError::RedirectLoop { .. }));
    assert!(!router.store().is_transitioning());
    // The first fetch plus one per followed redirect
    assert_eq!(fetcher.calls().len(), tuono::MAX_REDIRECTS + 1);
    // a -> b five times over ends on b; the sixth redirect is never committed
    assert_eq!(router.store().pathname(), "/posts/b");
    assert_eq!(router.history().entries().len(), 2);
}

#[tokio::test]
async fn test_redirects_up_to_the_limit_settle() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    let hops = ["/posts/a", "/posts/b", "/posts/c", "/posts/d", "/posts/e", "/posts/f"];
    for pair in hops.windows(2) {
        fetcher.reply(pair[0], Reply::Redirect(pair[1].to_string()));
    }
    let mut router = router(&site, &fetcher, "/", Value::Null);

    let outcome = router.push("/posts/a").await.unwrap();

    assert_eq!(outcome, settled("/posts/f", true));
    assert_eq!(fetcher.calls().len(), tuono::MAX_REDIRECTS + 1);
}

#[tokio::test]
async fn test_failed_fetch_keeps_last_good_render() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    fetcher.reply("/account", Reply::Status(500));
    let mut router = router(&site, &fetcher, "/about", Value::Null);
    let before = router.render().into_string();

    let err = router.push("/account").await.unwrap_err();
    assert!(matches!(err, RouterError::DataFetch { .. }));
    assert!(!router.store().is_transitioning());

    assert_eq!(router.render().into_string(), before);
    let overlay = router.error_overlay().unwrap().into_string();
    assert!(overlay.contains("status 500"));

    // Moving on clears the failure
    router.push("/").await.unwrap();
    assert!(router.error_overlay().is_none());
    assert!(router.render().into_string().contains(r#"data-page="home""#));
}

#[tokio::test]
async fn test_failed_fetch_after_loading_render_restores_settled_page() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    fetcher.reply("/account", Reply::Status(500));
    let mut router = router(&site, &fetcher, "/about", Value::Null);
    let before = router.render().into_string();

    let pending = router
        .begin("/account", tuono::HistoryMode::Push, Default::default())
        .unwrap();
    let loading = router.render().into_string();
    assert!(loading.contains(r#"data-page="account""#));
    assert!(loading.contains(r#"data-loading="true""#));

    let err = router.finish(pending).await.unwrap_err();
    assert!(matches!(err, RouterError::DataFetch { .. }));
    assert!(!router.store().is_transitioning());

    let after = router.render().into_string();
    assert_eq!(after, before);
    assert!(!after.contains(r#"data-loading="true""#));
}

#[tokio::test]
async fn test_link_clicks() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    let mut router = router(&site, &fetcher, "/", Value::Null);

    assert!(router.click(&LinkClick::new("#top")).unwrap().is_none());
    assert!(router
        .click(&LinkClick::new("/about").with_target("_blank"))
        .unwrap()
        .is_none());
    assert_eq!(router.store().navigation_id(), 0);

    let pending = router.click(&LinkClick::new("/about")).unwrap().unwrap();
    assert!(!pending.needs_fetch());
    assert_eq!(router.finish(pending).await.unwrap(), settled("/about", true));
    assert_eq!(router.history().entries(), ["/", "/about"]);
}

#[tokio::test]
async fn test_popstate_rederives_location() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    let mut router = router(&site, &fetcher, "/", Value::Null);
    router.push("/posts/one").await.unwrap();

    let live = router.history_mut().back().unwrap();
    let pending = router.popstate(&live).unwrap();
    assert!(router.store().is_transitioning());

    router.finish(pending).await.unwrap();
    assert_eq!(router.context().pathname(), "/");

    let live = router.history_mut().forward().unwrap();
    let pending = router.popstate(&live).unwrap();
    router.finish(pending).await.unwrap();
    assert_eq!(fetcher.calls(), vec!["/posts/one".to_string(), "/posts/one".to_string()]);
}

#[tokio::test]
async fn test_context_exposes_route_and_params() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    let router = router(&site, &fetcher, "/posts/first", Value::Null);

    let ctx = router.context();
    assert_eq!(ctx.route_id(), Some("/posts/[post]"));
    assert_eq!(ctx.param("post"), Some("first"));
    assert!(!ctx.is_transitioning());
    assert_eq!(ctx.mode, Mode::Dev);
}

#[tokio::test]
async fn test_preload_resolves_linked_route() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    let router = router(&site, &fetcher, "/", Value::Null);

    assert!(router.preload("/posts/abc").await.unwrap());
    assert!(!router.preload("/nope/nope").await.unwrap());
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_link_in_view_respects_preload_flag() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    let router = router(&site, &fetcher, "/", Value::Null);

    assert!(router.link_in_view(&LinkClick::new("/about")).await.unwrap());
    assert!(!router
        .link_in_view(&LinkClick::new("/about").without_preload())
        .await
        .unwrap());
    assert!(!router
        .link_in_view(&LinkClick::new("https://elsewhere.dev/about"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_hydrate_from_handoff_consumes_once() {
    let site = site(false);
    let fetcher = ScriptedFetcher::new();
    let handoff = PayloadHandoff::new();
    handoff.publish(payload("/about", Value::Null)).unwrap();

    let router = ClientRouter::hydrate_from(
        &handoff,
        Arc::clone(&site.tree),
        origin(),
        MemoryHistory::new("/about"),
        fetcher.clone(),
    )
    .unwrap();
    assert_eq!(router.context().pathname(), "/about");

    let err = ClientRouter::hydrate_from(
        &handoff,
        Arc::clone(&site.tree),
        origin(),
        MemoryHistory::new("/about"),
        fetcher.clone(),
    )
    .unwrap_err();
    assert!(matches!(err, RouterError::Handoff(HandoffError::AlreadyConsumed)));
}

#[tokio::test]
async fn test_replace_tree_remounts_layouts() {
    let first = site(false);
    let fetcher = ScriptedFetcher::new();
    let mut router = router(&first, &fetcher, "/about", Value::Null);
    router.render();

    let second = site(false);
    router.replace_tree(Arc::clone(&second.tree));
    router.render();

    assert_eq!(first.root_mounts.load(Ordering::SeqCst), 1);
    assert_eq!(second.root_mounts.load(Ordering::SeqCst), 1);
}
