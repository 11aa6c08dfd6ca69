//! Shared fixtures for the client runtime tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use maud::{html, Markup};
use serde_json::{json, Value};
use tuono::component::{Component, MountedComponent, Preload, RouteProps, SharedComponent};
use tuono::tuono_router::{RouteDescriptor, RouteTree};
use tuono::{DataFetcher, DataResponse, FetchError, FnComponent, RouterError};
use url::Url;

pub const ORIGIN: &str = "http://localhost:3000";

pub fn origin() -> Url {
    Url::parse(ORIGIN).unwrap()
}

/// What the fake endpoint answers for a pathname
#[derive(Debug, Clone)]
pub enum Reply {
    Data(Value),
    Redirect(String),
    Status(u16),
}

/// Records every call and answers from a script; unknown paths get `{}`
#[derive(Default)]
pub struct ScriptedFetcher {
    calls: Mutex<Vec<String>>,
    replies: Mutex<HashMap<String, Reply>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, pathname: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(pathname.to_string(), reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataFetcher for ScriptedFetcher {
    async fn fetch(&self, pathname: &str) -> Result<DataResponse, FetchError> {
        self.calls.lock().unwrap().push(pathname.to_string());
        let reply = self.replies.lock().unwrap().get(pathname).cloned();
        match reply {
            Some(Reply::Data(data)) => Ok(DataResponse::with_data(data)),
            Some(Reply::Redirect(to)) => Ok(DataResponse::redirect(to)),
            Some(Reply::Status(code)) => Err(FetchError::Status(code)),
            None => Ok(DataResponse::with_data(json!({ "pathname": pathname }))),
        }
    }
}

/// Layout whose instances carry a serial number assigned at mount time
pub struct CountingLayout {
    name: String,
    mounts: Arc<AtomicUsize>,
}

impl CountingLayout {
    pub fn new(name: &str) -> (SharedComponent, Arc<AtomicUsize>) {
        let mounts = Arc::new(AtomicUsize::new(0));
        let layout = Self {
            name: name.to_string(),
            mounts: Arc::clone(&mounts),
        };
        (Arc::new(layout), mounts)
    }
}

#[async_trait]
impl Preload for CountingLayout {
    async fn preload(&self) -> Result<(), RouterError> {
        Ok(())
    }
}

impl Component for CountingLayout {
    fn name(&self) -> &str {
        &self.name
    }

    fn mount(&self) -> Box<dyn MountedComponent> {
        let serial = self.mounts.fetch_add(1, Ordering::SeqCst) + 1;
        Box::new(CountingInstance {
            name: self.name.clone(),
            serial,
            renders: 0,
        })
    }
}

struct CountingInstance {
    name: String,
    serial: usize,
    renders: usize,
}

impl MountedComponent for CountingInstance {
    fn render(&mut self, _props: RouteProps<'_>, content: Markup) -> Markup {
        self.renders += 1;
        html! {
            div data-layout=(self.name) data-instance=(self.serial) data-renders=(self.renders) {
                (content)
            }
        }
    }
}

/// Page printing its name and the `title` field of its data
pub fn page(name: &'static str) -> SharedComponent {
    FnComponent::new(name, move |props, _| {
        let title = props
            .data
            .and_then(|d| d.get("title"))
            .and_then(Value::as_str)
            .unwrap_or("-")
            .to_string();
        let loading = if props.is_loading { "true" } else { "false" };
        html! {
            section data-page=(name) data-loading=(loading) { (title) }
        }
    })
    .shared()
}

pub struct Site {
    pub tree: Arc<RouteTree<SharedComponent>>,
    pub root_mounts: Arc<AtomicUsize>,
    pub posts_mounts: Arc<AtomicUsize>,
}

/// Root layout, `/posts` layout and a handful of pages.
/// `/posts/*` and `/account` declare remote data, `/about` does not.
pub fn site(with_not_found: bool) -> Site {
    let (root, root_mounts) = CountingLayout::new("root");
    let (posts, posts_mounts) = CountingLayout::new("posts");

    let mut descriptors = vec![
        RouteDescriptor::new("__layout.tsx", "/__layout").with_variable_name("Root"),
        RouteDescriptor::new("index.tsx", "/").with_variable_name("Home"),
        RouteDescriptor::new("about.tsx", "/about").with_variable_name("About"),
        RouteDescriptor::new("account.tsx", "/account")
            .with_variable_name("Account")
            .with_remote_data(),
        RouteDescriptor::new("posts/__layout.tsx", "/posts/__layout").with_variable_name("PostsLayout"),
        RouteDescriptor::new("posts/[post].tsx", "/posts/[post]")
            .with_variable_name("Post")
            .with_remote_data(),
        RouteDescriptor::new("posts/defined-post.tsx", "/posts/defined-post")
            .with_variable_name("DefinedPost")
            .with_remote_data(),
    ];
    if with_not_found {
        descriptors.push(RouteDescriptor::new("404.tsx", "/404").with_variable_name("NotFound"));
    }

    let tree = RouteTree::build(&descriptors, |d| match d.variable_name.as_str() {
        "Root" => Arc::clone(&root),
        "PostsLayout" => Arc::clone(&posts),
        "Home" => page("home"),
        "About" => page("about"),
        "Account" => page("account"),
        "Post" => page("post"),
        "DefinedPost" => page("defined-post"),
        _ => page("not-found"),
    })
    .unwrap();

    Site {
        tree: Arc::new(tree),
        root_mounts,
        posts_mounts,
    }
}
