//! Integration tests for route tree assembly
//!
//! Covers:
//! - Root uniqueness and parent chains
//! - Layout nesting and ordering
//! - Configuration errors
//! - Loading scanner output from JSON

use pretty_assertions::assert_eq;
use tuono_router::*;

fn descriptor(file_path: &str, route_path: &str) -> RouteDescriptor {
    RouteDescriptor::new(file_path, route_path)
}

fn site() -> Vec<RouteDescriptor> {
    vec![
        descriptor("index.tsx", "/"),
        descriptor("about.tsx", "/about"),
        descriptor("__layout.tsx", "/__layout"),
        descriptor("posts/[post].tsx", "/posts/[post]"),
        descriptor("posts/defined-post.tsx", "/posts/defined-post"),
        descriptor("posts/index.tsx", "/posts/"),
        descriptor("posts/__layout.tsx", "/posts/__layout"),
        descriptor("posts/[post]/[comment].tsx", "/posts/[post]/[comment]"),
        descriptor("blog/[...catchAll].tsx", "/blog/[...catchAll]"),
    ]
}

#[test]
fn test_exactly_one_root() {
    let tree = RouteTree::build(&site(), |_| ()).unwrap();

    let roots: Vec<&str> = tree.iter().filter(|n| n.is_root()).map(|n| n.id()).collect();
    assert_eq!(roots, vec![ROOT_ROUTE_ID]);
    assert!(tree.parent(tree.root()).is_none());
}

#[test]
fn test_every_node_reaches_root() {
    let tree = RouteTree::build(&site(), |_| ()).unwrap();

    for node in tree.iter() {
        let chain = tree.chain(node);
        assert_eq!(chain.first().map(|n| n.id()), Some(ROOT_ROUTE_ID));
        assert_eq!(chain.last().map(|n| n.id()), Some(node.id()));
        assert_eq!(chain.len(), node.depth() + 1);
        for pair in chain.windows(2) {
            assert_eq!(pair[1].parent_key(), Some(pair[0].key()));
        }
    }
}

#[test]
fn test_ids_are_unique() {
    let tree = RouteTree::build(&site(), |_| ()).unwrap();
    let mut ids: Vec<&str> = tree.iter().map(|n| n.id()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
    assert_eq!(total, site().len());
}

#[test]
fn test_root_page_and_root_layout_are_distinct() {
    let tree = RouteTree::build(&site(), |_| ()).unwrap();
    let home = tree.get("/").unwrap();
    assert!(home.is_page());
    assert_eq!(tree.parent(home).map(|n| n.id()), Some(ROOT_ROUTE_ID));
}

#[test]
fn test_posts_pages_nest_under_posts_layout() {
    let tree = RouteTree::build(&site(), |_| ()).unwrap();

    for id in ["/posts", "/posts/[post]", "/posts/defined-post", "/posts/[post]/[comment]"] {
        let node = tree.get(id).unwrap();
        assert_eq!(
            tree.parent(node).map(|n| n.id()),
            Some("/posts/__layout"),
            "parent of {id}"
        );
    }

    let blog = tree.get("/blog/[...catchAll]").unwrap();
    assert_eq!(tree.parent(blog).map(|n| n.id()), Some(ROOT_ROUTE_ID));
}

#[test]
fn test_children_follow_sorted_link_order() {
    let tree = RouteTree::build(&site(), |_| ()).unwrap();
    let layout = tree.get("/posts/__layout").unwrap();
    let children: Vec<&str> = tree.children(layout).map(|n| n.id()).collect();
    assert_eq!(
        children,
        vec![
            "/posts",
            "/posts/[post]",
            "/posts/defined-post",
            "/posts/[post]/[comment]"
        ]
    );
}

#[test]
fn test_components_are_attached() {
    let descriptors = vec![
        descriptor("__layout.tsx", "/__layout").with_variable_name("RootLayout"),
        descriptor("about.tsx", "/about").with_variable_name("About"),
    ];
    let tree = RouteTree::build(&descriptors, |d| d.variable_name.clone()).unwrap();

    assert_eq!(tree.root().component(), "RootLayout");
    assert_eq!(tree.get("/about").unwrap().component(), "About");
}

#[test]
fn test_duplicate_page_is_rejected() {
    let descriptors = vec![
        descriptor("__layout.tsx", "/__layout"),
        descriptor("about.tsx", "/about"),
        descriptor("about/index.tsx", "/about/"),
    ];
    let err = RouteTree::build(&descriptors, |_| ()).unwrap_err();
    assert_eq!(
        err,
        TreeError::DuplicateRoute {
            path: "/about".to_string(),
            first: "about/index.tsx".to_string(),
            second: "about.tsx".to_string(),
        }
    );
    assert!(err.to_string().contains("/about"));
}

#[test]
fn test_group_collision_is_rejected() {
    let descriptors = vec![
        descriptor("__layout.tsx", "/__layout"),
        descriptor("(shop)/cart.tsx", ""),
        descriptor("cart.tsx", "/cart"),
    ];
    assert!(matches!(
        RouteTree::build(&descriptors, |_| ()),
        Err(TreeError::DuplicateRoute { .. })
    ));
}

#[test]
fn test_missing_root_layout() {
    let descriptors = vec![descriptor("index.tsx", "/"), descriptor("posts/__layout.tsx", "/posts/__layout")];
    assert_eq!(
        RouteTree::build(&descriptors, |_| ()).unwrap_err(),
        TreeError::MissingRootLayout
    );
}

#[test]
fn test_malformed_descriptor() {
    let descriptors = vec![
        descriptor("__layout.tsx", "/__layout"),
        descriptor("docs/[...rest]/edit.tsx", "/docs/[...rest]/edit"),
    ];
    let err = RouteTree::build(&descriptors, |_| ()).unwrap_err();
    match err {
        TreeError::MalformedDescriptor { file_path, .. } => {
            assert_eq!(file_path, "docs/[...rest]/edit.tsx")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_builds_from_scanner_json() {
    let json = r#"[
        { "filePath": "__layout.tsx", "routePath": "/__layout", "variableName": "RootLayout" },
        { "filePath": "index.tsx", "routePath": "/", "variableName": "Index", "hasHandler": true },
        {
            "filePath": "docs/intro.tsx",
            "routePath": "/docs/intro",
            "variableName": "DocsIntro",
            "parent": { "filePath": "docs/__layout.tsx", "routePath": "/docs/__layout", "variableName": "DocsLayout" }
        },
        { "filePath": "docs/__layout.tsx", "routePath": "/docs/__layout", "variableName": "DocsLayout" }
    ]"#;
    let descriptors: Vec<RouteDescriptor> = serde_json::from_str(json).unwrap();
    let tree = RouteTree::build(&descriptors, |d| d.variable_name.clone()).unwrap();

    assert!(tree.get("/").unwrap().has_remote_data());
    let intro = tree.get("/docs/intro").unwrap();
    assert_eq!(tree.parent(intro).unwrap().component(), "DocsLayout");
}
