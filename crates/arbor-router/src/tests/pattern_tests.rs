use super::*;
use crate::history::{location_path, path_location};

#[test]
fn named_segments_capture_one_segment() {
    let pattern = RoutePattern::compile("/products/:slug").unwrap();

    assert!(pattern.is_match("/products/abc-123"));
    assert!(!pattern.is_match("/products/abc/reviews"));
    assert!(!pattern.is_match("/products/"));
    assert_eq!(pattern.keys(), ["slug"]);
    assert_eq!(
        pattern.params("/products/abc-123").unwrap().get("slug").map(String::as_str),
        Some("abc-123")
    );
}

#[test]
fn literal_text_is_escaped() {
    let pattern = RoutePattern::compile("/files/report.v1+final").unwrap();

    assert!(pattern.is_match("/files/report.v1+final"));
    assert!(!pattern.is_match("/files/reportXv1final"));
}

#[test]
fn several_params_keep_their_order() {
    let pattern = RoutePattern::compile("/shops/:shop/items/:id").unwrap();
    let params = pattern.params("/shops/north/items/42").unwrap();

    assert_eq!(
        params.into_iter().collect::<Vec<_>>(),
        vec![
            ("shop".to_string(), "north".to_string()),
            ("id".to_string(), "42".to_string())
        ]
    );
}

#[test]
fn prefix_matching_respects_segment_boundaries() {
    let admin = RoutePattern::compile("/admin").unwrap();
    let root = RoutePattern::compile("/").unwrap();

    assert!(admin.is_prefix_of("/admin"));
    assert!(admin.is_prefix_of("/admin/users"));
    assert!(!admin.is_prefix_of("/administrator"));
    assert!(root.is_prefix_of("/anything"));
    assert!(root.is_match("/"));
    assert!(!root.is_match("/anything"));
}

#[test]
fn paths_are_joined_and_normalized() {
    assert_eq!(join_paths("/admin", "users"), "/admin/users");
    assert_eq!(join_paths("/admin/", "/users/"), "/admin/users");
    assert_eq!(join_paths("/", "about"), "/about");
    assert_eq!(join_paths("/admin", ""), "/admin");
    assert_eq!(normalize_path("//a///b/"), "/a/b");
    assert_eq!(normalize_path(""), "/");
    assert_eq!(normalize_path("relative"), "/relative");
}

#[test]
fn locations_map_to_paths() {
    assert_eq!(location_path("#/cart?x=1", true), "/cart?x=1");
    assert_eq!(location_path("", true), "/");
    assert_eq!(location_path("/ignored", true), "/");
    assert_eq!(location_path("/cart#top", false), "/cart");
    assert_eq!(path_location("/cart", true), "#/cart");
    assert_eq!(path_location("/cart", false), "/cart");
}

#[test]
fn memory_history_drops_forward_entries_on_push() {
    let mut history = MemoryHistory::new("/a");
    history.push("/b");
    history.push("/c");
    assert!(history.go(-2));
    assert_eq!(history.location(), "/a");
    assert!(!history.go(-1));

    history.push("/d");

    assert_eq!(history.entries(), ["/a", "/d"]);
    assert!(!history.go(1));
    assert_eq!(history.push_count(), 3);
}
