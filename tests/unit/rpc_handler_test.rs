//! Unit tests for the RPC handler: every method dispatched by `handle_method`.
//!
//! These tests exercise the methods through the same code path used by the
//! `minimark-rpc` binary, using a temporary on-disk SQLite database.

use serde_json::{json, Value};
use std::sync::Mutex;
use tempfile::TempDir;

use minimark::app::App;
use minimark::rpc_handler::handle_method;

/// Create a fresh App backed by a temp directory DB.
fn setup() -> (Mutex<App>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db_path = tmp.path().join("test.db");
    let app = App::new(&db_path).expect("Failed to init App");
    (Mutex::new(app), tmp)
}

fn call(app: &Mutex<App>, method: &str, params: Value) -> Value {
    handle_method(app, method, &params).unwrap_or_else(|e| panic!("{} failed: {}", method, e))
}

fn default_group(app: &Mutex<App>) -> String {
    call(app, "group.list", Value::Null)[0]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn create_text(app: &Mutex<App>, group_id: &str, title: &str) -> String {
    call(
        app,
        "bookmark.create",
        json!({ "title": title, "type": "text", "groupId": group_id }),
    )["id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn list(app: &Mutex<App>, group_id: &str) -> Vec<Value> {
    call(app, "bookmark.list", json!({ "groupId": group_id }))
        .as_array()
        .unwrap()
        .clone()
}

// ─── Ping and errors ───

#[test]
fn test_ping() {
    let (app, _tmp) = setup();
    assert_eq!(call(&app, "ping", json!({})), json!("pong"));
}

#[test]
fn test_unknown_method_returns_error() {
    let (app, _tmp) = setup();
    let err = handle_method(&app, "nonexistent.method", &json!({})).unwrap_err();
    assert_eq!(err, "unknown method: nonexistent.method");
}

#[test]
fn test_bad_params_are_reported() {
    let (app, _tmp) = setup();
    let err = handle_method(&app, "bookmark.create", &json!({ "title": 5 })).unwrap_err();
    assert!(err.starts_with("invalid params"), "{}", err);
}

// ─── Groups ───

#[test]
fn test_store_starts_with_default_group() {
    let (app, _tmp) = setup();
    let groups = call(&app, "group.list", Value::Null);
    assert_eq!(groups.as_array().unwrap().len(), 1);
    assert_eq!(groups[0]["name"], "Bookmarks");
    assert_eq!(groups[0]["isPublic"], false);
    assert_eq!(groups[0]["bookmarkCount"], 0);
}

#[test]
fn test_group_lifecycle() {
    let (app, _tmp) = setup();
    let first = default_group(&app);
    let created = call(&app, "group.create", json!({ "name": "Work", "color": "#208368" }));
    let id = created["id"].as_str().unwrap().to_string();

    let updated = call(&app, "group.update", json!({ "id": id, "name": "Office" }));
    assert_eq!(updated["name"], "Office");
    assert_eq!(updated["color"], "#208368");

    let public = call(&app, "group.setVisibility", json!({ "id": id, "isPublic": true }));
    assert_eq!(public["isPublic"], true);

    create_text(&app, &id, "moved on delete");
    assert_eq!(call(&app, "group.delete", json!({ "id": id })), json!({ "success": true }));
    assert_eq!(list(&app, &first).len(), 1);
}

#[test]
fn test_last_group_delete_fails() {
    let (app, _tmp) = setup();
    let only = default_group(&app);
    let err = handle_method(&app, "group.delete", &json!({ "id": only })).unwrap_err();
    assert!(err.contains("last group"), "{}", err);
}

// ─── Bookmarks ───

#[test]
fn test_create_link_uses_wire_names() {
    let (app, _tmp) = setup();
    let group = default_group(&app);
    let created = call(
        &app,
        "bookmark.create",
        json!({ "title": "example.com", "url": "example.com", "groupId": group }),
    );
    assert_eq!(created["type"], "link");
    assert_eq!(created["url"], "https://example.com");
    assert_eq!(created["favicon"], "https://example.com/favicon.ico");
    assert_eq!(created["groupId"], group);
    assert_eq!(created["isPublic"], Value::Null);
}

#[test]
fn test_list_without_params_returns_everything() {
    let (app, _tmp) = setup();
    let group = default_group(&app);
    create_text(&app, &group, "a");
    create_text(&app, &group, "b");
    assert_eq!(call(&app, "bookmark.list", Value::Null).as_array().unwrap().len(), 2);
}

#[test]
fn test_update_and_move() {
    let (app, _tmp) = setup();
    let group = default_group(&app);
    let other = call(&app, "group.create", json!({ "name": "Other", "color": "#FFDC00" }))["id"]
        .as_str()
        .unwrap()
        .to_string();
    let id = create_text(&app, &group, "draft");

    let renamed = call(&app, "bookmark.update", json!({ "id": id, "title": "final" }));
    assert_eq!(renamed["title"], "final");

    let moved = call(&app, "bookmark.update", json!({ "id": id, "groupId": other }));
    assert_eq!(moved["groupId"], other);
    assert!(list(&app, &group).is_empty());
}

#[test]
fn test_refetch_text_bookmark_fails() {
    let (app, _tmp) = setup();
    let group = default_group(&app);
    let id = create_text(&app, &group, "note");
    let err = handle_method(&app, "bookmark.refetch", &json!({ "id": id })).unwrap_err();
    assert!(err.contains("no URL"), "{}", err);
}

#[test]
fn test_single_delete() {
    let (app, _tmp) = setup();
    let group = default_group(&app);
    let id = create_text(&app, &group, "gone");
    assert_eq!(call(&app, "bookmark.delete", json!({ "id": id })), json!({ "success": true }));
    assert!(list(&app, &group).is_empty());
}

#[test]
fn test_bulk_methods_report_counts() {
    let (app, _tmp) = setup();
    let group = default_group(&app);
    let other = call(&app, "group.create", json!({ "name": "Other", "color": "#FFDC00" }))["id"]
        .as_str()
        .unwrap()
        .to_string();
    let a = create_text(&app, &group, "a");
    let b = create_text(&app, &group, "b");
    let c = create_text(&app, &group, "c");

    let visibility = call(
        &app,
        "bookmark.bulkSetVisibility",
        json!({ "ids": [a, b], "isPublic": true }),
    );
    assert_eq!(visibility, json!({ "success": true, "count": 2 }));

    let moved = call(
        &app,
        "bookmark.bulkMove",
        json!({ "ids": [a, b], "targetGroupId": other }),
    );
    assert_eq!(moved["count"], 2);
    assert!(list(&app, &other).iter().all(|b| b["isPublic"].is_null()));

    let deleted = call(&app, "bookmark.bulkDelete", json!({ "ids": [c, "ghost"] }));
    assert_eq!(deleted, json!({ "success": true, "count": 1 }));
}

#[test]
fn test_bulk_methods_need_ids() {
    let (app, _tmp) = setup();
    for (method, params) in [
        ("bookmark.bulkDelete", json!({ "ids": [] })),
        ("bookmark.bulkMove", json!({ "ids": [], "targetGroupId": "x" })),
        ("bookmark.bulkSetVisibility", json!({ "ids": [] })),
    ] {
        let err = handle_method(&app, method, &params).unwrap_err();
        assert_eq!(err, "ids cannot be empty", "{}", method);
    }
}

#[test]
fn test_single_visibility_accepts_null_as_inherit() {
    let (app, _tmp) = setup();
    let group = default_group(&app);
    let id = create_text(&app, &group, "x");
    let private = call(&app, "bookmark.setVisibility", json!({ "id": id, "isPublic": false }));
    assert_eq!(private["isPublic"], false);
    let inherit = call(&app, "bookmark.setVisibility", json!({ "id": id, "isPublic": null }));
    assert_eq!(inherit["isPublic"], Value::Null);
}
