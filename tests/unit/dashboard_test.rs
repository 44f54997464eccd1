//! End-to-end tests for the dashboard view-model.
//!
//! The dashboard talks to an in-memory reference server through
//! `InProcessTransport`, wrapped so individual RPC methods can be made to
//! fail on demand.

use std::cell::RefCell;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

use minimark::backend::{InProcessTransport, RpcClient, Transport};
use minimark::cache::{CacheKey, EntryStatus};
use minimark::dashboard::{Dashboard, Effect};
use minimark::events::EventTarget;
use minimark::managers::bookmark_manager::BookmarkManagerTrait;
use minimark::managers::group_manager::GroupManagerTrait;
use minimark::managers::revalidation_manager::{VisibilityState, WindowEvent};
use minimark::managers::shortcut_manager::{Key, KeyEvent, ShortcutAction};
use minimark::types::bookmark::{BookmarkType, Visibility};
use minimark::types::errors::{MutationError, RemoteError, ValidationError};
use minimark::types::group::DEFAULT_GROUP_PALETTE;
use minimark::types::notification::Notice;
use minimark::types::rpc::CreateBookmarkInput;
use minimark::types::settings::DashboardSettings;
use minimark::types::temp_id::is_temp_id;

/// Forwards to the in-process server unless the method was marked as failing.
struct FlakyTransport {
    inner: InProcessTransport,
    failing: RefCell<HashSet<String>>,
}

impl FlakyTransport {
    fn fail(&self, method: &str) {
        self.failing.borrow_mut().insert(method.to_string());
    }

    fn heal(&self) {
        self.failing.borrow_mut().clear();
    }
}

#[async_trait(?Send)]
impl Transport for FlakyTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RemoteError> {
        if self.failing.borrow().contains(method) {
            return Err(RemoteError::Network(format!("{} unreachable", method)));
        }
        self.inner.call(method, params).await
    }
}

type TestDashboard = Dashboard<RpcClient<FlakyTransport>>;

fn transport(dashboard: &TestDashboard) -> &FlakyTransport {
    dashboard.backend().transport()
}

/// Inserts a bookmark straight into the server store, bypassing the client.
fn seed(dashboard: &TestDashboard, group_id: &str, title: &str, url: Option<&str>) -> String {
    let app = transport(dashboard).inner.app().lock().unwrap();
    let kind = if url.is_some() { BookmarkType::Link } else { BookmarkType::Text };
    app.bookmarks()
        .create_bookmark(&CreateBookmarkInput {
            title: title.to_string(),
            url: url.map(str::to_string),
            kind,
            color: None,
            group_id: group_id.to_string(),
        })
        .unwrap()
        .id
}

fn server_group(dashboard: &TestDashboard, name: &str) -> String {
    let app = transport(dashboard).inner.app().lock().unwrap();
    app.groups().create_group(name, "#74B06F").unwrap().id
}

async fn setup() -> TestDashboard {
    let inner = InProcessTransport::open_in_memory().unwrap();
    let flaky = FlakyTransport {
        inner,
        failing: RefCell::new(HashSet::new()),
    };
    let mut dashboard = Dashboard::new(RpcClient::new(flaky), DashboardSettings::default()).unwrap();
    dashboard.load().await.unwrap();
    dashboard
}

fn current(dashboard: &TestDashboard) -> String {
    dashboard.selection().selected_group().unwrap().to_string()
}

fn titles(dashboard: &TestDashboard) -> Vec<String> {
    dashboard.bookmarks().iter().map(|b| b.title.clone()).collect()
}

fn messages(notices: &[Notice]) -> Vec<&str> {
    notices.iter().map(|n| n.message.as_str()).collect()
}

// ─── Loading ───

#[tokio::test]
async fn test_load_selects_default_group() {
    let dashboard = setup().await;
    let groups = dashboard.cache().groups().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Bookmarks");
    assert_eq!(current(&dashboard), groups[0].id);
    assert_eq!(
        dashboard.cache().status(&CacheKey::bookmarks(Some(&groups[0].id))),
        Some(EntryStatus::Fresh)
    );
}

// ─── Bookmarks ───

#[tokio::test]
async fn test_add_bookmark_reconciles_with_server_row() {
    let mut dashboard = setup().await;
    dashboard.add_bookmark("example.com").await.unwrap();

    let list = dashboard.bookmarks();
    assert_eq!(list.len(), 1);
    assert!(!is_temp_id(&list[0].id));
    assert_eq!(list[0].url.as_deref(), Some("https://example.com"));
    assert_eq!(list[0].favicon.as_deref(), Some("https://example.com/favicon.ico"));
    let group = dashboard.cache().group(&current(&dashboard)).unwrap();
    assert_eq!(group.bookmark_count, 1);
    assert!(dashboard.take_notices().is_empty());
}

#[tokio::test]
async fn test_failed_create_rolls_back_and_notifies() {
    let mut dashboard = setup().await;
    transport(&dashboard).fail("bookmark.create");

    let err = dashboard.add_bookmark("just a note").await.unwrap_err();
    assert!(matches!(err, MutationError::RolledBack(_)));
    assert!(dashboard.bookmarks().is_empty());
    assert_eq!(dashboard.cache().group(&current(&dashboard)).unwrap().bookmark_count, 0);

    let notices = dashboard.take_notices();
    assert_eq!(messages(&notices), vec!["Failed to create bookmark"]);
    assert!(notices[0].is_error());
}

#[tokio::test]
async fn test_blank_input_is_rejected_without_notice() {
    let mut dashboard = setup().await;
    let err = dashboard.add_bookmark("   ").await.unwrap_err();
    assert_eq!(err, MutationError::Invalid(ValidationError::EmptyTitle));
    assert!(dashboard.take_notices().is_empty());
}

#[tokio::test]
async fn test_rename_persists_on_server() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    let id = seed(&dashboard, &group, "Old", Some("https://old.example.com"));
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&group)));
    dashboard.reconcile().await.unwrap();

    dashboard.start_rename(&id);
    assert!(dashboard.keyboard_view().renaming);
    dashboard.rename_bookmark(&id, "New").await.unwrap();

    assert!(dashboard.selection().renaming().is_none());
    assert_eq!(titles(&dashboard), vec!["New"]);
    let app = transport(&dashboard).inner.app().lock().unwrap();
    assert_eq!(app.bookmarks().get_bookmark(&id).unwrap().title, "New");
}

/// Refetching a list the server already agrees with leaves it untouched.
#[tokio::test]
async fn test_reconcile_after_rename_is_idempotent() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    let first = seed(&dashboard, &group, "Old", Some("https://old.example.com"));
    seed(&dashboard, &group, "Other", None);
    dashboard.cache_mut().invalidate(&CacheKey::Groups);
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&group)));
    dashboard.reconcile().await.unwrap();

    dashboard.rename_bookmark(&first, "New").await.unwrap();
    let list_key = CacheKey::bookmarks(Some(&group));
    let list_before = dashboard.cache().snapshot(&list_key);
    let groups_before = dashboard.cache().snapshot(&CacheKey::Groups);

    dashboard.cache_mut().invalidate(&list_key);
    dashboard.cache_mut().invalidate(&CacheKey::Groups);
    assert_eq!(dashboard.reconcile().await.unwrap(), 2);

    assert_eq!(dashboard.cache().snapshot(&list_key), list_before);
    assert_eq!(dashboard.cache().snapshot(&CacheKey::Groups), groups_before);
    let mut names = titles(&dashboard);
    names.sort();
    assert_eq!(names, vec!["New", "Other"]);
    assert!(dashboard.take_notices().is_empty());
}

#[tokio::test]
async fn test_move_bookmark_updates_both_groups() {
    let mut dashboard = setup().await;
    let source = current(&dashboard);
    let target = server_group(&dashboard, "Later");
    let id = seed(&dashboard, &source, "Rust", Some("https://rust-lang.org"));
    dashboard.cache_mut().invalidate(&CacheKey::Groups);
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&source)));
    dashboard.reconcile().await.unwrap();

    dashboard.move_bookmark(&id, &target).await.unwrap();

    assert!(dashboard.bookmarks().is_empty());
    assert_eq!(dashboard.cache().group(&source).unwrap().bookmark_count, 0);
    assert_eq!(dashboard.cache().group(&target).unwrap().bookmark_count, 1);
}

/// Bulk delete failure: rows come back in order, selection mode ends, error shown.
///
/// Validates: bulk delete rollback
#[tokio::test]
async fn test_failed_bulk_delete_restores_rows_and_exits_selection() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    let ids: Vec<String> = ["one", "two", "three"]
        .iter()
        .map(|title| seed(&dashboard, &group, title, None))
        .collect();
    dashboard.cache_mut().invalidate(&CacheKey::Groups);
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&group)));
    dashboard.reconcile().await.unwrap();
    let before = titles(&dashboard);

    dashboard.enter_selection(None);
    for id in &ids {
        dashboard.toggle_selection(id);
    }
    assert_eq!(dashboard.selection().selected_count(), 3);

    transport(&dashboard).fail("bookmark.bulkDelete");
    assert!(dashboard.delete_selected().await.is_err());

    assert_eq!(titles(&dashboard), before);
    assert_eq!(dashboard.cache().group(&group).unwrap().bookmark_count, 3);
    assert!(!dashboard.selection().in_selection_mode());
    assert_eq!(
        messages(&dashboard.take_notices()),
        vec!["Failed to delete bookmarks"]
    );
}

#[tokio::test]
async fn test_bulk_delete_and_move_report_counts() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    let target = server_group(&dashboard, "Archive");
    let ids: Vec<String> = ["a", "b", "c"]
        .iter()
        .map(|title| seed(&dashboard, &group, title, None))
        .collect();
    dashboard.cache_mut().invalidate(&CacheKey::Groups);
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&group)));
    dashboard.reconcile().await.unwrap();

    dashboard.enter_selection(Some(&ids[0]));
    dashboard.toggle_selection(&ids[1]);
    dashboard.move_selected(&target).await.unwrap();
    assert_eq!(titles(&dashboard), vec!["c"]);
    assert_eq!(dashboard.cache().group(&target).unwrap().bookmark_count, 2);

    dashboard.enter_selection(Some(&ids[2]));
    dashboard.delete_selected().await.unwrap();
    assert!(dashboard.bookmarks().is_empty());
    assert_eq!(dashboard.cache().group(&group).unwrap().bookmark_count, 0);

    assert_eq!(
        messages(&dashboard.take_notices()),
        vec!["Moved 2 bookmarks", "Deleted 1 bookmarks"]
    );
}

#[tokio::test]
async fn test_toggle_visibility_in_private_group_makes_public() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    let id = seed(&dashboard, &group, "Post", Some("https://blog.example.com"));
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&group)));
    dashboard.reconcile().await.unwrap();

    dashboard.toggle_bookmark_visibility(&id).await.unwrap();
    assert_eq!(dashboard.bookmarks()[0].visibility, Visibility::Public);

    dashboard.toggle_bookmark_visibility(&id).await.unwrap();
    assert_eq!(dashboard.bookmarks()[0].visibility, Visibility::Inherit);
}

#[tokio::test]
async fn test_refetch_reports_outcome() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    let link = seed(&dashboard, &group, "Docs", Some("https://docs.rs"));
    let text = seed(&dashboard, &group, "plain", None);

    let refreshed = dashboard.refetch_bookmark(&link).await.unwrap();
    assert_eq!(refreshed.favicon.as_deref(), Some("https://docs.rs/favicon.ico"));
    assert!(dashboard.refetch_bookmark(&text).await.is_err());

    assert_eq!(
        messages(&dashboard.take_notices()),
        vec!["Metadata refreshed", "Failed to refresh metadata"]
    );
}

#[tokio::test]
async fn test_copy_selected_urls_skips_rows_without_url() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    let text = seed(&dashboard, &group, "note", None);
    let link = seed(&dashboard, &group, "Site", Some("https://site.example.com"));
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&group)));
    dashboard.reconcile().await.unwrap();

    dashboard.enter_selection(Some(&text));
    assert_eq!(dashboard.copy_selected_urls(), None);

    dashboard.toggle_selection(&link);
    assert_eq!(
        dashboard.copy_selected_urls().as_deref(),
        Some("https://site.example.com")
    );
    assert_eq!(
        dashboard.take_effects(),
        vec![Effect::Copy("https://site.example.com".to_string())]
    );
    assert_eq!(
        messages(&dashboard.take_notices()),
        vec!["No URLs to copy", "Copied 1 URLs"]
    );
}

// ─── Groups ───

#[tokio::test]
async fn test_create_group_selects_server_id() {
    let mut dashboard = setup().await;
    dashboard.create_group("Reading").await.unwrap();

    let groups = dashboard.cache().groups().unwrap();
    assert_eq!(groups.len(), 2);
    let created = groups.iter().find(|g| g.name == "Reading").unwrap();
    assert!(!is_temp_id(&created.id));
    assert_eq!(created.color, DEFAULT_GROUP_PALETTE[1]);
    assert_eq!(current(&dashboard), created.id);
}

#[tokio::test]
async fn test_failed_create_group_restores_selection() {
    let mut dashboard = setup().await;
    let previous = current(&dashboard);
    transport(&dashboard).fail("group.create");

    assert!(dashboard.create_group("Reading").await.is_err());
    assert_eq!(current(&dashboard), previous);
    assert_eq!(dashboard.cache().groups().unwrap().len(), 1);
    assert_eq!(messages(&dashboard.take_notices()), vec!["Failed to create group"]);
}

#[tokio::test]
async fn test_delete_current_group_falls_back_to_first() {
    let mut dashboard = setup().await;
    let first = current(&dashboard);
    dashboard.create_group("Temporary").await.unwrap();
    let doomed = current(&dashboard);
    seed(&dashboard, &doomed, "orphan", None);

    dashboard.delete_group(&doomed).await.unwrap();

    assert_eq!(current(&dashboard), first);
    assert!(dashboard.cache().group(&doomed).is_none());
    assert!(dashboard.cache().bookmarks(Some(&doomed)).is_none());
    assert_eq!(titles(&dashboard), vec!["orphan"]);
    assert_eq!(dashboard.cache().group(&first).unwrap().bookmark_count, 1);
}

#[tokio::test]
async fn test_failed_delete_group_restores_selection() {
    let mut dashboard = setup().await;
    dashboard.create_group("Keep").await.unwrap();
    let kept = current(&dashboard);
    transport(&dashboard).fail("group.delete");

    assert!(dashboard.delete_group(&kept).await.is_err());
    assert_eq!(current(&dashboard), kept);
    assert!(dashboard.cache().group(&kept).is_some());
    assert_eq!(messages(&dashboard.take_notices()), vec!["Failed to delete group"]);

    transport(&dashboard).heal();
    dashboard.delete_group(&kept).await.unwrap();
    assert!(dashboard.cache().group(&kept).is_none());
}

#[tokio::test]
async fn test_last_group_is_protected() {
    let mut dashboard = setup().await;
    let only = current(&dashboard);
    let err = dashboard.delete_group(&only).await.unwrap_err();
    assert_eq!(err, MutationError::Invalid(ValidationError::LastGroup(only)));
}

#[tokio::test]
async fn test_update_group_and_visibility() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    dashboard
        .update_group(&group, Some("Inbox"), Some("#CE2C31"))
        .await
        .unwrap();
    dashboard.set_group_visibility(&group, true).await.unwrap();

    let cached = dashboard.cache().group(&group).unwrap();
    assert_eq!(cached.name, "Inbox");
    assert_eq!(cached.color, "#CE2C31");
    assert!(cached.is_public);
}

// ─── Keyboard ───

#[tokio::test]
async fn test_keyboard_copies_and_opens_active_row() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    seed(&dashboard, &group, "Rust", Some("https://rust-lang.org"));
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&group)));
    dashboard.reconcile().await.unwrap();

    let mut window: EventTarget<KeyEvent> = EventTarget::new();
    let id = dashboard.attach_keyboard(&mut window);
    assert_eq!(dashboard.attach_keyboard(&mut window), id);
    assert_eq!(window.listener_count(), 1);

    window.dispatch(&KeyEvent::new(Key::ArrowDown));
    assert_eq!(dashboard.process_commands().await, 1);
    assert_eq!(dashboard.selection().highlighted(), Some(0));

    window.dispatch(&KeyEvent::new(Key::Char('c')).primary());
    window.dispatch(&KeyEvent::new(Key::Enter));
    dashboard.process_commands().await;
    assert_eq!(
        dashboard.take_effects(),
        vec![
            Effect::Copy("https://rust-lang.org".to_string()),
            Effect::OpenUrl("https://rust-lang.org".to_string()),
        ]
    );

    assert!(dashboard.detach_keyboard(&mut window));
    assert_eq!(window.listener_count(), 0);
}

#[tokio::test]
async fn test_rebinding_reaches_attached_listener() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    seed(&dashboard, &group, "note", None);
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&group)));
    dashboard.reconcile().await.unwrap();

    let mut window: EventTarget<KeyEvent> = EventTarget::new();
    dashboard.attach_keyboard(&mut window);
    dashboard.set_hover(Some(0));

    dashboard.rebind_shortcut("copy", "Mod+K").unwrap();
    window.dispatch(&KeyEvent::new(Key::Char('c')).primary());
    window.dispatch(&KeyEvent::new(Key::Char('k')).primary());
    dashboard.process_commands().await;

    assert_eq!(dashboard.take_effects(), vec![Effect::Copy("note".to_string())]);
    assert!(dashboard.shortcut_label(ShortcutAction::Copy).unwrap().ends_with("+K"));
}

#[tokio::test]
async fn test_keyboard_delete_removes_active_row() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    seed(&dashboard, &group, "first", None);
    seed(&dashboard, &group, "second", None);
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&group)));
    dashboard.reconcile().await.unwrap();

    let mut window: EventTarget<KeyEvent> = EventTarget::new();
    dashboard.attach_keyboard(&mut window);
    window.dispatch(&KeyEvent::new(Key::ArrowDown));
    window.dispatch(&KeyEvent::new(Key::ArrowDown));
    dashboard.process_commands().await;
    assert_eq!(dashboard.selection().highlighted(), Some(1));

    window.dispatch(&KeyEvent::new(Key::Backspace).primary());
    dashboard.process_commands().await;

    assert_eq!(titles(&dashboard), vec!["second"]);
    assert_eq!(dashboard.selection().highlighted(), Some(0));
}

#[tokio::test]
async fn test_select_all_in_selection_mode_uses_filtered_rows() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    seed(&dashboard, &group, "GitHub", Some("https://github.com"));
    seed(&dashboard, &group, "Twitter", Some("https://twitter.com"));
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&group)));
    dashboard.reconcile().await.unwrap();

    let start = Instant::now();
    dashboard.set_search_query("git", start);
    dashboard.tick(start + Duration::from_millis(500));

    let mut window: EventTarget<KeyEvent> = EventTarget::new();
    dashboard.attach_keyboard(&mut window);
    dashboard.enter_selection(None);
    window.dispatch(&KeyEvent::new(Key::Char('a')).primary());
    window.dispatch(&KeyEvent::new(Key::Escape));
    dashboard.process_commands().await;
    assert!(!dashboard.selection().in_selection_mode());

    dashboard.enter_selection(None);
    window.dispatch(&KeyEvent::new(Key::Char('a')).primary());
    dashboard.process_commands().await;
    assert_eq!(dashboard.selection().selected_count(), 1);
}

// ─── Search ───

#[tokio::test]
async fn test_search_applies_after_debounce() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    seed(&dashboard, &group, "Twitter", Some("https://twitter.com"));
    seed(&dashboard, &group, "gitlab.io", Some("https://gitlab.io"));
    seed(&dashboard, &group, "GitHub", Some("https://github.com"));
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&group)));
    dashboard.reconcile().await.unwrap();

    let start = Instant::now();
    dashboard.set_search_query("git", start);
    assert_eq!(dashboard.search_query(), "git");
    assert_eq!(dashboard.filtered().len(), 3);

    assert!(!dashboard.tick(start + Duration::from_millis(100)));
    assert!(dashboard.tick(start + Duration::from_millis(500)));
    let found: Vec<&str> = dashboard.filtered().iter().map(|b| b.title.as_str()).collect();
    assert_eq!(found, vec!["GitHub", "gitlab.io"]);
}

// ─── Revalidation ───

#[tokio::test]
async fn test_focus_refresh_respects_cooldown() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    seed(&dashboard, &group, "from elsewhere", None);

    let now = Instant::now();
    assert_eq!(dashboard.on_window_event(WindowEvent::Focus, now).await.unwrap(), 0);
    assert!(dashboard.bookmarks().is_empty());

    let later = now + Duration::from_secs(31);
    let refreshed = dashboard.on_window_event(WindowEvent::Focus, later).await.unwrap();
    assert_eq!(refreshed, 2);
    assert_eq!(titles(&dashboard), vec!["from elsewhere"]);

    let hidden = WindowEvent::VisibilityChange(VisibilityState::Hidden);
    assert_eq!(
        dashboard
            .on_window_event(hidden, later + Duration::from_secs(60))
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_failed_refresh_keeps_cached_data() {
    let mut dashboard = setup().await;
    let group = current(&dashboard);
    dashboard.add_bookmark("kept").await.unwrap();

    transport(&dashboard).fail("bookmark.list");
    dashboard.cache_mut().invalidate(&CacheKey::bookmarks(Some(&group)));
    assert!(dashboard.reconcile().await.is_err());
    assert_eq!(titles(&dashboard), vec!["kept"]);
}
