//! The dashboard view-model.
//!
//! Owns the client cache and every piece of UI state around it: the current
//! group, highlight/hover/rename/selection, the debounced search query, the
//! keyboard dispatcher and focus revalidation. User actions go through the
//! optimistic mutation engine; outcomes surface as [`Notice`]s and
//! side effects (open a URL, write the clipboard) as [`Effect`]s for the
//! embedding shell to carry out.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, warn};

use crate::backend::Backend;
use crate::cache::{CacheKey, CacheValue, KeyFamily, QueryCache};
use crate::events::{EventTarget, LatestRef, ListenerId};
use crate::managers::revalidation_manager::{FocusRevalidator, WindowEvent};
use crate::managers::selection_manager::SelectionManager;
use crate::managers::shortcut_manager::{
    attach_dispatcher, Command, KeyEvent, KeyboardView, ShortcutAction, ShortcutManager,
    ShortcutManagerTrait,
};
use crate::mutations::{self, pick_group_color, Mutation, PendingMutation};
use crate::services::input_parser::parse_input;
use crate::services::search::{filter_bookmarks, Debouncer};
use crate::types::bookmark::{Bookmark, Visibility};
use crate::types::errors::{MutationError, RemoteError, ShortcutError, ValidationError};
use crate::types::notification::Notice;
use crate::types::rpc::{IdInput, RemoteReply, RemoteRequest};
use crate::types::settings::DashboardSettings;
use crate::types::temp_id::is_temp_id;

/// Something the host environment has to do on the dashboard's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenUrl(String),
    Copy(String),
}

pub struct Dashboard<B> {
    backend: B,
    settings: DashboardSettings,
    cache: QueryCache,
    selection: SelectionManager,
    search: Debouncer<String>,
    query: String,
    revalidator: FocusRevalidator,
    shortcuts: LatestRef<ShortcutManager>,
    view: LatestRef<KeyboardView>,
    commands: LatestRef<VecDeque<Command>>,
    listener: Option<ListenerId>,
    notices: Vec<Notice>,
    effects: Vec<Effect>,
}

impl<B: Backend> Dashboard<B> {
    /// Fails only when the configured shortcut overrides are invalid.
    pub fn new(backend: B, settings: DashboardSettings) -> Result<Self, ShortcutError> {
        let shortcuts = ShortcutManager::with_overrides(&settings.shortcuts)?;
        Ok(Self {
            backend,
            cache: QueryCache::new(settings.cache.stale_time()),
            selection: SelectionManager::new(),
            search: Debouncer::new(String::new(), settings.search.debounce()),
            query: String::new(),
            revalidator: FocusRevalidator::from_settings(&settings.revalidation, Instant::now()),
            shortcuts: LatestRef::new(shortcuts),
            view: LatestRef::new(KeyboardView::default()),
            commands: LatestRef::new(VecDeque::new()),
            listener: None,
            notices: Vec::new(),
            effects: Vec::new(),
            settings,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut QueryCache {
        &mut self.cache
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn keyboard_view(&self) -> KeyboardView {
        self.view.get()
    }

    // --- Reads ---

    /// Fetches the group list, picks a current group and fetches its bookmarks.
    pub async fn load(&mut self) -> Result<(), RemoteError> {
        self.fetch(CacheKey::Groups).await?;
        self.ensure_group();
        if let Some(key) = self.current_key() {
            self.fetch(key).await?;
        }
        self.refresh_view();
        Ok(())
    }

    /// Fetches one key. Returns `false` when the response was superseded by
    /// a mutation and dropped.
    pub async fn fetch(&mut self, key: CacheKey) -> Result<bool, RemoteError> {
        let ticket = self.cache.begin_fetch(key.clone());
        let result = match &key {
            CacheKey::Groups => self.backend.list_groups().await.map(CacheValue::Groups),
            CacheKey::Bookmarks(group_id) => self
                .backend
                .list_bookmarks(group_id.as_deref())
                .await
                .map(CacheValue::Bookmarks),
        };
        match result {
            Ok(value) => Ok(self.cache.complete_fetch(ticket, value)),
            Err(err) => {
                self.cache.fail_fetch(ticket);
                Err(err)
            }
        }
    }

    /// Refetches every invalidated key plus the current group's list when it
    /// is missing or past its stale time. Returns how many keys were written.
    pub async fn reconcile(&mut self) -> Result<usize, RemoteError> {
        let mut keys = self.cache.stale_keys();
        if let Some(current) = self.current_key() {
            if !keys.contains(&current) && self.cache.needs_refetch(&current, Instant::now()) {
                keys.push(current);
            }
        }

        let mut written = 0;
        let mut first_error = None;
        for key in keys {
            match self.fetch(key).await {
                Ok(true) => written += 1,
                Ok(false) => {}
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        self.ensure_group();
        self.refresh_view();
        match first_error {
            Some(err) => Err(err),
            None => Ok(written),
        }
    }

    /// Bookmarks of the current group, unfiltered.
    pub fn bookmarks(&self) -> &[Bookmark] {
        self.selection
            .selected_group()
            .and_then(|id| self.cache.bookmarks(Some(id)))
            .unwrap_or_default()
    }

    /// Bookmarks of the current group matching the applied search query.
    pub fn filtered(&self) -> Vec<&Bookmark> {
        filter_bookmarks(self.bookmarks(), self.search.value())
    }

    /// The row keyboard and hover actions apply to.
    pub fn active_bookmark(&self) -> Option<&Bookmark> {
        let filtered = self.filtered();
        let index = self.selection.active_index(filtered.len())?;
        filtered.get(index).copied()
    }

    // --- Navigation ---

    pub async fn select_group(&mut self, group_id: &str) -> Result<(), RemoteError> {
        self.selection.select_group(group_id);
        self.refresh_view();
        match self.current_key() {
            Some(key) if self.cache.needs_refetch(&key, Instant::now()) => {
                self.fetch(key).await?;
                self.refresh_view();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Raw search text as typed. The filter applies it after the debounce delay.
    pub fn search_query(&self) -> &str {
        &self.query
    }

    pub fn set_search_query(&mut self, query: &str, now: Instant) {
        self.query = query.to_string();
        self.search.push(query.to_string(), now);
        self.selection.clear_highlight();
        self.refresh_view();
    }

    /// Advances the search debounce. Returns `true` when the filter changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.search.poll(now) {
            return false;
        }
        self.selection.clear_highlight();
        self.refresh_view();
        true
    }

    pub fn set_hover(&mut self, index: Option<usize>) {
        self.selection.set_hover(index);
        self.refresh_view();
    }

    pub fn start_rename(&mut self, id: &str) {
        self.selection.start_rename(id);
        self.refresh_view();
    }

    pub fn cancel_rename(&mut self) {
        self.selection.finish_rename();
        self.refresh_view();
    }

    pub fn enter_selection(&mut self, seed: Option<&str>) {
        self.selection.enter_selection(seed.map(str::to_string));
        self.refresh_view();
    }

    pub fn exit_selection(&mut self) {
        self.selection.exit_selection();
        self.refresh_view();
    }

    pub fn toggle_selection(&mut self, id: &str) {
        self.selection.toggle(id);
        self.refresh_view();
    }

    // --- Bookmark actions ---

    /// Parses free text into a link, color or text bookmark in the current group.
    pub async fn add_bookmark(&mut self, input: &str) -> Result<RemoteReply, MutationError> {
        let group_id = self.current_group()?;
        let draft = parse_input(input)?;
        self.selection.clear_highlight();
        self.run(Mutation::CreateBookmark { group_id, draft }).await
    }

    pub async fn rename_bookmark(&mut self, id: &str, title: &str) -> Result<RemoteReply, MutationError> {
        self.selection.finish_rename();
        let group_id = self.group_of(id)?;
        self.run(Mutation::RenameBookmark {
            id: id.to_string(),
            group_id,
            title: title.to_string(),
        })
        .await
    }

    pub async fn move_bookmark(&mut self, id: &str, target: &str) -> Result<RemoteReply, MutationError> {
        let source = self.group_of(id)?;
        self.run(Mutation::MoveBookmark {
            id: id.to_string(),
            source,
            target: target.to_string(),
        })
        .await
    }

    pub async fn delete_bookmark(&mut self, id: &str) -> Result<RemoteReply, MutationError> {
        let group_id = self.group_of(id)?;
        self.run(Mutation::DeleteBookmarks {
            ids: vec![id.to_string()],
            group_id,
        })
        .await
    }

    /// Flips one bookmark between effectively public and effectively private.
    pub async fn toggle_bookmark_visibility(&mut self, id: &str) -> Result<RemoteReply, MutationError> {
        let group_id = self.group_of(id)?;
        let current = self
            .cache
            .bookmarks(Some(&group_id))
            .and_then(|list| list.iter().find(|b| b.id == id))
            .map(|b| b.visibility)
            .ok_or(ValidationError::EmptySelection)?;
        let group_is_public = self.cache.group(&group_id).is_some_and(|g| g.is_public);
        self.run(Mutation::SetBookmarkVisibility {
            ids: vec![id.to_string()],
            group_id,
            visibility: current.toggled(group_is_public),
        })
        .await
    }

    /// Re-derives title and favicon on the server. Not optimistic.
    pub async fn refetch_bookmark(&mut self, id: &str) -> Result<Bookmark, RemoteError> {
        let request = RemoteRequest::RefetchBookmark(IdInput { id: id.to_string() });
        match self.backend.execute(&request).await {
            Ok(reply) => {
                self.cache.invalidate_family(KeyFamily::Bookmarks);
                self.notices.push(Notice::success("Metadata refreshed"));
                self.after_success().await;
                match reply {
                    RemoteReply::Bookmark(bookmark) => Ok(bookmark),
                    other => Err(RemoteError::Decode(format!("unexpected reply: {:?}", other))),
                }
            }
            Err(err) => {
                warn!(error = %err, "metadata refresh failed");
                self.notices.push(Notice::error("Failed to refresh metadata"));
                Err(err)
            }
        }
    }

    // --- Bulk actions ---

    pub async fn delete_selected(&mut self) -> Result<RemoteReply, MutationError> {
        let group_id = self.current_group()?;
        let ids = self.selection.selected_in(self.bookmarks());
        let count = ids.len();
        self.selection.exit_selection();
        let result = self.run(Mutation::DeleteBookmarks { ids, group_id }).await;
        if result.is_ok() {
            self.notices.push(Notice::success(format!("Deleted {} bookmarks", count)));
        }
        result
    }

    pub async fn move_selected(&mut self, target: &str) -> Result<RemoteReply, MutationError> {
        let source = self.current_group()?;
        let ids = self.selection.selected_in(self.bookmarks());
        let count = ids.len();
        self.selection.exit_selection();
        let result = self
            .run(Mutation::MoveBookmarks {
                ids,
                source,
                target: target.to_string(),
            })
            .await;
        if result.is_ok() {
            self.notices.push(Notice::success(format!("Moved {} bookmarks", count)));
        }
        result
    }

    pub async fn set_selected_visibility(
        &mut self,
        visibility: Visibility,
    ) -> Result<RemoteReply, MutationError> {
        let group_id = self.current_group()?;
        let ids = self.selection.selected_in(self.bookmarks());
        self.selection.exit_selection();
        self.run(Mutation::SetBookmarkVisibility {
            ids,
            group_id,
            visibility,
        })
        .await
    }

    /// Puts the URLs of the selected bookmarks on the clipboard, one per line,
    /// in list order.
    pub fn copy_selected_urls(&mut self) -> Option<String> {
        let urls: Vec<&str> = self
            .bookmarks()
            .iter()
            .filter(|b| self.selection.is_selected(&b.id))
            .filter_map(|b| b.url.as_deref())
            .collect();
        if urls.is_empty() {
            self.notices.push(Notice::error("No URLs to copy"));
            return None;
        }
        let count = urls.len();
        let text = urls.join("\n");
        self.effects.push(Effect::Copy(text.clone()));
        self.notices.push(Notice::success(format!("Copied {} URLs", count)));
        Some(text)
    }

    // --- Group actions ---

    /// Creates a group with the next palette color and makes it current.
    pub async fn create_group(&mut self, name: &str) -> Result<RemoteReply, MutationError> {
        let color = pick_group_color(
            &self.settings.groups.palette,
            self.cache.groups().unwrap_or_default(),
        );
        let previous = self.selection.selected_group().map(str::to_string);
        let pending = mutations::begin(
            &mut self.cache,
            Mutation::CreateGroup {
                name: name.to_string(),
                color,
            },
        )?;
        let temp_id = pending.temp_id().map(str::to_string);
        if let Some(temp_id) = &temp_id {
            self.selection.select_group(temp_id.as_str());
        }

        let result = self.execute(pending).await;
        match &result {
            Ok(RemoteReply::Group(group)) => {
                if self.selection.selected_group() == temp_id.as_deref() {
                    self.selection.select_group(group.id.as_str());
                }
                self.after_success().await;
            }
            Ok(_) => self.after_success().await,
            Err(_) => {
                self.selection.restore_group(previous);
                self.refresh_view();
            }
        }
        result
    }

    pub async fn update_group(
        &mut self,
        id: &str,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<RemoteReply, MutationError> {
        self.run(Mutation::UpdateGroup {
            id: id.to_string(),
            name: name.map(str::to_string),
            color: color.map(str::to_string),
        })
        .await
    }

    /// Deletes a group; its bookmarks end up in the first remaining group.
    pub async fn delete_group(&mut self, id: &str) -> Result<RemoteReply, MutationError> {
        let previous = self.selection.selected_group().map(str::to_string);
        let pending = mutations::begin(&mut self.cache, Mutation::DeleteGroup { id: id.to_string() })?;
        if previous.as_deref() == Some(id) {
            let first = self
                .cache
                .groups()
                .and_then(|groups| groups.first())
                .map(|g| g.id.clone());
            match first {
                Some(first) => self.selection.select_group(first),
                None => self.selection.restore_group(None),
            }
        }

        let result = self.execute(pending).await;
        match &result {
            Ok(_) => self.after_success().await,
            Err(_) => {
                self.selection.restore_group(previous);
                self.refresh_view();
            }
        }
        result
    }

    pub async fn set_group_visibility(&mut self, id: &str, is_public: bool) -> Result<RemoteReply, MutationError> {
        self.run(Mutation::SetGroupVisibility {
            id: id.to_string(),
            is_public,
        })
        .await
    }

    // --- Keyboard ---

    /// Registers the keyboard dispatcher on `target`. Calling it again while
    /// attached returns the existing listener.
    pub fn attach_keyboard(&mut self, target: &mut EventTarget<KeyEvent>) -> ListenerId {
        if let Some(id) = self.listener {
            return id;
        }
        let id = attach_dispatcher(
            target,
            self.shortcuts.clone(),
            self.view.clone(),
            self.commands.clone(),
        );
        self.listener = Some(id);
        id
    }

    pub fn detach_keyboard(&mut self, target: &mut EventTarget<KeyEvent>) -> bool {
        match self.listener.take() {
            Some(id) => target.remove_listener(id),
            None => false,
        }
    }

    /// Rebinds an action; the attached listener picks it up on the next event.
    pub fn rebind_shortcut(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError> {
        self.shortcuts.with_mut(|shortcuts| shortcuts.register_shortcut(action, keys))
    }

    pub fn shortcut_label(&self, action: ShortcutAction) -> Option<String> {
        self.shortcuts.with(|shortcuts| shortcuts.display(action))
    }

    /// Runs every command the dispatcher queued. Returns how many ran.
    pub async fn process_commands(&mut self) -> usize {
        let mut handled = 0;
        while let Some(command) = self.commands.with_mut(VecDeque::pop_front) {
            self.apply(command).await;
            handled += 1;
        }
        handled
    }

    async fn apply(&mut self, command: Command) {
        debug!(?command, "keyboard command");
        let len = self.filtered().len();
        match command {
            Command::HighlightNext => self.selection.highlight_next(len),
            Command::HighlightPrevious => self.selection.highlight_previous(len),
            Command::Open(url) => self.effects.push(Effect::OpenUrl(url)),
            Command::CopyToClipboard(text) => self.effects.push(Effect::Copy(text)),
            Command::StartRename(id) => self.selection.start_rename(id),
            Command::Delete(id) => {
                if let Err(err) = self.delete_bookmark(&id).await {
                    debug!(error = %err, "keyboard delete did not apply");
                }
            }
            Command::ToggleSelection(id) => self.selection.toggle(&id),
            Command::ExitSelection => self.selection.exit_selection(),
            Command::SelectAll => {
                let ids: Vec<String> = self.filtered().iter().map(|b| b.id.clone()).collect();
                self.selection.select_all(ids.iter().map(String::as_str));
            }
        }
        self.refresh_view();
    }

    // --- Revalidation ---

    /// Handles a focus or visibility event. Returns how many keys were refetched.
    pub async fn on_window_event(&mut self, event: WindowEvent, now: Instant) -> Result<usize, RemoteError> {
        if !self.revalidator.should_refresh(event, now) {
            return Ok(0);
        }
        self.revalidator.revalidate(&mut self.cache);
        self.reconcile().await
    }

    // --- Outputs ---

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // --- Internals ---

    async fn run(&mut self, mutation: Mutation) -> Result<RemoteReply, MutationError> {
        let pending = mutations::begin(&mut self.cache, mutation)?;
        let result = self.execute(pending).await;
        if result.is_ok() {
            self.after_success().await;
        }
        result
    }

    /// Sends the request (if any) and settles. Failures become a notice.
    async fn execute(&mut self, pending: PendingMutation) -> Result<RemoteReply, MutationError> {
        self.refresh_view();
        let outcome = match pending.request() {
            Some(request) => self.backend.execute(request).await,
            None => Ok(RemoteReply::Skipped),
        };
        let kind = pending.kind();
        let result = pending.settle(&mut self.cache, outcome);
        if result.is_err() {
            self.notices.push(Notice::error(kind.failure_message()));
        }
        self.refresh_view();
        result.map_err(MutationError::RolledBack)
    }

    async fn after_success(&mut self) {
        if let Err(err) = self.reconcile().await {
            warn!(error = %err, "refetch after mutation failed");
        }
    }

    fn current_group(&self) -> Result<String, ValidationError> {
        self.selection
            .selected_group()
            .map(str::to_string)
            .ok_or(ValidationError::NoGroupSelected)
    }

    fn current_key(&self) -> Option<CacheKey> {
        self.selection
            .selected_group()
            .filter(|id| !is_temp_id(id))
            .map(|id| CacheKey::bookmarks(Some(id)))
    }

    /// Group owning `id` according to the cache, else the current group.
    fn group_of(&self, id: &str) -> Result<String, ValidationError> {
        let cached = self.cache.keys().find_map(|key| match key {
            CacheKey::Bookmarks(Some(group_id)) => self
                .cache
                .bookmarks(Some(group_id))
                .filter(|list| list.iter().any(|b| b.id == id))
                .map(|_| group_id.clone()),
            _ => None,
        });
        match cached {
            Some(group_id) => Ok(group_id),
            None => self.current_group(),
        }
    }

    fn ensure_group(&mut self) {
        if let Some(groups) = self.cache.groups() {
            self.selection.ensure_group(
                groups.iter().map(|g| g.id.as_str()),
                groups.first().map(|g| g.id.as_str()),
            );
        }
    }

    /// Clamps indexes to the filtered list and publishes the keyboard view.
    fn refresh_view(&mut self) {
        let bookmarks: Vec<Bookmark> = self.filtered().into_iter().cloned().collect();
        self.selection.clamp(bookmarks.len());
        self.view.set(KeyboardView {
            bookmarks,
            highlighted: self.selection.highlighted(),
            hovered: self.selection.hovered(),
            renaming: self.selection.renaming().is_some(),
            selection_mode: self.selection.in_selection_mode(),
        });
    }
}
