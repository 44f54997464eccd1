//! Optimistic mutation engine.
//!
//! A mutation runs in two phases around its remote call:
//!
//! 1. [`begin`] validates the input, cancels in-flight fetches for every key
//!    the mutation touches, snapshots those keys and writes the predicted
//!    state. The returned [`PendingMutation`] carries the request to send.
//! 2. [`PendingMutation::settle`] receives the remote outcome. Success
//!    invalidates every touched key so the next read reconciles with the
//!    server; failure restores every snapshot verbatim.
//!
//! The cache is passed in explicitly. Nothing here awaits, so the prediction
//! is always visible before the request leaves.

pub mod bookmarks;
pub mod groups;

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::cache::{CacheKey, QueryCache, Snapshot};
use crate::services::input_parser::BookmarkDraft;
use crate::types::bookmark::Visibility;
use crate::types::errors::{RemoteError, ValidationError};
use crate::types::rpc::{RemoteReply, RemoteRequest};

pub use groups::{fallback_group, pick_group_color};

/// A user intent that changes server state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateBookmark {
        group_id: String,
        draft: BookmarkDraft,
    },
    RenameBookmark {
        id: String,
        group_id: String,
        title: String,
    },
    MoveBookmark {
        id: String,
        source: String,
        target: String,
    },
    /// Single delete is a bulk delete of one id.
    DeleteBookmarks {
        ids: Vec<String>,
        group_id: String,
    },
    MoveBookmarks {
        ids: Vec<String>,
        source: String,
        target: String,
    },
    SetBookmarkVisibility {
        ids: Vec<String>,
        group_id: String,
        visibility: Visibility,
    },
    CreateGroup {
        name: String,
        color: String,
    },
    UpdateGroup {
        id: String,
        name: Option<String>,
        color: Option<String>,
    },
    DeleteGroup {
        id: String,
    },
    SetGroupVisibility {
        id: String,
        is_public: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    CreateBookmark,
    RenameBookmark,
    MoveBookmark,
    DeleteBookmarks,
    MoveBookmarks,
    SetBookmarkVisibility,
    CreateGroup,
    UpdateGroup,
    DeleteGroup,
    SetGroupVisibility,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::CreateBookmark => "create_bookmark",
            MutationKind::RenameBookmark => "rename_bookmark",
            MutationKind::MoveBookmark => "move_bookmark",
            MutationKind::DeleteBookmarks => "delete_bookmarks",
            MutationKind::MoveBookmarks => "move_bookmarks",
            MutationKind::SetBookmarkVisibility => "set_bookmark_visibility",
            MutationKind::CreateGroup => "create_group",
            MutationKind::UpdateGroup => "update_group",
            MutationKind::DeleteGroup => "delete_group",
            MutationKind::SetGroupVisibility => "set_group_visibility",
        }
    }

    /// Notification shown when the remote call fails and the cache is rolled back.
    pub fn failure_message(&self) -> &'static str {
        match self {
            MutationKind::CreateBookmark => "Failed to create bookmark",
            MutationKind::RenameBookmark | MutationKind::MoveBookmark => {
                "Failed to update bookmark"
            }
            MutationKind::DeleteBookmarks => "Failed to delete bookmarks",
            MutationKind::MoveBookmarks => "Failed to move bookmarks",
            MutationKind::SetBookmarkVisibility | MutationKind::SetGroupVisibility => {
                "Failed to update visibility"
            }
            MutationKind::CreateGroup => "Failed to create group",
            MutationKind::UpdateGroup => "Failed to update group",
            MutationKind::DeleteGroup => "Failed to delete group",
        }
    }
}

/// Runs the synchronous half of a mutation against `cache`.
///
/// On `Err` the cache has not been touched.
pub fn begin(cache: &mut QueryCache, mutation: Mutation) -> Result<PendingMutation, ValidationError> {
    let pending = match mutation {
        Mutation::CreateBookmark { group_id, draft } => bookmarks::create(cache, group_id, draft),
        Mutation::RenameBookmark { id, group_id, title } => {
            bookmarks::rename(cache, id, group_id, title)
        }
        Mutation::MoveBookmark { id, source, target } => {
            bookmarks::move_one(cache, id, source, target)
        }
        Mutation::DeleteBookmarks { ids, group_id } => bookmarks::delete(cache, ids, group_id),
        Mutation::MoveBookmarks { ids, source, target } => {
            bookmarks::move_many(cache, ids, source, target)
        }
        Mutation::SetBookmarkVisibility {
            ids,
            group_id,
            visibility,
        } => bookmarks::set_visibility(cache, ids, group_id, visibility),
        Mutation::CreateGroup { name, color } => groups::create(cache, name, color),
        Mutation::UpdateGroup { id, name, color } => groups::update(cache, id, name, color),
        Mutation::DeleteGroup { id } => groups::delete(cache, id),
        Mutation::SetGroupVisibility { id, is_public } => {
            groups::set_visibility(cache, id, is_public)
        }
    }?;
    debug!(
        mutation = pending.kind.as_str(),
        keys = pending.snapshots.len(),
        local = pending.request.is_none(),
        "optimistic write applied"
    );
    Ok(pending)
}

/// A mutation whose prediction is in the cache and whose outcome is not known yet.
#[derive(Debug)]
#[must_use = "a pending mutation must be settled or its prediction is never reconciled"]
pub struct PendingMutation {
    kind: MutationKind,
    snapshots: Vec<Snapshot>,
    request: Option<RemoteRequest>,
    reconcile: Vec<CacheKey>,
    evict: Vec<CacheKey>,
    temp_id: Option<String>,
    affected: usize,
}

impl PendingMutation {
    fn new(kind: MutationKind, snapshots: Vec<Snapshot>) -> Self {
        Self {
            kind,
            snapshots,
            request: None,
            reconcile: Vec::new(),
            evict: Vec::new(),
            temp_id: None,
            affected: 1,
        }
    }

    fn with_request(mut self, request: Option<RemoteRequest>) -> Self {
        self.request = request;
        self
    }

    /// Extra key to invalidate on success only.
    fn reconciling(mut self, key: CacheKey) -> Self {
        self.reconcile.push(key);
        self
    }

    /// Key to drop from the cache on success only.
    fn evicting(mut self, key: CacheKey) -> Self {
        self.evict.push(key);
        self
    }

    fn with_temp_id(mut self, id: String) -> Self {
        self.temp_id = Some(id);
        self
    }

    fn with_affected(mut self, affected: usize) -> Self {
        self.affected = affected;
        self
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    /// The remote call to make. `None` when every id involved is still a
    /// placeholder, in which case the mutation settles locally.
    pub fn request(&self) -> Option<&RemoteRequest> {
        self.request.as_ref()
    }

    /// Placeholder id of the row this mutation created, if any.
    pub fn temp_id(&self) -> Option<&str> {
        self.temp_id.as_deref()
    }

    /// Number of entities the user acted on.
    pub fn affected(&self) -> usize {
        self.affected
    }

    pub fn touched_keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.snapshots.iter().map(Snapshot::key)
    }

    /// Commits or rolls back the prediction and hands the outcome back.
    pub fn settle(
        self,
        cache: &mut QueryCache,
        outcome: Result<RemoteReply, RemoteError>,
    ) -> Result<RemoteReply, RemoteError> {
        match outcome {
            Ok(RemoteReply::Skipped) => {
                debug!(mutation = self.kind.as_str(), "settled locally");
                Ok(RemoteReply::Skipped)
            }
            Ok(reply) => {
                for snapshot in &self.snapshots {
                    cache.invalidate(snapshot.key());
                }
                for key in &self.reconcile {
                    cache.invalidate(key);
                }
                for key in &self.evict {
                    cache.remove(key);
                }
                debug!(mutation = self.kind.as_str(), "committed");
                Ok(reply)
            }
            Err(err) => {
                warn!(
                    mutation = self.kind.as_str(),
                    error = %err,
                    "remote call failed, rolling back"
                );
                for snapshot in self.snapshots.into_iter().rev() {
                    cache.restore(snapshot);
                }
                Err(err)
            }
        }
    }
}

/// Cancels and snapshots each distinct key, in order.
fn prepare(cache: &mut QueryCache, keys: &[CacheKey]) -> Vec<Snapshot> {
    let mut snapshots: Vec<Snapshot> = Vec::with_capacity(keys.len());
    for key in keys {
        if snapshots.iter().any(|s| s.key() == key) {
            continue;
        }
        cache.cancel(key);
        snapshots.push(cache.snapshot(key));
    }
    snapshots
}

/// Shifts a cached group's `bookmark_count`, saturating at zero.
fn adjust_count(cache: &mut QueryCache, group_id: &str, delta: i64) {
    cache.update_groups(|groups| {
        if let Some(group) = groups.iter_mut().find(|g| g.id == group_id) {
            let next = i64::from(group.bookmark_count) + delta;
            group.bookmark_count = u32::try_from(next.max(0)).unwrap_or(u32::MAX);
        }
    });
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
