//! Predictions for bookmark mutations.

use std::collections::HashSet;

use super::{adjust_count, now_secs, prepare, MutationKind, PendingMutation};
use crate::cache::{CacheKey, QueryCache};
use crate::services::input_parser::BookmarkDraft;
use crate::types::bookmark::{Bookmark, Visibility};
use crate::types::errors::ValidationError;
use crate::types::rpc::{
    BookmarkVisibilityInput, BulkIdsInput, BulkMoveInput, BulkVisibilityInput,
    CreateBookmarkInput, RemoteRequest, UpdateBookmarkInput,
};
use crate::types::temp_id::{is_temp_id, new_temp_id, server_ids};

fn require_group(group_id: &str) -> Result<(), ValidationError> {
    if group_id.is_empty() {
        return Err(ValidationError::NoGroupSelected);
    }
    if is_temp_id(group_id) {
        return Err(ValidationError::GroupNotSynced(group_id.to_string()));
    }
    Ok(())
}

pub(super) fn create(
    cache: &mut QueryCache,
    group_id: String,
    draft: BookmarkDraft,
) -> Result<PendingMutation, ValidationError> {
    let title = draft.title.trim().to_string();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    require_group(&group_id)?;

    let list_key = CacheKey::bookmarks(Some(&group_id));
    let snapshots = prepare(cache, &[list_key, CacheKey::Groups]);

    let placeholder = Bookmark {
        id: new_temp_id(),
        title: title.clone(),
        url: draft.url.clone(),
        favicon: None,
        kind: draft.kind,
        color: draft.color.clone(),
        group_id: group_id.clone(),
        visibility: Visibility::Inherit,
        created_at: now_secs(),
    };
    let temp_id = placeholder.id.clone();
    cache.update_bookmarks(Some(&group_id), |list| list.insert(0, placeholder));
    adjust_count(cache, &group_id, 1);

    let request = RemoteRequest::CreateBookmark(CreateBookmarkInput {
        title,
        url: draft.url,
        kind: draft.kind,
        color: draft.color,
        group_id,
    });
    Ok(PendingMutation::new(MutationKind::CreateBookmark, snapshots)
        .with_request(Some(request))
        .with_temp_id(temp_id)
        .reconciling(CacheKey::bookmarks(None)))
}

pub(super) fn rename(
    cache: &mut QueryCache,
    id: String,
    group_id: String,
    title: String,
) -> Result<PendingMutation, ValidationError> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    let snapshots = prepare(cache, &[CacheKey::bookmarks(Some(&group_id))]);
    cache.update_bookmarks(Some(&group_id), |list| {
        if let Some(bookmark) = list.iter_mut().find(|b| b.id == id) {
            bookmark.title = title.clone();
        }
    });

    let request = (!is_temp_id(&id)).then(|| {
        RemoteRequest::UpdateBookmark(UpdateBookmarkInput {
            id,
            title: Some(title),
            ..Default::default()
        })
    });
    Ok(PendingMutation::new(MutationKind::RenameBookmark, snapshots)
        .with_request(request)
        .reconciling(CacheKey::bookmarks(None)))
}

/// Removes `ids` from `source` and prepends them to `target` with inherited
/// visibility. Returns how many rows left the source list, or `None` when
/// the source list is not cached.
fn relocate(cache: &mut QueryCache, ids: &[String], source: &str, target: &str) -> Option<usize> {
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut moved: Vec<Bookmark> = Vec::new();
    let source_cached = cache.update_bookmarks(Some(source), |list| {
        let (leaving, staying): (Vec<Bookmark>, Vec<Bookmark>) = list
            .drain(..)
            .partition(|b| wanted.contains(b.id.as_str()));
        *list = staying;
        moved = leaving;
    });
    if !source_cached {
        return None;
    }

    let count = moved.len();
    for bookmark in moved.iter_mut() {
        bookmark.group_id = target.to_string();
        bookmark.visibility = Visibility::Inherit;
    }
    cache.update_bookmarks(Some(target), |list| {
        list.retain(|b| !wanted.contains(b.id.as_str()));
        let rest = std::mem::replace(list, moved);
        list.extend(rest);
    });
    Some(count)
}

fn check_move(source: &str, target: &str) -> Result<(), ValidationError> {
    if source == target {
        return Err(ValidationError::SameGroup(target.to_string()));
    }
    require_group(target)
}

pub(super) fn move_one(
    cache: &mut QueryCache,
    id: String,
    source: String,
    target: String,
) -> Result<PendingMutation, ValidationError> {
    check_move(&source, &target)?;

    let snapshots = prepare(
        cache,
        &[
            CacheKey::bookmarks(Some(&source)),
            CacheKey::bookmarks(Some(&target)),
            CacheKey::Groups,
        ],
    );
    let ids = [id];
    let delta = relocate(cache, &ids, &source, &target).unwrap_or(1) as i64;
    adjust_count(cache, &source, -delta);
    adjust_count(cache, &target, delta);

    let [id] = ids;
    let request = (!is_temp_id(&id)).then(|| {
        RemoteRequest::UpdateBookmark(UpdateBookmarkInput {
            id,
            group_id: Some(target),
            ..Default::default()
        })
    });
    Ok(PendingMutation::new(MutationKind::MoveBookmark, snapshots)
        .with_request(request)
        .reconciling(CacheKey::bookmarks(None)))
}

pub(super) fn delete(
    cache: &mut QueryCache,
    ids: Vec<String>,
    group_id: String,
) -> Result<PendingMutation, ValidationError> {
    if ids.is_empty() {
        return Err(ValidationError::EmptySelection);
    }

    let snapshots = prepare(cache, &[CacheKey::bookmarks(Some(&group_id)), CacheKey::Groups]);
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut removed = ids.len();
    cache.update_bookmarks(Some(&group_id), |list| {
        let before = list.len();
        list.retain(|b| !wanted.contains(b.id.as_str()));
        removed = before - list.len();
    });
    adjust_count(cache, &group_id, -(removed as i64));

    let remote = server_ids(&ids);
    let request = (!remote.is_empty())
        .then(|| RemoteRequest::BulkDeleteBookmarks(BulkIdsInput { ids: remote }));
    Ok(PendingMutation::new(MutationKind::DeleteBookmarks, snapshots)
        .with_request(request)
        .with_affected(ids.len())
        .reconciling(CacheKey::bookmarks(None)))
}

pub(super) fn move_many(
    cache: &mut QueryCache,
    ids: Vec<String>,
    source: String,
    target: String,
) -> Result<PendingMutation, ValidationError> {
    if ids.is_empty() {
        return Err(ValidationError::EmptySelection);
    }
    check_move(&source, &target)?;

    let snapshots = prepare(
        cache,
        &[
            CacheKey::bookmarks(Some(&source)),
            CacheKey::bookmarks(Some(&target)),
            CacheKey::Groups,
        ],
    );
    let delta = relocate(cache, &ids, &source, &target).unwrap_or(ids.len()) as i64;
    adjust_count(cache, &source, -delta);
    adjust_count(cache, &target, delta);

    let remote = server_ids(&ids);
    let request = (!remote.is_empty()).then(|| {
        RemoteRequest::BulkMoveBookmarks(BulkMoveInput {
            ids: remote,
            target_group_id: target,
        })
    });
    Ok(PendingMutation::new(MutationKind::MoveBookmarks, snapshots)
        .with_request(request)
        .with_affected(ids.len())
        .reconciling(CacheKey::bookmarks(None)))
}

pub(super) fn set_visibility(
    cache: &mut QueryCache,
    ids: Vec<String>,
    group_id: String,
    visibility: Visibility,
) -> Result<PendingMutation, ValidationError> {
    if ids.is_empty() {
        return Err(ValidationError::EmptySelection);
    }

    let snapshots = prepare(cache, &[CacheKey::bookmarks(Some(&group_id))]);
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    cache.update_bookmarks(Some(&group_id), |list| {
        for bookmark in list.iter_mut().filter(|b| wanted.contains(b.id.as_str())) {
            bookmark.visibility = visibility;
        }
    });

    let mut remote = server_ids(&ids);
    let request = match remote.len() {
        0 => None,
        1 => remote.pop().map(|id| {
            RemoteRequest::SetBookmarkVisibility(BookmarkVisibilityInput { id, visibility })
        }),
        _ => Some(RemoteRequest::BulkSetBookmarkVisibility(BulkVisibilityInput {
            ids: remote,
            visibility,
        })),
    };
    Ok(PendingMutation::new(MutationKind::SetBookmarkVisibility, snapshots)
        .with_request(request)
        .with_affected(ids.len())
        .reconciling(CacheKey::bookmarks(None)))
}
