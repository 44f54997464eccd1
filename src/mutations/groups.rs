//! Predictions for group mutations, plus palette and fallback helpers.

use super::{prepare, MutationKind, PendingMutation};
use crate::cache::{CacheKey, QueryCache};
use crate::types::errors::ValidationError;
use crate::types::group::{Group, DEFAULT_GROUP_PALETTE};
use crate::types::rpc::{
    CreateGroupInput, GroupVisibilityInput, IdInput, RemoteRequest, UpdateGroupInput,
};
use crate::types::temp_id::{is_temp_id, new_temp_id};

/// Color for a new group: the first palette entry no group uses yet, else
/// cycle through the palette by group count.
pub fn pick_group_color(palette: &[String], groups: &[Group]) -> String {
    if palette.is_empty() {
        return DEFAULT_GROUP_PALETTE[0].to_string();
    }
    palette
        .iter()
        .find(|color| !groups.iter().any(|g| &g.color == *color))
        .cloned()
        .unwrap_or_else(|| palette[groups.len() % palette.len()].clone())
}

/// The group that inherits the bookmarks of `deleted`: the first remaining one.
pub fn fallback_group<'a>(groups: &'a [Group], deleted: &str) -> Option<&'a Group> {
    groups.iter().find(|g| g.id != deleted)
}

pub(super) fn create(
    cache: &mut QueryCache,
    name: String,
    color: String,
) -> Result<PendingMutation, ValidationError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let snapshots = prepare(cache, &[CacheKey::Groups]);
    let placeholder = Group {
        id: new_temp_id(),
        name: name.clone(),
        color: color.clone(),
        is_public: false,
        bookmark_count: 0,
    };
    let temp_id = placeholder.id.clone();
    cache.update_groups(|groups| groups.push(placeholder));

    let request = RemoteRequest::CreateGroup(CreateGroupInput { name, color });
    Ok(PendingMutation::new(MutationKind::CreateGroup, snapshots)
        .with_request(Some(request))
        .with_temp_id(temp_id))
}

pub(super) fn update(
    cache: &mut QueryCache,
    id: String,
    name: Option<String>,
    color: Option<String>,
) -> Result<PendingMutation, ValidationError> {
    let name = name.map(|n| n.trim().to_string());
    if name.as_deref().is_some_and(str::is_empty) {
        return Err(ValidationError::EmptyName);
    }
    if name.is_none() && color.is_none() {
        return Err(ValidationError::NothingToUpdate);
    }

    let snapshots = prepare(cache, &[CacheKey::Groups]);
    cache.update_groups(|groups| {
        if let Some(group) = groups.iter_mut().find(|g| g.id == id) {
            if let Some(name) = &name {
                group.name = name.clone();
            }
            if let Some(color) = &color {
                group.color = color.clone();
            }
        }
    });

    let request = (!is_temp_id(&id))
        .then(|| RemoteRequest::UpdateGroup(UpdateGroupInput { id, name, color }));
    Ok(PendingMutation::new(MutationKind::UpdateGroup, snapshots).with_request(request))
}

pub(super) fn delete(cache: &mut QueryCache, id: String) -> Result<PendingMutation, ValidationError> {
    let mut fallback = None;
    if let Some(groups) = cache.groups() {
        if groups.len() == 1 && groups[0].id == id {
            return Err(ValidationError::LastGroup(id));
        }
        fallback = fallback_group(groups, &id).map(|g| g.id.clone());
    }

    let list_key = CacheKey::bookmarks(Some(&id));
    let snapshots = prepare(cache, &[CacheKey::Groups, list_key.clone()]);
    cache.update_groups(|groups| groups.retain(|g| g.id != id));

    let mut pending = PendingMutation::new(MutationKind::DeleteGroup, snapshots)
        .evicting(list_key)
        .reconciling(CacheKey::bookmarks(None));
    if let Some(fallback) = fallback {
        pending = pending.reconciling(CacheKey::bookmarks(Some(&fallback)));
    }
    let request = (!is_temp_id(&id)).then(|| RemoteRequest::DeleteGroup(IdInput { id }));
    Ok(pending.with_request(request))
}

pub(super) fn set_visibility(
    cache: &mut QueryCache,
    id: String,
    is_public: bool,
) -> Result<PendingMutation, ValidationError> {
    let snapshots = prepare(cache, &[CacheKey::Groups]);
    cache.update_groups(|groups| {
        if let Some(group) = groups.iter_mut().find(|g| g.id == id) {
            group.is_public = is_public;
        }
    });

    let request = (!is_temp_id(&id))
        .then(|| RemoteRequest::SetGroupVisibility(GroupVisibilityInput { id, is_public }));
    Ok(PendingMutation::new(MutationKind::SetGroupVisibility, snapshots).with_request(request))
}
