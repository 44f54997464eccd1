//! Method dispatch for the reference RPC server.
//!
//! `handle_method` maps a method name and its JSON params onto the group
//! and bookmark managers. It is shared by the stdin/stdout binary and the
//! in-process transport, so both speak exactly the same contract.

use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::app::App;
use crate::managers::bookmark_manager::BookmarkManagerTrait;
use crate::managers::group_manager::GroupManagerTrait;
use crate::types::rpc::{
    Ack, BookmarkVisibilityInput, BulkIdsInput, BulkMoveInput, BulkVisibilityInput,
    CreateBookmarkInput, CreateGroupInput, GroupVisibilityInput, IdInput, ListBookmarksInput,
    UpdateBookmarkInput, UpdateGroupInput,
};

fn parse<T: DeserializeOwned>(params: &Value) -> Result<T, String> {
    serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {}", e))
}

fn reply<T: Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| format!("serialize error: {}", e))
}

fn require_ids(ids: &[String]) -> Result<(), String> {
    if ids.is_empty() {
        Err("ids cannot be empty".to_string())
    } else {
        Ok(())
    }
}

/// Dispatches one call. Returns `Ok(result)` or `Err(message)`.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    debug!(method, "rpc call");
    let a = app.lock().map_err(|e| e.to_string())?;

    match method {
        "ping" => Ok(json!("pong")),

        // ─── Groups ───
        "group.list" => reply(a.groups().list_groups().map_err(|e| e.to_string())?),
        "group.create" => {
            let input: CreateGroupInput = parse(params)?;
            let group = a
                .groups()
                .create_group(&input.name, &input.color)
                .map_err(|e| e.to_string())?;
            reply(group)
        }
        "group.update" => {
            let input: UpdateGroupInput = parse(params)?;
            let group = a
                .groups()
                .update_group(&input.id, input.name.as_deref(), input.color.as_deref())
                .map_err(|e| e.to_string())?;
            reply(group)
        }
        "group.delete" => {
            let input: IdInput = parse(params)?;
            a.groups().delete_group(&input.id).map_err(|e| e.to_string())?;
            reply(Ack::ok())
        }
        "group.setVisibility" => {
            let input: GroupVisibilityInput = parse(params)?;
            let group = a
                .groups()
                .set_visibility(&input.id, input.is_public)
                .map_err(|e| e.to_string())?;
            reply(group)
        }

        // ─── Bookmarks ───
        "bookmark.list" => {
            let input: ListBookmarksInput = if params.is_null() {
                ListBookmarksInput::default()
            } else {
                parse(params)?
            };
            let bookmarks = a
                .bookmarks()
                .list_bookmarks(input.group_id.as_deref())
                .map_err(|e| e.to_string())?;
            reply(bookmarks)
        }
        "bookmark.create" => {
            let input: CreateBookmarkInput = parse(params)?;
            reply(a.bookmarks().create_bookmark(&input).map_err(|e| e.to_string())?)
        }
        "bookmark.update" => {
            let input: UpdateBookmarkInput = parse(params)?;
            reply(a.bookmarks().update_bookmark(&input).map_err(|e| e.to_string())?)
        }
        "bookmark.refetch" => {
            let input: IdInput = parse(params)?;
            reply(a.bookmarks().refetch_bookmark(&input.id).map_err(|e| e.to_string())?)
        }
        "bookmark.delete" => {
            let input: IdInput = parse(params)?;
            a.bookmarks()
                .bulk_delete(std::slice::from_ref(&input.id))
                .map_err(|e| e.to_string())?;
            reply(Ack::ok())
        }
        "bookmark.bulkDelete" => {
            let input: BulkIdsInput = parse(params)?;
            require_ids(&input.ids)?;
            let count = a.bookmarks().bulk_delete(&input.ids).map_err(|e| e.to_string())?;
            reply(Ack::counted(count))
        }
        "bookmark.bulkMove" => {
            let input: BulkMoveInput = parse(params)?;
            require_ids(&input.ids)?;
            let count = a
                .bookmarks()
                .bulk_move(&input.ids, &input.target_group_id)
                .map_err(|e| e.to_string())?;
            reply(Ack::counted(count))
        }
        "bookmark.setVisibility" => {
            let input: BookmarkVisibilityInput = parse(params)?;
            let bookmark = a
                .bookmarks()
                .set_visibility(&input.id, input.visibility)
                .map_err(|e| e.to_string())?;
            reply(bookmark)
        }
        "bookmark.bulkSetVisibility" => {
            let input: BulkVisibilityInput = parse(params)?;
            require_ids(&input.ids)?;
            let count = a
                .bookmarks()
                .bulk_set_visibility(&input.ids, input.visibility)
                .map_err(|e| e.to_string())?;
            reply(Ack::counted(count))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
