//! Request and reply shapes of the bookmark RPC contract.
//!
//! Field names follow the wire format (camelCase), so the same structs are
//! used by the client and by the reference server handler.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::bookmark::{Bookmark, BookmarkType, Visibility};
use super::group::Group;

fn default_kind() -> BookmarkType {
    BookmarkType::Link
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookmarkInput {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: BookmarkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub group_id: String,
}

/// Partial bookmark update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookmarkInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<BookmarkType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGroupInput {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateGroupInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdInput {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBookmarksInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkIdsInput {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMoveInput {
    pub ids: Vec<String>,
    pub target_group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkVisibilityInput {
    pub id: String,
    #[serde(default, rename = "isPublic")]
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkVisibilityInput {
    pub ids: Vec<String>,
    #[serde(default, rename = "isPublic")]
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupVisibilityInput {
    pub id: String,
    pub is_public: bool,
}

/// Acknowledgement returned by delete and bulk procedures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true, count: None }
    }

    pub fn counted(count: usize) -> Self {
        Self {
            success: true,
            count: Some(count as u64),
        }
    }
}

/// A write the client wants the server to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    CreateBookmark(CreateBookmarkInput),
    UpdateBookmark(UpdateBookmarkInput),
    RefetchBookmark(IdInput),
    BulkDeleteBookmarks(BulkIdsInput),
    BulkMoveBookmarks(BulkMoveInput),
    SetBookmarkVisibility(BookmarkVisibilityInput),
    BulkSetBookmarkVisibility(BulkVisibilityInput),
    CreateGroup(CreateGroupInput),
    UpdateGroup(UpdateGroupInput),
    DeleteGroup(IdInput),
    SetGroupVisibility(GroupVisibilityInput),
}

impl RemoteRequest {
    /// RPC method name, e.g. `bookmark.bulkDelete`.
    pub fn method(&self) -> &'static str {
        match self {
            RemoteRequest::CreateBookmark(_) => "bookmark.create",
            RemoteRequest::UpdateBookmark(_) => "bookmark.update",
            RemoteRequest::RefetchBookmark(_) => "bookmark.refetch",
            RemoteRequest::BulkDeleteBookmarks(_) => "bookmark.bulkDelete",
            RemoteRequest::BulkMoveBookmarks(_) => "bookmark.bulkMove",
            RemoteRequest::SetBookmarkVisibility(_) => "bookmark.setVisibility",
            RemoteRequest::BulkSetBookmarkVisibility(_) => "bookmark.bulkSetVisibility",
            RemoteRequest::CreateGroup(_) => "group.create",
            RemoteRequest::UpdateGroup(_) => "group.update",
            RemoteRequest::DeleteGroup(_) => "group.delete",
            RemoteRequest::SetGroupVisibility(_) => "group.setVisibility",
        }
    }

    /// Serialized params object for [`RemoteRequest::method`].
    pub fn params(&self) -> Result<Value, serde_json::Error> {
        match self {
            RemoteRequest::CreateBookmark(input) => serde_json::to_value(input),
            RemoteRequest::UpdateBookmark(input) => serde_json::to_value(input),
            RemoteRequest::RefetchBookmark(input) => serde_json::to_value(input),
            RemoteRequest::BulkDeleteBookmarks(input) => serde_json::to_value(input),
            RemoteRequest::BulkMoveBookmarks(input) => serde_json::to_value(input),
            RemoteRequest::SetBookmarkVisibility(input) => serde_json::to_value(input),
            RemoteRequest::BulkSetBookmarkVisibility(input) => serde_json::to_value(input),
            RemoteRequest::CreateGroup(input) => serde_json::to_value(input),
            RemoteRequest::UpdateGroup(input) => serde_json::to_value(input),
            RemoteRequest::DeleteGroup(input) => serde_json::to_value(input),
            RemoteRequest::SetGroupVisibility(input) => serde_json::to_value(input),
        }
    }
}

/// What the server answered to a [`RemoteRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteReply {
    Bookmark(Bookmark),
    Group(Group),
    Ack(Ack),
    /// Nothing had to be sent (every id involved was still a placeholder).
    Skipped,
}
