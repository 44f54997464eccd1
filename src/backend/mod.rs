//! Client side of the bookmark RPC contract.
//!
//! [`Backend`] is what the dashboard talks to. [`RpcClient`] implements it
//! over any [`Transport`] that can move a method name and JSON params.
//! Every failure, whatever its cause, surfaces as a [`RemoteError`].

pub mod transport;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::bookmark::Bookmark;
use crate::types::errors::RemoteError;
use crate::types::group::Group;
use crate::types::rpc::{Ack, ListBookmarksInput, RemoteReply, RemoteRequest};

pub use transport::{HttpTransport, InProcessTransport};

/// Moves one call to the server and returns its `result` payload.
#[async_trait(?Send)]
pub trait Transport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RemoteError>;
}

/// Reads and writes the dashboard needs.
#[async_trait(?Send)]
pub trait Backend {
    async fn list_groups(&self) -> Result<Vec<Group>, RemoteError>;
    async fn list_bookmarks(&self, group_id: Option<&str>) -> Result<Vec<Bookmark>, RemoteError>;
    async fn execute(&self, request: &RemoteRequest) -> Result<RemoteReply, RemoteError>;
}

/// Typed client over a [`Transport`].
pub struct RpcClient<T> {
    transport: T,
}

impl<T: Transport> RpcClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn invoke<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, RemoteError> {
        let value = self.transport.call(method, params).await?;
        decode(value)
    }
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, RemoteError> {
    serde_json::from_value(value).map_err(|e| RemoteError::Decode(e.to_string()))
}

#[async_trait(?Send)]
impl<T: Transport> Backend for RpcClient<T> {
    async fn list_groups(&self) -> Result<Vec<Group>, RemoteError> {
        self.invoke("group.list", Value::Null).await
    }

    async fn list_bookmarks(&self, group_id: Option<&str>) -> Result<Vec<Bookmark>, RemoteError> {
        let input = ListBookmarksInput {
            group_id: group_id.map(str::to_string),
        };
        let params = serde_json::to_value(input).map_err(|e| RemoteError::Decode(e.to_string()))?;
        self.invoke("bookmark.list", params).await
    }

    async fn execute(&self, request: &RemoteRequest) -> Result<RemoteReply, RemoteError> {
        let params = request
            .params()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        let value = self.transport.call(request.method(), params).await?;

        match request {
            RemoteRequest::CreateBookmark(_)
            | RemoteRequest::UpdateBookmark(_)
            | RemoteRequest::RefetchBookmark(_)
            | RemoteRequest::SetBookmarkVisibility(_) => decode(value).map(RemoteReply::Bookmark),
            RemoteRequest::CreateGroup(_)
            | RemoteRequest::UpdateGroup(_)
            | RemoteRequest::SetGroupVisibility(_) => decode(value).map(RemoteReply::Group),
            RemoteRequest::BulkDeleteBookmarks(_)
            | RemoteRequest::BulkMoveBookmarks(_)
            | RemoteRequest::BulkSetBookmarkVisibility(_)
            | RemoteRequest::DeleteGroup(_) => {
                let ack: Ack = decode(value)?;
                if !ack.success {
                    return Err(RemoteError::Server(format!(
                        "{} was not acknowledged",
                        request.method()
                    )));
                }
                Ok(RemoteReply::Ack(ack))
            }
        }
    }
}
