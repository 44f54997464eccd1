//! Reference server state: the store plus the metadata resolver.
//!
//! Managers borrow the connection, so they are created per call through
//! [`App::groups`] and [`App::bookmarks`].

use std::path::Path;

use tracing::info;

use crate::database::connection::Database;
use crate::managers::bookmark_manager::BookmarkManager;
use crate::managers::group_manager::{GroupManager, GroupManagerTrait};
use crate::services::url_metadata::{MetadataResolver, OriginFaviconResolver};
use crate::types::errors::StoreError;

pub const DATABASE_FILE: &str = "minimark.db";

pub struct App {
    pub db: Database,
    resolver: Box<dyn MetadataResolver>,
}

impl App {
    /// Opens the store at `db_path` and provisions the default group if needed.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        Self::provisioned(Database::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::provisioned(Database::open_in_memory()?)
    }

    fn provisioned(db: Database) -> Result<Self, StoreError> {
        let app = Self {
            db,
            resolver: Box::new(OriginFaviconResolver),
        };
        if let Some(group) = app.groups().ensure_default_group()? {
            info!(group = %group.id, "provisioned default group");
        }
        Ok(app)
    }

    /// Replaces the metadata resolver used by create and refetch.
    pub fn with_resolver(mut self, resolver: Box<dyn MetadataResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn groups(&self) -> GroupManager<'_> {
        GroupManager::new(self.db.connection())
    }

    pub fn bookmarks(&self) -> BookmarkManager<'_> {
        BookmarkManager::new(self.db.connection(), self.resolver.as_ref())
    }
}
