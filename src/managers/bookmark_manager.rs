//! Bookmark Manager for the reference server.
//!
//! Implements `BookmarkManagerTrait`: CRUD, bulk and visibility operations
//! on bookmarks, backed by SQLite via `rusqlite`. Lists are ordered by a
//! revision counter that is bumped on insert and on every move, so the most
//! recently added or moved bookmark comes first.

use rusqlite::{params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::services::input_parser::normalize_url;
use crate::services::url_metadata::MetadataResolver;
use crate::types::bookmark::{Bookmark, BookmarkType, Visibility};
use crate::types::errors::StoreError;
use crate::types::rpc::{CreateBookmarkInput, UpdateBookmarkInput};

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    fn list_bookmarks(&self, group_id: Option<&str>) -> Result<Vec<Bookmark>, StoreError>;
    fn get_bookmark(&self, id: &str) -> Result<Bookmark, StoreError>;
    /// Creates a bookmark. A link whose url already exists in the group
    /// refreshes and returns the existing row instead.
    fn create_bookmark(&mut self, input: &CreateBookmarkInput) -> Result<Bookmark, StoreError>;
    fn update_bookmark(&mut self, input: &UpdateBookmarkInput) -> Result<Bookmark, StoreError>;
    fn refetch_bookmark(&mut self, id: &str) -> Result<Bookmark, StoreError>;
    fn bulk_delete(&mut self, ids: &[String]) -> Result<usize, StoreError>;
    fn bulk_move(&mut self, ids: &[String], target_group_id: &str) -> Result<usize, StoreError>;
    fn set_visibility(&mut self, id: &str, visibility: Visibility) -> Result<Bookmark, StoreError>;
    fn bulk_set_visibility(&mut self, ids: &[String], visibility: Visibility) -> Result<usize, StoreError>;
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
    resolver: &'a dyn MetadataResolver,
}

const BOOKMARK_COLUMNS: &str =
    "id, title, url, favicon, type, color, group_id, is_public, created_at";

impl<'a> BookmarkManager<'a> {
    pub fn new(conn: &'a Connection, resolver: &'a dyn MetadataResolver) -> Self {
        Self { conn, resolver }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn next_revision(&self) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(MAX(revision), 0) + 1 FROM bookmarks",
            [],
            |row| row.get(0),
        )?)
    }

    fn group_exists(&self, group_id: &str) -> Result<bool, StoreError> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM bookmark_groups WHERE id = ?1)",
            params![group_id],
            |row| row.get(0),
        )?)
    }

    fn require_group(&self, group_id: &str) -> Result<(), StoreError> {
        if self.group_exists(group_id)? {
            Ok(())
        } else {
            Err(StoreError::GroupNotFound(group_id.to_string()))
        }
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        let kind: String = row.get(4)?;
        let is_public: Option<bool> = row.get(7)?;
        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            favicon: row.get(3)?,
            kind: BookmarkType::parse(&kind).unwrap_or(BookmarkType::Text),
            color: row.get(5)?,
            group_id: row.get(6)?,
            visibility: Visibility::from(is_public),
            created_at: row.get(8)?,
        })
    }

    fn find_link(&self, group_id: &str, url: &str) -> Result<Option<Bookmark>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM bookmarks WHERE group_id = ?1 AND url = ?2 LIMIT 1",
                    BOOKMARK_COLUMNS
                ),
                params![group_id, url],
                Self::row_to_bookmark,
            )
            .optional()?)
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    /// Bookmarks of one group, or of every group when `group_id` is `None`.
    fn list_bookmarks(&self, group_id: Option<&str>) -> Result<Vec<Bookmark>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bookmarks WHERE (?1 IS NULL OR group_id = ?1) ORDER BY revision DESC",
            BOOKMARK_COLUMNS
        ))?;
        let rows = stmt.query_map(params![group_id], Self::row_to_bookmark)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn get_bookmark(&self, id: &str) -> Result<Bookmark, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM bookmarks WHERE id = ?1", BOOKMARK_COLUMNS),
                params![id],
                Self::row_to_bookmark,
            )
            .optional()?
            .ok_or_else(|| StoreError::BookmarkNotFound(id.to_string()))
    }

    fn create_bookmark(&mut self, input: &CreateBookmarkInput) -> Result<Bookmark, StoreError> {
        let mut title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(StoreError::InvalidInput("Title cannot be empty".to_string()));
        }
        self.require_group(&input.group_id)?;

        let mut url = input.url.clone().filter(|u| !u.is_empty());
        let mut favicon = None;

        if input.kind == BookmarkType::Link {
            if let Some(raw) = url.as_deref() {
                let normalized = normalize_url(raw);
                let metadata = self.resolver.resolve(&normalized);

                if let Some(existing) = self.find_link(&input.group_id, &normalized)? {
                    self.conn.execute(
                        "UPDATE bookmarks SET title = ?1, favicon = COALESCE(?2, favicon), \
                         revision = ?3, updated_at = ?4 WHERE id = ?5",
                        params![
                            metadata.title.as_deref().unwrap_or(&existing.title),
                            metadata.favicon,
                            self.next_revision()?,
                            Self::now(),
                            existing.id
                        ],
                    )?;
                    return self.get_bookmark(&existing.id);
                }

                if let Some(resolved) = metadata.title {
                    title = resolved;
                }
                favicon = metadata.favicon;
                url = Some(normalized);
            }
        }

        let id = Uuid::new_v4().to_string();
        let now = Self::now();
        self.conn.execute(
            "INSERT INTO bookmarks (id, title, url, favicon, type, color, group_id, is_public, \
             revision, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?9, ?9)",
            params![
                id,
                title,
                url,
                favicon,
                input.kind.as_str(),
                input.color,
                input.group_id,
                self.next_revision()?,
                now
            ],
        )?;
        self.get_bookmark(&id)
    }

    /// Applies the given fields. Moving to another group resets visibility
    /// to inherit and puts the bookmark on top of the target list.
    fn update_bookmark(&mut self, input: &UpdateBookmarkInput) -> Result<Bookmark, StoreError> {
        let existing = self.get_bookmark(&input.id)?;
        if let Some(title) = &input.title {
            if title.trim().is_empty() {
                return Err(StoreError::InvalidInput("Title cannot be empty".to_string()));
            }
        }

        let moving = input
            .group_id
            .as_deref()
            .filter(|target| *target != existing.group_id);
        if let Some(target) = moving {
            self.require_group(target)?;
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE bookmarks SET title = COALESCE(?1, title), url = COALESCE(?2, url), \
             type = COALESCE(?3, type), color = COALESCE(?4, color), updated_at = ?5 WHERE id = ?6",
            params![
                input.title.as_deref().map(str::trim),
                input.url,
                input.kind.map(|k| k.as_str()),
                input.color,
                Self::now(),
                input.id
            ],
        )?;
        if let Some(target) = moving {
            tx.execute(
                "UPDATE bookmarks SET group_id = ?1, is_public = NULL, revision = ?2 WHERE id = ?3",
                params![target, self.next_revision()?, input.id],
            )?;
        }
        tx.commit()?;

        self.get_bookmark(&input.id)
    }

    /// Re-derives favicon (and title, when the resolver finds one) from the live url.
    fn refetch_bookmark(&mut self, id: &str) -> Result<Bookmark, StoreError> {
        let existing = self.get_bookmark(id)?;
        let Some(url) = existing.url.as_deref() else {
            return Err(StoreError::NoUrl(id.to_string()));
        };

        let metadata = self.resolver.resolve(url);
        self.conn.execute(
            "UPDATE bookmarks SET title = ?1, favicon = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                metadata.title.as_deref().unwrap_or(&existing.title),
                metadata.favicon,
                Self::now(),
                id
            ],
        )?;
        self.get_bookmark(id)
    }

    /// Deletes whichever of `ids` exist. Returns how many rows went away.
    fn bulk_delete(&mut self, ids: &[String]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut count = 0;
        for id in ids {
            count += tx.execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?;
        }
        tx.commit()?;
        Ok(count)
    }

    /// Moves whichever of `ids` exist; the first id ends up on top of the target.
    fn bulk_move(&mut self, ids: &[String], target_group_id: &str) -> Result<usize, StoreError> {
        self.require_group(target_group_id)?;

        let tx = self.conn.unchecked_transaction()?;
        let mut revision = self.next_revision()?;
        let now = Self::now();
        let mut count = 0;
        for id in ids.iter().rev() {
            count += tx.execute(
                "UPDATE bookmarks SET group_id = ?1, is_public = NULL, revision = ?2, updated_at = ?3 \
                 WHERE id = ?4",
                params![target_group_id, revision, now, id],
            )?;
            revision += 1;
        }
        tx.commit()?;
        Ok(count)
    }

    fn set_visibility(&mut self, id: &str, visibility: Visibility) -> Result<Bookmark, StoreError> {
        let flag: Option<bool> = visibility.into();
        let affected = self.conn.execute(
            "UPDATE bookmarks SET is_public = ?1, updated_at = ?2 WHERE id = ?3",
            params![flag, Self::now(), id],
        )?;
        if affected == 0 {
            return Err(StoreError::BookmarkNotFound(id.to_string()));
        }
        self.get_bookmark(id)
    }

    fn bulk_set_visibility(&mut self, ids: &[String], visibility: Visibility) -> Result<usize, StoreError> {
        let flag: Option<bool> = visibility.into();
        let tx = self.conn.unchecked_transaction()?;
        let now = Self::now();
        let mut count = 0;
        for id in ids {
            count += tx.execute(
                "UPDATE bookmarks SET is_public = ?1, updated_at = ?2 WHERE id = ?3",
                params![flag, now, id],
            )?;
        }
        tx.commit()?;
        Ok(count)
    }
}
