//! Group Manager for the reference server.
//!
//! Implements `GroupManagerTrait` over SQLite: listing with derived bookmark
//! counts, create/update/visibility, and deletion that hands the group's
//! bookmarks to the first remaining group.

use rusqlite::{params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use uuid::Uuid;

use crate::types::errors::StoreError;
use crate::types::group::{Group, DEFAULT_GROUP_NAME, DEFAULT_GROUP_PALETTE};

/// Trait defining group management operations.
pub trait GroupManagerTrait {
    fn list_groups(&self) -> Result<Vec<Group>, StoreError>;
    fn get_group(&self, id: &str) -> Result<Group, StoreError>;
    fn create_group(&mut self, name: &str, color: &str) -> Result<Group, StoreError>;
    fn update_group(&mut self, id: &str, name: Option<&str>, color: Option<&str>) -> Result<Group, StoreError>;
    /// Deletes a group; its bookmarks move to the first remaining group.
    /// Returns how many bookmarks were reassigned.
    fn delete_group(&mut self, id: &str) -> Result<usize, StoreError>;
    fn set_visibility(&mut self, id: &str, is_public: bool) -> Result<Group, StoreError>;
    /// Creates the default group when none exists. Returns it if created.
    fn ensure_default_group(&mut self) -> Result<Option<Group>, StoreError>;
}

/// Group manager backed by a SQLite connection.
pub struct GroupManager<'a> {
    conn: &'a Connection,
}

const GROUP_COLUMNS: &str = "g.id, g.name, g.color, g.is_public, \
     (SELECT COUNT(*) FROM bookmarks b WHERE b.group_id = g.id)";

impl<'a> GroupManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_group(row: &rusqlite::Row) -> rusqlite::Result<Group> {
        Ok(Group {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
            is_public: row.get(3)?,
            bookmark_count: row.get(4)?,
        })
    }

    fn next_position(&self) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM bookmark_groups",
            [],
            |row| row.get(0),
        )?)
    }
}

impl<'a> GroupManagerTrait for GroupManager<'a> {
    /// Groups in creation order, each with its current bookmark count.
    fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bookmark_groups g ORDER BY g.position, g.created_at",
            GROUP_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::row_to_group)?;

        let mut groups = Vec::new();
        for row in rows {
            groups.push(row?);
        }
        Ok(groups)
    }

    fn get_group(&self, id: &str) -> Result<Group, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM bookmark_groups g WHERE g.id = ?1", GROUP_COLUMNS),
                params![id],
                Self::row_to_group,
            )
            .optional()?
            .ok_or_else(|| StoreError::GroupNotFound(id.to_string()))
    }

    fn create_group(&mut self, name: &str, color: &str) -> Result<Group, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("Group name cannot be empty".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let now = Self::now();
        let position = self.next_position()?;
        self.conn.execute(
            "INSERT INTO bookmark_groups (id, name, color, is_public, position, created_at, updated_at) \
             VALUES (?1, ?2, ?3, 0, ?4, ?5, ?5)",
            params![id, name, color, position, now],
        )?;
        self.get_group(&id)
    }

    fn update_group(&mut self, id: &str, name: Option<&str>, color: Option<&str>) -> Result<Group, StoreError> {
        let name = name.map(str::trim);
        if name.is_some_and(str::is_empty) {
            return Err(StoreError::InvalidInput("Group name cannot be empty".to_string()));
        }

        let affected = self.conn.execute(
            "UPDATE bookmark_groups SET name = COALESCE(?1, name), color = COALESCE(?2, color), \
             updated_at = ?3 WHERE id = ?4",
            params![name, color, Self::now(), id],
        )?;
        if affected == 0 {
            return Err(StoreError::GroupNotFound(id.to_string()));
        }
        self.get_group(id)
    }

    fn delete_group(&mut self, id: &str) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM bookmark_groups WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StoreError::GroupNotFound(id.to_string()));
        }

        let fallback: Option<String> = tx
            .query_row(
                "SELECT id FROM bookmark_groups WHERE id != ?1 ORDER BY position, created_at LIMIT 1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(fallback) = fallback else {
            return Err(StoreError::LastGroup(id.to_string()));
        };

        let moved = tx.execute(
            "UPDATE bookmarks SET group_id = ?1, is_public = NULL, updated_at = ?2 WHERE group_id = ?3",
            params![fallback, Self::now(), id],
        )?;
        tx.execute("DELETE FROM bookmark_groups WHERE id = ?1", params![id])?;
        tx.commit()?;

        info!(group = id, fallback = %fallback, moved, "deleted group");
        Ok(moved)
    }

    fn set_visibility(&mut self, id: &str, is_public: bool) -> Result<Group, StoreError> {
        let affected = self.conn.execute(
            "UPDATE bookmark_groups SET is_public = ?1, updated_at = ?2 WHERE id = ?3",
            params![is_public, Self::now(), id],
        )?;
        if affected == 0 {
            return Err(StoreError::GroupNotFound(id.to_string()));
        }
        self.get_group(id)
    }

    fn ensure_default_group(&mut self) -> Result<Option<Group>, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM bookmark_groups", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(None);
        }
        self.create_group(DEFAULT_GROUP_NAME, DEFAULT_GROUP_PALETTE[0]).map(Some)
    }
}
