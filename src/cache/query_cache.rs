//! Key-addressable store of server lists with freshness tracking.
//!
//! Every entry carries a fetch generation. Starting a fetch hands out a
//! [`FetchTicket`] stamped with the current generation; cancelling bumps it,
//! so a response that arrives after an optimistic write is dropped instead
//! of overwriting the prediction with pre-mutation data.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use super::keys::{CacheKey, KeyFamily};
use crate::types::bookmark::Bookmark;
use crate::types::group::Group;

/// A cached server list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    Groups(Vec<Group>),
    Bookmarks(Vec<Bookmark>),
}

/// Observable freshness of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Holds data nobody has invalidated.
    Fresh,
    /// Invalidated or empty; the next read should refetch.
    Stale,
    /// A fetch is in flight.
    Fetching,
}

#[derive(Debug)]
struct CacheEntry {
    value: Option<CacheValue>,
    invalidated: bool,
    fetching: bool,
    updated_at: Option<Instant>,
    generation: u64,
}

impl CacheEntry {
    fn empty() -> Self {
        Self {
            value: None,
            invalidated: false,
            fetching: false,
            updated_at: None,
            generation: 0,
        }
    }

    fn touch(&mut self) {
        self.invalidated = false;
        self.updated_at = Some(Instant::now());
    }
}

/// Saved copy of one entry, taken right before an optimistic write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    key: CacheKey,
    value: Option<CacheValue>,
    invalidated: bool,
}

impl Snapshot {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn value(&self) -> Option<&CacheValue> {
        self.value.as_ref()
    }
}

/// Proof that a fetch was started; only the latest ticket per key may write.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket {
    key: CacheKey,
    generation: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }
}

/// The client cache. Passed by reference into every mutation; never global.
#[derive(Debug)]
pub struct QueryCache {
    entries: HashMap<CacheKey, CacheEntry>,
    stale_time: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stale_time,
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CacheValue> {
        self.entries.get(key).and_then(|entry| entry.value.as_ref())
    }

    pub fn groups(&self) -> Option<&[Group]> {
        match self.get(&CacheKey::Groups) {
            Some(CacheValue::Groups(groups)) => Some(groups),
            _ => None,
        }
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups()?.iter().find(|g| g.id == id)
    }

    pub fn bookmarks(&self, group_id: Option<&str>) -> Option<&[Bookmark]> {
        match self.get(&CacheKey::bookmarks(group_id)) {
            Some(CacheValue::Bookmarks(bookmarks)) => Some(bookmarks),
            _ => None,
        }
    }

    /// Writes `value` under `key` and marks it fresh.
    pub fn set(&mut self, key: CacheKey, value: CacheValue) {
        let entry = self.entries.entry(key).or_insert_with(CacheEntry::empty);
        entry.value = Some(value);
        entry.touch();
    }

    pub fn set_groups(&mut self, groups: Vec<Group>) {
        self.set(CacheKey::Groups, CacheValue::Groups(groups));
    }

    pub fn set_bookmarks(&mut self, group_id: Option<&str>, bookmarks: Vec<Bookmark>) {
        self.set(CacheKey::bookmarks(group_id), CacheValue::Bookmarks(bookmarks));
    }

    /// Edits the cached group list in place. Returns false if it is not cached.
    pub fn update_groups(&mut self, f: impl FnOnce(&mut Vec<Group>)) -> bool {
        let Some(entry) = self.entries.get_mut(&CacheKey::Groups) else {
            return false;
        };
        match entry.value.as_mut() {
            Some(CacheValue::Groups(groups)) => {
                f(groups);
                entry.touch();
                true
            }
            _ => false,
        }
    }

    /// Edits one cached bookmark list in place. Returns false if it is not cached.
    pub fn update_bookmarks(
        &mut self,
        group_id: Option<&str>,
        f: impl FnOnce(&mut Vec<Bookmark>),
    ) -> bool {
        let Some(entry) = self.entries.get_mut(&CacheKey::bookmarks(group_id)) else {
            return false;
        };
        match entry.value.as_mut() {
            Some(CacheValue::Bookmarks(bookmarks)) => {
                f(bookmarks);
                entry.touch();
                true
            }
            _ => false,
        }
    }

    pub fn status(&self, key: &CacheKey) -> Option<EntryStatus> {
        self.entries.get(key).map(|entry| {
            if entry.fetching {
                EntryStatus::Fetching
            } else if entry.invalidated || entry.value.is_none() {
                EntryStatus::Stale
            } else {
                EntryStatus::Fresh
            }
        })
    }

    pub fn is_invalidated(&self, key: &CacheKey) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.invalidated)
    }

    pub fn is_fetching(&self, key: &CacheKey) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.fetching)
    }

    /// Whether a read at `now` should go back to the server.
    pub fn needs_refetch(&self, key: &CacheKey, now: Instant) -> bool {
        match self.entries.get(key) {
            None => true,
            Some(entry) => {
                entry.value.is_none()
                    || entry.invalidated
                    || entry
                        .updated_at
                        .map_or(true, |at| now.saturating_duration_since(at) >= self.stale_time)
            }
        }
    }

    /// Marks an entry stale while keeping its data readable.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.invalidated = true;
                true
            }
            None => false,
        }
    }

    /// Invalidates every entry of a family. Returns how many were marked.
    pub fn invalidate_family(&mut self, family: KeyFamily) -> usize {
        let mut marked = 0;
        for (key, entry) in self.entries.iter_mut() {
            if key.family() == family {
                entry.invalidated = true;
                marked += 1;
            }
        }
        marked
    }

    /// Invalidated entries with no fetch in flight, groups first.
    pub fn stale_keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.invalidated && !entry.fetching)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn remove(&mut self, key: &CacheKey) -> Option<CacheValue> {
        self.entries.remove(key).and_then(|entry| entry.value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.keys()
    }

    /// Supersedes any in-flight fetch for `key`. Returns true if one was pending.
    pub fn cancel(&mut self, key: &CacheKey) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        entry.generation += 1;
        let was_fetching = entry.fetching;
        entry.fetching = false;
        if was_fetching {
            debug!(key = %key, "cancelled in-flight fetch");
        }
        was_fetching
    }

    pub fn begin_fetch(&mut self, key: CacheKey) -> FetchTicket {
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(CacheEntry::empty);
        entry.generation += 1;
        entry.fetching = true;
        FetchTicket {
            key,
            generation: entry.generation,
        }
    }

    /// Stores a fetch result unless the ticket was superseded meanwhile.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, value: CacheValue) -> bool {
        let Some(entry) = self.entries.get_mut(&ticket.key) else {
            debug!(key = %ticket.key, "dropping fetch result for evicted entry");
            return false;
        };
        if entry.generation != ticket.generation {
            debug!(key = %ticket.key, "dropping superseded fetch result");
            return false;
        }
        entry.value = Some(value);
        entry.fetching = false;
        entry.touch();
        true
    }

    /// Clears the in-flight flag after a failed fetch, keeping the old data.
    pub fn fail_fetch(&mut self, ticket: FetchTicket) -> bool {
        match self.entries.get_mut(&ticket.key) {
            Some(entry) if entry.generation == ticket.generation => {
                entry.fetching = false;
                true
            }
            _ => false,
        }
    }

    pub fn snapshot(&self, key: &CacheKey) -> Snapshot {
        Snapshot {
            key: key.clone(),
            value: self.get(key).cloned(),
            invalidated: self.is_invalidated(key),
        }
    }

    /// Puts a snapshot back verbatim, including the absence of a value.
    pub fn restore(&mut self, snapshot: Snapshot) {
        let Snapshot {
            key,
            value,
            invalidated,
        } = snapshot;
        match value {
            Some(value) => {
                let entry = self.entries.entry(key).or_insert_with(CacheEntry::empty);
                entry.value = Some(value);
                entry.updated_at = Some(Instant::now());
                entry.invalidated = invalidated;
            }
            None => {
                if let Some(entry) = self.entries.get_mut(&key) {
                    entry.value = None;
                    entry.invalidated = invalidated;
                }
            }
        }
    }
}
