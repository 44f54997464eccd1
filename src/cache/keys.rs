use std::fmt;

/// Identifies one addressable slice of cached server data.
///
/// Keys compare by value, so two independently built keys for the same
/// group address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// All groups of the current user.
    Groups,
    /// Bookmarks of one group; `None` is the unfiltered "all bookmarks" list.
    Bookmarks(Option<String>),
}

/// Coarse grouping of keys, used for family-wide invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    Groups,
    Bookmarks,
}

impl CacheKey {
    pub fn groups() -> Self {
        CacheKey::Groups
    }

    pub fn bookmarks(group_id: Option<&str>) -> Self {
        CacheKey::Bookmarks(group_id.map(str::to_string))
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            CacheKey::Groups => KeyFamily::Groups,
            CacheKey::Bookmarks(_) => KeyFamily::Bookmarks,
        }
    }

    /// Group a bookmark-list key is scoped to.
    pub fn group_id(&self) -> Option<&str> {
        match self {
            CacheKey::Bookmarks(group_id) => group_id.as_deref(),
            CacheKey::Groups => None,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Groups => write!(f, "[groups]"),
            CacheKey::Bookmarks(Some(id)) => write!(f, "[bookmarks {}]", id),
            CacheKey::Bookmarks(None) => write!(f, "[bookmarks *]"),
        }
    }
}
