use std::fmt;

// === ValidationError ===

/// Input rejected before any cache entry is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title was empty after trimming.
    EmptyTitle,
    /// Group name was empty after trimming.
    EmptyName,
    /// A bulk action was requested with no ids.
    EmptySelection,
    /// No group is available to act on.
    NoGroupSelected,
    /// Source and target group are the same.
    SameGroup(String),
    /// The user's only group cannot be deleted.
    LastGroup(String),
    /// The group only exists as an optimistic placeholder.
    GroupNotSynced(String),
    /// An update carried no field to change.
    NothingToUpdate,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyTitle => write!(f, "Title cannot be empty"),
            ValidationError::EmptyName => write!(f, "Group name cannot be empty"),
            ValidationError::EmptySelection => write!(f, "No bookmarks selected"),
            ValidationError::NoGroupSelected => write!(f, "No group selected"),
            ValidationError::SameGroup(id) => write!(f, "Bookmark is already in group: {}", id),
            ValidationError::LastGroup(id) => write!(f, "Cannot delete the last group: {}", id),
            ValidationError::GroupNotSynced(id) => {
                write!(f, "Group is still being created: {}", id)
            }
            ValidationError::NothingToUpdate => write!(f, "Nothing to update"),
        }
    }
}

impl std::error::Error for ValidationError {}

// === RemoteError ===

/// Any non-success outcome of a remote call. Callers treat every variant the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never got a response.
    Network(String),
    /// The server answered with an error.
    Server(String),
    /// The response could not be decoded.
    Decode(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Network(msg) => write!(f, "Network error: {}", msg),
            RemoteError::Server(msg) => write!(f, "Server error: {}", msg),
            RemoteError::Decode(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for RemoteError {}

// === MutationError ===

/// Why a dashboard mutation did not take effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// Rejected up front; the cache was not touched.
    Invalid(ValidationError),
    /// The remote call failed and the optimistic write was rolled back.
    RolledBack(RemoteError),
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationError::Invalid(err) => write!(f, "Invalid input: {}", err),
            MutationError::RolledBack(err) => write!(f, "Rolled back: {}", err),
        }
    }
}

impl std::error::Error for MutationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MutationError::Invalid(err) => Some(err),
            MutationError::RolledBack(err) => Some(err),
        }
    }
}

impl From<ValidationError> for MutationError {
    fn from(err: ValidationError) -> Self {
        MutationError::Invalid(err)
    }
}

impl From<RemoteError> for MutationError {
    fn from(err: RemoteError) -> Self {
        MutationError::RolledBack(err)
    }
}

// === StoreError ===

/// Errors raised by the SQLite-backed reference server.
#[derive(Debug)]
pub enum StoreError {
    /// Bookmark with the given ID was not found.
    BookmarkNotFound(String),
    /// Group with the given ID was not found.
    GroupNotFound(String),
    /// Refusing to delete the only remaining group.
    LastGroup(String),
    /// Bookmark has no URL to fetch metadata from.
    NoUrl(String),
    /// Input failed server-side validation.
    InvalidInput(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::BookmarkNotFound(id) => write!(f, "Bookmark not found: {}", id),
            StoreError::GroupNotFound(id) => write!(f, "Group not found: {}", id),
            StoreError::LastGroup(id) => write!(f, "Cannot delete the last group: {}", id),
            StoreError::NoUrl(id) => write!(f, "Bookmark has no URL: {}", id),
            StoreError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            StoreError::DatabaseError(msg) => write!(f, "Store database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

// === SettingsError ===

/// Errors related to loading or changing dashboard settings.
#[derive(Debug)]
pub enum SettingsError {
    /// Failed to read or write the settings file.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The settings key does not exist.
    InvalidKey(String),
    /// The value does not fit the setting it was written to.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => write!(f, "Invalid settings value: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

// === ShortcutError ===

/// Errors related to keyboard shortcut management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutError {
    /// No action with the given name exists.
    UnknownAction(String),
    /// The shortcut keys conflict with an existing binding.
    Conflict(String),
    /// The provided key combination is invalid.
    InvalidKeys(String),
}

impl fmt::Display for ShortcutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortcutError::UnknownAction(action) => write!(f, "Unknown shortcut action: {}", action),
            ShortcutError::Conflict(msg) => write!(f, "Shortcut conflict: {}", msg),
            ShortcutError::InvalidKeys(keys) => write!(f, "Invalid shortcut keys: {}", keys),
        }
    }
}

impl std::error::Error for ShortcutError {}
