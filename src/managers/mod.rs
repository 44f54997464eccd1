// Minimark state managers
// Managers handle stateful operations: groups and bookmarks on the server, selection, shortcuts and revalidation on the client.

pub mod bookmark_manager;
pub mod group_manager;
pub mod revalidation_manager;
pub mod selection_manager;
pub mod shortcut_manager;
