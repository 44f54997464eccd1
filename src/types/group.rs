use serde::{Deserialize, Serialize};

/// Swatches offered to new groups, in the order they are handed out.
pub const DEFAULT_GROUP_PALETTE: [&str; 13] = [
    "#3E63DD",
    "#208368",
    "#FFDC00",
    "#CE2C31",
    "#53195D",
    "#0086F0FA",
    "#838383",
    "#74B06F",
    "#4A90D9",
    "#E6A23C",
    "#9B59B6",
    "#E74C3C",
    "#202020",
];

/// Name given to the group provisioned for an empty store.
pub const DEFAULT_GROUP_NAME: &str = "Bookmarks";

/// A named, colored collection of bookmarks.
///
/// `bookmark_count` is derived by the server and cached alongside the group;
/// optimistic mutations keep it in step with the cached bookmark list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub bookmark_count: u32,
}
