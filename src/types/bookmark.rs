use serde::{Deserialize, Serialize};

use super::temp_id::is_temp_id;

/// What a bookmark holds: a link, a color swatch, or a plain text snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkType {
    Link,
    Color,
    Text,
}

impl BookmarkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookmarkType::Link => "link",
            BookmarkType::Color => "color",
            BookmarkType::Text => "text",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "link" => Some(BookmarkType::Link),
            "color" => Some(BookmarkType::Color),
            "text" => Some(BookmarkType::Text),
            _ => None,
        }
    }
}

/// Per-bookmark visibility on the public profile.
///
/// On the wire this is the nullable `isPublic` flag: `true` is
/// [`Visibility::Public`], `false` is [`Visibility::Private`] and `null`
/// is [`Visibility::Inherit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Visibility {
    /// Always public, even inside a private group.
    Public,
    /// Explicitly hidden, even inside a public group.
    Private,
    /// Follows the owning group.
    #[default]
    Inherit,
}

impl Visibility {
    /// Whether a bookmark with this setting shows up publicly.
    pub fn is_effectively_public(self, group_is_public: bool) -> bool {
        match self {
            Visibility::Public => true,
            Visibility::Private => false,
            Visibility::Inherit => group_is_public,
        }
    }

    /// The setting a "toggle visibility" action should write.
    ///
    /// Turning a public bookmark off inside a public group needs an explicit
    /// override; in a private group clearing back to inherit is enough.
    pub fn toggled(self, group_is_public: bool) -> Visibility {
        if !self.is_effectively_public(group_is_public) {
            Visibility::Public
        } else if group_is_public {
            Visibility::Private
        } else {
            Visibility::Inherit
        }
    }
}

impl From<Option<bool>> for Visibility {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Visibility::Public,
            Some(false) => Visibility::Private,
            None => Visibility::Inherit,
        }
    }
}

impl From<Visibility> for Option<bool> {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Public => Some(true),
            Visibility::Private => Some(false),
            Visibility::Inherit => None,
        }
    }
}

/// A saved link, color or text snippet belonging to exactly one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(rename = "type")]
    pub kind: BookmarkType,
    #[serde(default)]
    pub color: Option<String>,
    pub group_id: String,
    #[serde(default, rename = "isPublic")]
    pub visibility: Visibility,
    pub created_at: i64,
}

impl Bookmark {
    /// True while the row only exists in the client cache.
    pub fn is_pending(&self) -> bool {
        is_temp_id(&self.id)
    }

    /// Payload placed on the clipboard: url, then color, then title.
    pub fn clipboard_text(&self) -> &str {
        self.url
            .as_deref()
            .or(self.color.as_deref())
            .unwrap_or(&self.title)
    }

    /// Case-insensitive substring match on title or url.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .url
                .as_deref()
                .is_some_and(|url| url.to_lowercase().contains(needle))
    }
}
