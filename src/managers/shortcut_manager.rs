//! Keyboard shortcuts of the bookmark list.
//!
//! `ShortcutManager` keeps the rebindable chord table with conflict
//! detection. [`dispatch`] turns one key event into at most one
//! [`Command`], given a read-only [`KeyboardView`] of the dashboard, and
//! [`attach_dispatcher`] registers it once on a global event target.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::events::{EventTarget, LatestRef, ListenerId};
use crate::managers::selection_manager::resolve_active;
use crate::types::bookmark::Bookmark;
use crate::types::errors::ShortcutError;

/// A physical key, as far as the dashboard cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Space,
    Backspace,
    ArrowUp,
    ArrowDown,
    Other(String),
}

impl Key {
    fn parse(name: &str) -> Option<Key> {
        let key = match name {
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            "Space" => Key::Space,
            "Backspace" => Key::Backspace,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_graphic() => Key::Char(c.to_ascii_lowercase()),
                    _ => return None,
                }
            }
        };
        Some(key)
    }

    fn same_key(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(b),
            _ => self == other,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            Key::Enter => write!(f, "Enter"),
            Key::Escape => write!(f, "Escape"),
            Key::Space => write!(f, "Space"),
            Key::Backspace => write!(f, "Backspace"),
            Key::ArrowUp => write!(f, "ArrowUp"),
            Key::ArrowDown => write!(f, "ArrowDown"),
            Key::Other(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    /// Ctrl or Cmd. Both are accepted on every platform.
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Where keyboard focus was when the event fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusTarget {
    SearchInput,
    TextField,
    #[default]
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub focus: FocusTarget,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
            focus: FocusTarget::Body,
        }
    }

    /// Same key with Ctrl/Cmd held.
    pub fn primary(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn focused(mut self, focus: FocusTarget) -> Self {
        self.focus = focus;
        self
    }
}

/// A key combination such as `Mod+Backspace`. `Mod` is Ctrl or Cmd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    primary: bool,
    shift: bool,
    alt: bool,
    key: Key,
}

impl Chord {
    pub fn parse(keys: &str) -> Result<Chord, ShortcutError> {
        let invalid = || ShortcutError::InvalidKeys(keys.to_string());
        let mut parts: Vec<&str> = keys.split('+').map(str::trim).collect();
        let key_name = parts.pop().filter(|k| !k.is_empty()).ok_or_else(invalid)?;
        let key = Key::parse(key_name).ok_or_else(invalid)?;

        let mut chord = Chord {
            primary: false,
            shift: false,
            alt: false,
            key,
        };
        for modifier in parts {
            match modifier {
                "Mod" | "Ctrl" | "Cmd" | "Meta" => chord.primary = true,
                "Shift" => chord.shift = true,
                "Alt" | "Option" => chord.alt = true,
                _ => return Err(invalid()),
            }
        }
        Ok(chord)
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key.same_key(&event.key)
            && self.primary == event.modifiers.primary()
            && self.shift == event.modifiers.shift
            && self.alt == event.modifiers.alt
    }

    /// Label with the platform's modifier name (`Cmd+C` on macOS, `Ctrl+C` elsewhere).
    pub fn display(&self) -> String {
        let primary = if cfg!(target_os = "macos") { "Cmd+" } else { "Ctrl+" };
        self.to_string().replacen("Mod+", primary, 1)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.primary {
            write!(f, "Mod+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// Rebindable actions on the active bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShortcutAction {
    Copy,
    Rename,
    Delete,
    SelectAll,
}

impl ShortcutAction {
    pub const ALL: [ShortcutAction; 4] = [
        ShortcutAction::Copy,
        ShortcutAction::Rename,
        ShortcutAction::Delete,
        ShortcutAction::SelectAll,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShortcutAction::Copy => "copy",
            ShortcutAction::Rename => "rename",
            ShortcutAction::Delete => "delete",
            ShortcutAction::SelectAll => "select_all",
        }
    }

    pub fn from_name(name: &str) -> Result<ShortcutAction, ShortcutError> {
        Self::ALL
            .into_iter()
            .find(|action| action.name() == name)
            .ok_or_else(|| ShortcutError::UnknownAction(name.to_string()))
    }

    fn default_keys(&self) -> &'static str {
        match self {
            ShortcutAction::Copy => "Mod+C",
            ShortcutAction::Rename => "Mod+E",
            ShortcutAction::Delete => "Mod+Backspace",
            ShortcutAction::SelectAll => "Mod+A",
        }
    }
}

/// Trait defining shortcut management operations.
pub trait ShortcutManagerTrait {
    fn register_shortcut(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError>;
    fn get_shortcut(&self, action: ShortcutAction) -> Option<&Chord>;
    fn list_shortcuts(&self) -> Vec<(ShortcutAction, String)>;
    fn reset_to_defaults(&mut self);
    fn has_conflict(&self, keys: &str, exclude_action: Option<ShortcutAction>) -> Option<ShortcutAction>;
    fn action_for(&self, event: &KeyEvent) -> Option<ShortcutAction>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutManager {
    bindings: HashMap<ShortcutAction, Chord>,
}

impl ShortcutManager {
    pub fn new() -> Self {
        Self {
            bindings: Self::default_bindings(),
        }
    }

    /// Defaults overlaid with `overrides` (action name to chord), as found in settings.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Result<Self, ShortcutError> {
        let mut manager = Self::new();
        let mut entries: Vec<(&String, &String)> = overrides.iter().collect();
        entries.sort();
        for (action, keys) in entries {
            manager.register_shortcut(action, keys)?;
        }
        Ok(manager)
    }

    fn default_bindings() -> HashMap<ShortcutAction, Chord> {
        ShortcutAction::ALL
            .into_iter()
            .filter_map(|action| {
                Chord::parse(action.default_keys())
                    .ok()
                    .map(|chord| (action, chord))
            })
            .collect()
    }

    /// Platform label for an action's chord.
    pub fn display(&self, action: ShortcutAction) -> Option<String> {
        self.bindings.get(&action).map(Chord::display)
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManagerTrait for ShortcutManager {
    fn register_shortcut(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError> {
        let action = ShortcutAction::from_name(action)?;
        if keys.trim().is_empty() {
            return Err(ShortcutError::InvalidKeys("Keys cannot be empty".to_string()));
        }
        let chord = Chord::parse(keys)?;

        if let Some(conflicting) = self.has_conflict(keys, Some(action)) {
            return Err(ShortcutError::Conflict(format!(
                "'{}' is already bound to '{}'",
                chord,
                conflicting.name()
            )));
        }

        self.bindings.insert(action, chord);
        Ok(())
    }

    fn get_shortcut(&self, action: ShortcutAction) -> Option<&Chord> {
        self.bindings.get(&action)
    }

    fn list_shortcuts(&self) -> Vec<(ShortcutAction, String)> {
        let mut list: Vec<(ShortcutAction, String)> = self
            .bindings
            .iter()
            .map(|(action, chord)| (*action, chord.to_string()))
            .collect();
        list.sort();
        list
    }

    fn reset_to_defaults(&mut self) {
        self.bindings = Self::default_bindings();
    }

    fn has_conflict(&self, keys: &str, exclude_action: Option<ShortcutAction>) -> Option<ShortcutAction> {
        let chord = Chord::parse(keys).ok()?;
        self.bindings
            .iter()
            .filter(|(action, _)| Some(**action) != exclude_action)
            .find(|(_, bound)| **bound == chord)
            .map(|(action, _)| *action)
    }

    fn action_for(&self, event: &KeyEvent) -> Option<ShortcutAction> {
        let mut actions: Vec<ShortcutAction> = self
            .bindings
            .iter()
            .filter(|(_, chord)| chord.matches(event))
            .map(|(action, _)| *action)
            .collect();
        actions.sort();
        actions.into_iter().next()
    }
}

/// What the dispatcher needs to know about the dashboard, refreshed after
/// every state change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardView {
    /// The filtered list as rendered.
    pub bookmarks: Vec<Bookmark>,
    pub highlighted: Option<usize>,
    pub hovered: Option<usize>,
    pub renaming: bool,
    pub selection_mode: bool,
}

/// Intent produced by one key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    HighlightNext,
    HighlightPrevious,
    Open(String),
    CopyToClipboard(String),
    StartRename(String),
    Delete(String),
    ToggleSelection(String),
    ExitSelection,
    SelectAll,
}

/// Routes one key event. `None` means the event is left to the focused element.
pub fn dispatch(shortcuts: &ShortcutManager, view: &KeyboardView, event: &KeyEvent) -> Option<Command> {
    if view.renaming || event.focus == FocusTarget::SearchInput {
        return None;
    }
    // Text fields keep everything except a bare Escape.
    if event.focus == FocusTarget::TextField
        && (event.key != Key::Escape || event.modifiers != Modifiers::default())
    {
        return None;
    }

    let action = shortcuts.action_for(event);

    if event.key == Key::Escape && view.selection_mode {
        return Some(Command::ExitSelection);
    }
    if action == Some(ShortcutAction::SelectAll) && view.selection_mode {
        return Some(Command::SelectAll);
    }
    match event.key {
        Key::ArrowDown => return Some(Command::HighlightNext),
        Key::ArrowUp => return Some(Command::HighlightPrevious),
        _ => {}
    }

    let index = resolve_active(view.hovered, view.highlighted, view.bookmarks.len())?;
    let active = view.bookmarks.get(index)?;

    if event.key == Key::Space && view.selection_mode {
        return Some(Command::ToggleSelection(active.id.clone()));
    }
    if event.key == Key::Enter {
        return Some(match &active.url {
            Some(url) => Command::Open(url.clone()),
            None => Command::CopyToClipboard(
                active.color.clone().unwrap_or_else(|| active.title.clone()),
            ),
        });
    }

    match action? {
        ShortcutAction::Copy => Some(Command::CopyToClipboard(active.clipboard_text().to_string())),
        ShortcutAction::Rename => Some(Command::StartRename(active.id.clone())),
        ShortcutAction::Delete => Some(Command::Delete(active.id.clone())),
        ShortcutAction::SelectAll => None,
    }
}

/// Registers the dispatcher once. The listener reads `shortcuts` and `view`
/// on every event and queues commands into `sink`.
pub fn attach_dispatcher(
    target: &mut EventTarget<KeyEvent>,
    shortcuts: LatestRef<ShortcutManager>,
    view: LatestRef<KeyboardView>,
    sink: LatestRef<VecDeque<Command>>,
) -> ListenerId {
    target.add_listener(move |event: &KeyEvent| {
        let command = shortcuts.with(|shortcuts| view.with(|view| dispatch(shortcuts, view, event)));
        if let Some(command) = command {
            sink.with_mut(|queue| queue.push_back(command));
        }
    })
}
