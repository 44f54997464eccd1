//! Cooldown-gated refresh when the window regains focus or becomes visible.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::cache::{CacheKey, QueryCache};
use crate::types::settings::RevalidationSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    Visible,
    Hidden,
}

/// Window-level events that may trigger a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Focus,
    VisibilityChange(VisibilityState),
}

#[derive(Debug, Clone)]
pub struct FocusRevalidator {
    cooldown: Duration,
    last_refresh: Instant,
    on_focus: bool,
    on_visibility: bool,
}

impl FocusRevalidator {
    /// The cooldown starts at construction, so the first focus right after
    /// load does not refetch.
    pub fn new(cooldown: Duration, now: Instant) -> Self {
        Self {
            cooldown,
            last_refresh: now,
            on_focus: true,
            on_visibility: true,
        }
    }

    pub fn from_settings(settings: &RevalidationSettings, now: Instant) -> Self {
        Self {
            on_focus: settings.on_focus,
            on_visibility: settings.on_visibility,
            ..Self::new(settings.cooldown(), now)
        }
    }

    /// Whether `event` at `now` should refresh. Accepting it restarts the cooldown.
    pub fn should_refresh(&mut self, event: WindowEvent, now: Instant) -> bool {
        let relevant = match event {
            WindowEvent::Focus => self.on_focus,
            WindowEvent::VisibilityChange(VisibilityState::Visible) => self.on_visibility,
            WindowEvent::VisibilityChange(VisibilityState::Hidden) => false,
        };
        if !relevant {
            return false;
        }
        if now.saturating_duration_since(self.last_refresh) < self.cooldown {
            debug!(?event, "refresh skipped, cooldown active");
            return false;
        }
        self.last_refresh = now;
        true
    }

    /// Invalidates the group list and the list of every cached group.
    /// Returns the keys that were marked.
    pub fn revalidate(&self, cache: &mut QueryCache) -> Vec<CacheKey> {
        let mut keys = vec![CacheKey::Groups];
        if let Some(groups) = cache.groups() {
            keys.extend(groups.iter().map(|g| CacheKey::bookmarks(Some(&g.id))));
        }
        keys.retain(|key| cache.invalidate(key));
        info!(keys = keys.len(), "revalidating after focus");
        keys
    }
}
