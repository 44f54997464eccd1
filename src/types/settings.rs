use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::group::DEFAULT_GROUP_PALETTE;

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardSettings {
    pub cache: CacheSettings,
    pub revalidation: RevalidationSettings,
    pub search: SearchSettings,
    pub groups: GroupSettings,
    pub server: ServerSettings,
    /// Overrides for keyboard shortcuts, action name to chord (e.g. `"copy": "Mod+C"`).
    pub shortcuts: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheSettings {
    /// Age after which a cached list is refetched on next read.
    pub stale_time_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { stale_time_secs: 60 }
    }
}

impl CacheSettings {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RevalidationSettings {
    /// Minimum gap between two focus/visibility triggered refreshes.
    pub cooldown_secs: u64,
    pub on_focus: bool,
    pub on_visibility: bool,
}

impl Default for RevalidationSettings {
    fn default() -> Self {
        Self {
            cooldown_secs: 30,
            on_focus: true,
            on_visibility: true,
        }
    }
}

impl RevalidationSettings {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroupSettings {
    pub palette: Vec<String>,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            palette: DEFAULT_GROUP_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of an HTTP RPC gateway; `None` means the in-process server.
    pub base_url: Option<String>,
}
