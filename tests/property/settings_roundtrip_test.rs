//! Property-based tests for DashboardSettings persistence.
//!
//! Settings written through the engine must come back unchanged, and any
//! shortcut override map of valid, distinct chords must build a working
//! shortcut table.

use minimark::managers::shortcut_manager::{ShortcutManager, ShortcutManagerTrait};
use minimark::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use minimark::types::settings::{
    CacheSettings, DashboardSettings, GroupSettings, RevalidationSettings, SearchSettings,
    ServerSettings,
};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use tempfile::TempDir;

// --- Arbitrary strategies for the settings sections ---

fn arb_revalidation() -> impl Strategy<Value = RevalidationSettings> {
    (0u64..=600, any::<bool>(), any::<bool>()).prop_map(|(cooldown_secs, on_focus, on_visibility)| {
        RevalidationSettings {
            cooldown_secs,
            on_focus,
            on_visibility,
        }
    })
}

fn arb_palette() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("#[0-9A-F]{6}", 1..=13)
}

fn arb_server() -> impl Strategy<Value = ServerSettings> {
    proptest::option::of("https?://[a-z]{3,10}\\.[a-z]{2,4}(:[0-9]{2,4})?")
        .prop_map(|base_url| ServerSettings { base_url })
}

fn arb_shortcuts() -> impl Strategy<Value = HashMap<String, String>> {
    proptest::collection::hash_map("[a-z_]{2,15}", "(Mod|Shift|Alt)\\+[A-Z]", 0..=6)
}

fn arb_settings() -> impl Strategy<Value = DashboardSettings> {
    (
        1u64..=3600,
        arb_revalidation(),
        0u64..=5000,
        arb_palette(),
        arb_server(),
        arb_shortcuts(),
    )
        .prop_map(
            |(stale_time_secs, revalidation, debounce_ms, palette, server, shortcuts)| {
                DashboardSettings {
                    cache: CacheSettings { stale_time_secs },
                    revalidation,
                    search: SearchSettings { debounce_ms },
                    groups: GroupSettings { palette },
                    server,
                    shortcuts,
                }
            },
        )
}

/// Distinct single-letter chords for each rebindable action.
fn arb_valid_overrides() -> impl Strategy<Value = HashMap<String, String>> {
    proptest::sample::subsequence(('B'..='Z').collect::<Vec<char>>(), 4)
        .prop_shuffle()
        .prop_map(|letters| {
            ["copy", "rename", "delete", "select_all"]
                .iter()
                .zip(letters)
                .map(|(action, letter)| (action.to_string(), format!("Mod+Shift+{}", letter)))
                .collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Whatever the engine saves, a fresh engine loads back verbatim.
    #[test]
    fn settings_survive_save_and_load(settings in arb_settings()) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json").to_string_lossy().to_string();

        let json = serde_json::to_string(&settings).unwrap();
        std::fs::write(&path, json).unwrap();

        let mut engine = SettingsEngine::new(Some(path.clone()));
        let loaded = engine.load().unwrap();
        prop_assert_eq!(&loaded, &settings);

        engine.save().unwrap();
        let mut reloaded = SettingsEngine::new(Some(path));
        prop_assert_eq!(reloaded.load().unwrap(), settings);
    }

    /// A single dot-path write changes exactly that field.
    #[test]
    fn set_value_touches_one_field(settings in arb_settings(), debounce_ms in 0u64..=5000) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json").to_string_lossy().to_string();
        std::fs::write(&path, serde_json::to_string(&settings).unwrap()).unwrap();

        let mut engine = SettingsEngine::new(Some(path));
        engine.load().unwrap();
        engine.set_value("search.debounce_ms", json!(debounce_ms)).unwrap();

        let expected = DashboardSettings {
            search: SearchSettings { debounce_ms },
            ..settings
        };
        prop_assert_eq!(engine.get_settings(), &expected);
    }

    /// Valid, conflict-free overrides always build and are all bound.
    #[test]
    fn valid_overrides_build_a_shortcut_table(overrides in arb_valid_overrides()) {
        let manager = ShortcutManager::with_overrides(&overrides).unwrap();
        let listed: HashMap<String, String> = manager
            .list_shortcuts()
            .into_iter()
            .map(|(action, keys)| (action.name().to_string(), keys))
            .collect();
        prop_assert_eq!(listed, overrides);
    }
}
