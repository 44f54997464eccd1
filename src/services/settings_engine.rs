// Minimark Settings Engine
// Loads, saves and edits dashboard settings stored as JSON in the platform config dir.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::DashboardSettings;

pub const SETTINGS_FILE: &str = "settings.json";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<DashboardSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &DashboardSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine that persists [`DashboardSettings`] as pretty JSON.
pub struct SettingsEngine {
    config_path: String,
    settings: DashboardSettings,
}

impl SettingsEngine {
    /// Uses `path_override` when given, otherwise `<config dir>/settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            platform::get_config_dir()
                .join(SETTINGS_FILE)
                .to_string_lossy()
                .to_string()
        });

        Self {
            config_path,
            settings: DashboardSettings::default(),
        }
    }
}

/// Rejects settings that would leave the dashboard unusable.
fn validate(settings: &DashboardSettings) -> Result<(), SettingsError> {
    if settings.groups.palette.is_empty() {
        return Err(SettingsError::InvalidValue(
            "groups.palette must contain at least one color".to_string(),
        ));
    }
    if settings.cache.stale_time_secs == 0 {
        return Err(SettingsError::InvalidValue(
            "cache.stale_time_secs must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Walks `parts` through nested objects and replaces the leaf.
fn set_path(root: &mut Value, parts: &[&str], value: Value, key: &str) -> Result<(), SettingsError> {
    let Some((leaf, parents)) = parts.split_last() else {
        return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
    };

    let mut current = root;
    for part in parents {
        current = current
            .get_mut(*part)
            .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;
    }

    match current {
        Value::Object(map) => {
            // Shortcut overrides are an open map; every other section is fixed.
            if !map.contains_key(*leaf) && parents != ["shortcuts"] {
                return Err(SettingsError::InvalidKey(format!(
                    "Key '{}' not found in settings",
                    key
                )));
            }
            map.insert(leaf.to_string(), value);
            Ok(())
        }
        _ => Err(SettingsError::InvalidKey(format!(
            "Cannot navigate to key '{}': intermediate value is not an object",
            key
        ))),
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Returns defaults when the file does not exist; a malformed file is an error.
    fn load(&mut self) -> Result<DashboardSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = DashboardSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: DashboardSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        validate(&settings)?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn get_settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Updates one setting by dot path (`"search.debounce_ms"`,
    /// `"shortcuts.copy"`) and persists the result.
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }
        let parts: Vec<&str> = key.split('.').collect();

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        set_path(&mut json_value, &parts, value, key)?;

        let updated: DashboardSettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        validate(&updated)?;

        self.settings = updated;
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = DashboardSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
