// Minimark platform paths
// Config and data directories per OS, overridable through environment variables.

use std::env;
use std::path::PathBuf;

/// Overrides the directory holding `settings.json`.
pub const CONFIG_DIR_ENV: &str = "MINIMARK_CONFIG_DIR";
/// Overrides the directory holding the reference server database.
pub const DATA_DIR_ENV: &str = "MINIMARK_DATA_DIR";

fn env_dir(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn home_dir() -> PathBuf {
    env_dir("HOME")
        .or_else(|| env_dir("USERPROFILE"))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

/// Returns the configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/minimark` or `~/.config/minimark`
/// - **macOS**: `~/Library/Application Support/Minimark`
/// - **Windows**: `%APPDATA%/Minimark`
pub fn get_config_dir() -> PathBuf {
    env_dir(CONFIG_DIR_ENV).unwrap_or_else(native_config_dir)
}

/// Returns the data directory.
///
/// - **Linux**: `$XDG_DATA_HOME/minimark` or `~/.local/share/minimark`
/// - **macOS**: `~/Library/Application Support/Minimark`
/// - **Windows**: `%APPDATA%/Minimark`
pub fn get_data_dir() -> PathBuf {
    env_dir(DATA_DIR_ENV).unwrap_or_else(native_data_dir)
}

#[cfg(target_os = "linux")]
fn native_config_dir() -> PathBuf {
    env_dir("XDG_CONFIG_HOME")
        .unwrap_or_else(|| home_dir().join(".config"))
        .join("minimark")
}

#[cfg(target_os = "linux")]
fn native_data_dir() -> PathBuf {
    env_dir("XDG_DATA_HOME")
        .unwrap_or_else(|| home_dir().join(".local").join("share"))
        .join("minimark")
}

#[cfg(target_os = "macos")]
fn native_config_dir() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join("Minimark")
}

#[cfg(target_os = "macos")]
fn native_data_dir() -> PathBuf {
    native_config_dir()
}

#[cfg(target_os = "windows")]
fn native_config_dir() -> PathBuf {
    env_dir("APPDATA")
        .unwrap_or_else(|| home_dir().join("AppData").join("Roaming"))
        .join("Minimark")
}

#[cfg(target_os = "windows")]
fn native_data_dir() -> PathBuf {
    native_config_dir()
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn native_config_dir() -> PathBuf {
    home_dir().join(".minimark")
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn native_data_dir() -> PathBuf {
    home_dir().join(".minimark")
}
