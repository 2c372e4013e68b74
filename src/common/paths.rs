//! Platform configuration paths

use std::path::PathBuf;

/// Directory name used for configuration
const APP_NAME: &str = "checkout-test-cli";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/checkout-test-cli/`
/// - macOS: `~/Library/Application Support/checkout-test-cli/`
/// - Windows: `%APPDATA%\checkout-test-cli\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
