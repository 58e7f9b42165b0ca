//! Configuration file loading

use std::path::Path;

use super::{
    ConfigError,
    TranslationSettings,
};

/// Name of the configuration file looked up by [`load_from_dir`].
pub const CONFIG_FILE_NAME: &str = ".translations.json";

/// Load settings from `dir`.
///
/// # Returns
/// - `Ok(Some(settings))`: configuration file found and parsed
/// - `Ok(None)`: no configuration file in `dir`
/// - `Err(ConfigError)`: read or parse error
///
/// # Errors
/// - File read error
/// - JSON parse error
pub fn load_from_dir(dir: &Path) -> Result<Option<TranslationSettings>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    load_from_file(&config_path).map(Some)
}

/// Load settings from an explicit file.
///
/// # Errors
/// - File read error
/// - JSON parse error
pub fn load_from_file(path: &Path) -> Result<TranslationSettings, ConfigError> {
    tracing::debug!("Loading configuration from: {:?}", path);

    let content = std::fs::read_to_string(path)?;
    let settings: TranslationSettings = serde_json::from_str(&content)?;

    Ok(settings)
}
