use crate::errors::{NavError, NavResult};
use crate::resources::NavConfig;
use bevy::prelude::*;
use std::fs;
use std::path::PathBuf;
use validator::Validate;

pub mod range_types;

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().and_then(|mut path| {
        path.push("skirmish");
        fs::create_dir_all(&path).ok()?;
        path.push("nav.toml");
        Some(path)
    })
}

/// Load the navigation config, falling back to defaults when the file is
/// missing, unreadable, or fails validation.
pub fn load_config() -> NavConfig {
    if let Some(config_path) = get_config_path() {
        if let Ok(contents) = fs::read_to_string(&config_path) {
            match toml::from_str::<NavConfig>(&contents) {
                Ok(config) => {
                    if let Err(errors) = config.settings.validate() {
                        warn!("Ignoring invalid nav config at {config_path:?}: {errors}");
                    } else {
                        return config;
                    }
                }
                Err(error) => {
                    warn!("Failed to parse nav config at {config_path:?}: {error}");
                }
            }
        }
    }
    NavConfig::default()
}

pub fn save_config(config: &NavConfig) -> NavResult<()> {
    config
        .settings
        .validate()
        .map_err(|errors| NavError::ConfigValidationFailed {
            reason: errors.to_string(),
        })?;
    let config_path = get_config_path().ok_or(NavError::ConfigDirNotFound)?;
    let contents = toml::to_string_pretty(config)?;
    fs::write(config_path, contents).map_err(NavError::ConfigWriteFailed)?;
    Ok(())
}
