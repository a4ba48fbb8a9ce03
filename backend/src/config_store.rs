use shared::{AppConfig, ConfigError, MigrationStrategy};
use std::path::{Path, PathBuf};

/// Location of the configuration file inside the platform config directory.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("esoview").join("config.toml"))
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Read a config file, falling back to defaults when it does not exist and
/// recreating it when its version is unknown. A file that exists but fails
/// to parse is an error; silently discarding user settings over a typo
/// would be worse than failing.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(error) => return Err(error.into()),
    };

    let config = AppConfig::from_toml_str(&content)?;
    match config.app.migration_strategy() {
        MigrationStrategy::None => Ok(config),
        MigrationStrategy::Upgrade(step) => {
            log::info!("migrating configuration: {step}");
            Ok(config)
        }
        MigrationStrategy::Recreate => {
            log::warn!(
                "configuration version '{}' is unknown, starting from defaults",
                config.app.version,
            );
            Ok(AppConfig::default())
        }
    }
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, config.to_toml_string()?)?;
    Ok(())
}
