use crate::error::ConfigError;
use crate::units::{UnitsSettings, UnitsSystem};
use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub app: AppSection,
    pub units: UnitsSection,
    pub view: ViewSection,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// The version field gates config migration when the format changes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSection {
    pub version: String,
}

impl AppSection {
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    pub fn is_supported_version(&self) -> bool {
        self.version == "1.0.0"
    }

    pub fn needs_migration(&self) -> bool {
        self.version != Self::CURRENT_VERSION
    }

    pub fn migration_strategy(&self) -> MigrationStrategy {
        match self.version.as_str() {
            "1.0.0" => MigrationStrategy::None,
            // Known older versions get an Upgrade arm here once they exist.
            _ => MigrationStrategy::Recreate,
        }
    }
}

impl Default for AppSection {
    fn default() -> Self {
        AppSection {
            version: Self::CURRENT_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MigrationStrategy {
    None,
    Upgrade(String),
    Recreate,
}

/// Persisted units preferences, mirrored into [`UnitsSettings`] per rebuild.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UnitsSection {
    pub energy_units: String,
    pub power_units: String,
    pub units_system: UnitsSystem,
    pub rate_to_energy: bool,
}

impl Default for UnitsSection {
    fn default() -> Self {
        UnitsSection {
            energy_units: "kWh".to_string(),
            power_units: "kW".to_string(),
            units_system: UnitsSystem::Si,
            rate_to_energy: false,
        }
    }
}

impl UnitsSection {
    pub fn units_settings(&self) -> UnitsSettings {
        UnitsSettings {
            rate_to_energy: self.rate_to_energy,
            units_system: self.units_system,
            energy_units: self.energy_units.clone(),
            power_units: self.power_units.clone(),
        }
    }
}

/// Last state of the variable view: layout toggles plus the reopened files
/// and the labels of expanded tree nodes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ViewSection {
    pub tree: bool,
    pub interval: Option<String>,
    pub all_files: bool,
    pub totals: bool,
    pub opened_files: Vec<String>,
    pub expanded: Vec<String>,
}

impl Default for ViewSection {
    fn default() -> Self {
        ViewSection {
            tree: true,
            interval: None,
            all_files: false,
            totals: false,
            opened_files: Vec::new(),
            expanded: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = config.to_toml_string().unwrap();
        let parsed = AppConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_default_round_trips_through_json() {
        let config = AppConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_units_section_to_settings() {
        let section = UnitsSection {
            energy_units: "kBtu".to_string(),
            power_units: "Btu/h".to_string(),
            units_system: UnitsSystem::Ip,
            rate_to_energy: true,
        };
        let settings = section.units_settings();
        assert!(settings.rate_to_energy);
        assert_eq!(settings.units_system, UnitsSystem::Ip);
        assert_eq!(settings.energy_units, "kBtu");
    }

    #[test]
    fn test_unknown_version_recreates() {
        let section = AppSection { version: "0.3.7".to_string() };
        assert!(section.needs_migration());
        assert_eq!(section.migration_strategy(), MigrationStrategy::Recreate);

        let current = AppSection::default();
        assert!(!current.needs_migration());
        assert_eq!(current.migration_strategy(), MigrationStrategy::None);
    }

    #[test]
    fn test_units_system_serializes_as_upper_case() {
        let text = toml::to_string(&UnitsSection::default()).unwrap();
        assert!(text.contains("units_system = \"SI\""));
    }
}
