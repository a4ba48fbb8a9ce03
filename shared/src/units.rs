//! Display-unit conversion.
//!
//! All conversions here rewrite unit *labels* only; scaling of the underlying
//! values is owned by the reader library. Unknown units pass through
//! unchanged, which keeps intentionally unitless outputs intact.

use serde::{Serialize, Deserialize};

pub const SI_ENERGY_UNITS: [&str; 6] = ["Wh", "kWh", "MWh", "J", "MJ", "GJ"];
pub const IP_ENERGY_UNITS: [&str; 3] = ["Btu", "kBtu", "MBtu"];
pub const SI_POWER_UNITS: [&str; 3] = ["W", "kW", "MW"];
pub const IP_POWER_UNITS: [&str; 4] = ["Btu/h", "kBtu/h", "MBtu/h", "W"];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitsSystem {
    #[default]
    #[serde(rename = "SI")]
    Si,
    #[serde(rename = "IP")]
    Ip,
}

/// Units preferences for one view rebuild. Compared by value; any change
/// invalidates every cached proxy variable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnitsSettings {
    pub rate_to_energy: bool,
    pub units_system: UnitsSystem,
    pub energy_units: String,
    pub power_units: String,
}

impl Default for UnitsSettings {
    fn default() -> Self {
        UnitsSettings {
            rate_to_energy: false,
            units_system: UnitsSystem::Si,
            energy_units: "kWh".to_string(),
            power_units: "kW".to_string(),
        }
    }
}

impl UnitsSettings {
    /// The identity settings: every source unit is displayed as-is.
    pub fn source() -> Self {
        UnitsSettings {
            rate_to_energy: false,
            units_system: UnitsSystem::Si,
            energy_units: "J".to_string(),
            power_units: "W".to_string(),
        }
    }
}

/// Rewrite a rate unit to its energy counterpart. Applied before any other
/// conversion and regardless of the selected units system.
pub fn rate_to_energy_units(units: &str) -> &str {
    match units {
        "W" => "J",
        "W/m2" => "J/m2",
        _ => units,
    }
}

/// Replace an energy unit with the configured one. Area-qualified source
/// units keep their qualifier, spelled "-ft2" when the target is an Imperial
/// unit and "/m2" otherwise.
pub fn convert_energy(units: &str, energy_units: &str) -> String {
    if units == "J/m2" {
        if energy_units.to_lowercase().contains("btu") {
            format!("{energy_units}-ft2")
        } else {
            format!("{energy_units}/m2")
        }
    } else {
        energy_units.to_string()
    }
}

/// Replace a power unit with the configured one; same area rule as energy.
pub fn convert_power(units: &str, power_units: &str) -> String {
    if units == "W/m2" {
        if power_units.to_lowercase().contains("btu/h") {
            format!("{power_units}-ft2")
        } else {
            format!("{power_units}/m2")
        }
    } else {
        power_units.to_string()
    }
}

/// SI to IP symbol table. Units without an entry are returned unchanged.
pub fn to_ip(units: &str) -> &str {
    match units {
        "m" => "ft",
        "m2" => "ft2",
        "m3" => "ft3",
        "deltaC" => "deltaF",
        "C" => "F",
        "K" => "F",
        "m/s" => "ft/min",
        "kg" => "lb",
        "kg/s" => "lb/min",
        "m3/s" => "g/min",
        "Pa" => "lbsf/ft2",
        "J/kg" => "btu/lb",
        "kg/m3" => "lb/f3",
        "W/m2-K" => "btu/hr-ft2-F",
        "J/kg-K" => "btu/lb-F",
        "W/m-K" => "btu/hr-ft-F",
        "m2/s" => "ft2/s",
        "m2-K/W" => "F-ft-hr/btu",
        _ => {
            log::warn!("cannot convert '{units}' to IP, original units kept");
            units
        }
    }
}

/// Produce the display form of a unit under the given settings.
///
/// Branches are exclusive and evaluated in a fixed order; the first match
/// wins. An empty unit always displays as "-".
pub fn convert_units(units: &str, settings: &UnitsSettings) -> String {
    if units.is_empty() {
        "-".to_string()
    } else if (units == "W" || units == "W/m2") && settings.power_units != "W" {
        convert_power(units, &settings.power_units)
    } else if (units == "J" || units == "J/m2") && settings.energy_units != "J" {
        convert_energy(units, &settings.energy_units)
    } else if settings.units_system == UnitsSystem::Ip {
        to_ip(units).to_string()
    } else {
        units.to_string()
    }
}

/// Check that all units match; aggregation across mixed units is refused.
pub fn verify_units<'a>(units: &[&'a str]) -> Option<&'a str> {
    match units.split_first() {
        Some((first, rest)) if rest.iter().all(|u| u == first) => Some(first),
        _ => None,
    }
}
