use shared::units::{self, UnitsSettings};
use shared::{HeaderVariable, ProxyVariable};

/// Project header variables into their display form.
///
/// One proxy per input, in input order. Only units change: a rate unit is
/// first rewritten to its energy counterpart when `rate_to_energy` is set
/// (independently of the units system), then exactly one branch of the
/// conversion pipeline applies.
pub fn project(variables: &[HeaderVariable], settings: &UnitsSettings) -> Vec<ProxyVariable> {
    variables
        .iter()
        .map(|variable| {
            let source = if settings.rate_to_energy {
                units::rate_to_energy_units(&variable.units)
            } else {
                &variable.units
            };
            ProxyVariable {
                key: variable.key.clone(),
                name: variable.name.clone(),
                units: units::convert_units(source, settings),
            }
        })
        .collect()
}
