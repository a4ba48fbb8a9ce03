use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

/// Reporting frequency of an output variable.
///
/// The set is fixed by the file format; intervals absent from a file are
/// simply not present in its header.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Timestep,
    Hourly,
    Daily,
    Monthly,
    Annual,
    Runperiod,
}

impl Interval {
    pub const ALL: [Interval; 6] = [
        Interval::Timestep,
        Interval::Hourly,
        Interval::Daily,
        Interval::Monthly,
        Interval::Annual,
        Interval::Runperiod,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Timestep => "timestep",
            Interval::Hourly => "hourly",
            Interval::Daily => "daily",
            Interval::Monthly => "monthly",
            Interval::Annual => "annual",
            Interval::Runperiod => "runperiod",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown interval: '{0}'")]
pub struct ParseIntervalError(String);

impl FromStr for Interval {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|interval| interval.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseIntervalError(s.to_string()))
    }
}

/// Identity of one output time series.
///
/// Equality and hashing cover all four fields. The numeric id a variable gets
/// inside a header is deliberately not part of this identity; ids are minted
/// anew by rename and aggregation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub interval: Interval,
    pub key: String,
    pub name: String,
    pub units: String,
}

impl Variable {
    pub fn new(interval: Interval, key: &str, name: &str, units: &str) -> Self {
        Variable {
            interval,
            key: key.to_string(),
            name: name.to_string(),
            units: units.to_string(),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {} | {}", self.interval, self.key, self.name, self.units)
    }
}

/// Stored form of a variable inside a file header, keyed externally by
/// interval and numeric id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderVariable {
    pub key: String,
    pub name: String,
    pub units: String,
}

impl HeaderVariable {
    pub fn new(key: &str, name: &str, units: &str) -> Self {
        HeaderVariable {
            key: key.to_string(),
            name: name.to_string(),
            units: units.to_string(),
        }
    }

    pub fn to_variable(&self, interval: Interval) -> Variable {
        Variable {
            interval,
            key: self.key.clone(),
            name: self.name.clone(),
            units: self.units.clone(),
        }
    }
}

impl From<Variable> for HeaderVariable {
    fn from(variable: Variable) -> Self {
        HeaderVariable {
            key: variable.key,
            name: variable.name,
            units: variable.units,
        }
    }
}

/// Display projection of a header variable: same key and name, units replaced
/// by their converted representation. Rebuilt from scratch on every view
/// rebuild, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyVariable {
    pub key: String,
    pub name: String,
    pub units: String,
}
