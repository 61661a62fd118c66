//! Geographic aggregation: reference tables, metro re-bucketing and the assembly of one
//! merged dataset per metric for every geographic level.

pub mod cbsa;
pub mod pipeline;
pub mod reference;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::engine::Dataset;

pub use pipeline::{build_levels, Levels, PipelineError, RawSources, SourcePaths, SourceSnapshot};
pub use reference::{ReferencePaths, ReferenceTables};

/// Geographic granularity a chart can be drawn at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    /// International places by region where one is reported, otherwise by country, with US
    /// data by state.
    RegionOrCountry,
    Country,
    State,
    County,
    /// US metro areas built from counties.
    Cbsa,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::RegionOrCountry,
        Level::Country,
        Level::State,
        Level::County,
        Level::Cbsa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegionOrCountry => "region-or-country",
            Self::Country => "country",
            Self::State => "state",
            Self::County => "county",
            Self::Cbsa => "cbsa",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RegionOrCountry => "Country or Region",
            Self::Country => "Country",
            Self::State => "US States",
            Self::County => "US County",
            Self::Cbsa => "US Cities",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "region-or-country" | "byregionorcountry" => Ok(Self::RegionOrCountry),
            "country" | "bycountry" => Ok(Self::Country),
            "state" | "bystate" => Ok(Self::State),
            "county" | "bycounty" => Ok(Self::County),
            "cbsa" | "bycbsa" | "metro" => Ok(Self::Cbsa),
            other => Err(format!("unknown level '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    Confirmed,
    Deaths,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Deaths => "deaths",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cumulative confirmed cases and deaths for one level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSet {
    pub confirmed: Dataset,
    pub deaths: Dataset,
}

impl MetricSet {
    pub fn get(&self, metric: Metric) -> &Dataset {
        match metric {
            Metric::Confirmed => &self.confirmed,
            Metric::Deaths => &self.deaths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_round_trip() {
        for level in Level::ALL {
            assert_eq!(level.as_str().parse::<Level>(), Ok(level));
        }
        assert_eq!("byCBSA".parse::<Level>(), Ok(Level::Cbsa));
        assert!("planet".parse::<Level>().is_err());
    }
}
