//! Source attribution shown next to each chart.

use serde::Serialize;

use crate::geo::Level;
use crate::views::Family;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attribution {
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

const COUNTY_BEDS_NOTE: &str = "Beds per thousand assumed to be the same at state and county level";

pub fn attribution(level: Level, family: Family) -> Attribution {
    let (source, note) = match (level, family) {
        (Level::Country, Family::Counts) => ("JHU CSSE", None),
        (Level::Country, _) => ("JHU CSSE, World Bank", None),
        (Level::RegionOrCountry, Family::Counts) => ("JHU CSSE, New York Times", None),
        (Level::RegionOrCountry, Family::PerMillion) => {
            ("JHU CSSE, New York Times, World Bank, Census", None)
        }
        (Level::RegionOrCountry, Family::PerBed) => (
            "JHU CSSE, New York Times, World Bank, Census, Kaiser Family Foundation",
            None,
        ),
        (Level::State | Level::County | Level::Cbsa, Family::Counts) => ("New York Times", None),
        (Level::State | Level::County | Level::Cbsa, Family::PerMillion) => {
            ("New York Times, Census", None)
        }
        (Level::State, Family::PerBed) => {
            ("New York Times, Census, Kaiser Family Foundation", None)
        }
        (Level::County | Level::Cbsa, Family::PerBed) => (
            "New York Times, Census, Kaiser Family Foundation",
            Some(COUNTY_BEDS_NOTE),
        ),
    };
    Attribution { source, note }
}
