//! Name reconciliation: source-specific country/region spellings to the display namespace
//! shared by every level, and the exclusion filter for rows that must not be counted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Two-letter postal codes of US states, territories and DC.
pub const US_STATE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AS", "American Samoa"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("GU", "Guam"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("MP", "Northern Mariana Islands"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("PR", "Puerto Rico"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VI", "Virgin Islands"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

/// Full state name for a postal abbreviation.
pub fn state_name(abbreviation: &str) -> Option<&'static str> {
    let abbreviation = abbreviation.trim();
    US_STATE_ABBREVIATIONS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(abbreviation))
        .map(|(_, name)| *name)
}

/// Country code the wide source uses for the United States.
pub const US_COUNTRY: &str = "US";

/// A row's place after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub country: String,
    /// Empty when the row covers the whole country.
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileRules {
    /// Country spelling in the source -> display name.
    pub country_renames: BTreeMap<String, String>,
    /// Regions reported under a parent country that are shown as countries of their own.
    pub promoted_regions: Vec<String>,
    /// Rows whose country contains any of these are dropped.
    pub excluded_countries: Vec<String>,
    /// Rows whose country or region contains any of these are dropped (cruise ships).
    pub excluded_places: Vec<String>,
}

impl Default for ReconcileRules {
    fn default() -> Self {
        let country_renames = [
            ("Georgia", "Georgia (country)"),
            ("Korea, South", "South Korea"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
        Self {
            country_renames,
            promoted_regions: vec!["Hong Kong".to_string()],
            excluded_countries: vec!["China".to_string()],
            excluded_places: vec!["Diamond Princess".to_string()],
        }
    }
}

impl ReconcileRules {
    /// Normalize a raw (country, region) pair. `None` means the row is excluded.
    pub fn reconcile(&self, country: &str, region: &str) -> Option<Place> {
        let country = country.trim();
        let region = region.trim();

        let mut country = self
            .country_renames
            .get(country)
            .cloned()
            .unwrap_or_else(|| country.to_string());
        let mut region = region.to_string();

        if self.promoted_regions.iter().any(|r| *r == region) {
            country = std::mem::take(&mut region);
        }

        if self.excluded_countries.iter().any(|e| country.contains(e.as_str())) {
            return None;
        }
        if self
            .excluded_places
            .iter()
            .any(|e| country.contains(e.as_str()) || region.contains(e.as_str()))
        {
            return None;
        }

        if country == US_COUNTRY {
            if let Some(state) = expand_county_region(&region) {
                region = state.to_string();
            }
        }

        Some(Place { country, region })
    }
}

/// `"King County, WA"` -> `"Washington"`. Region strings without a trailing known
/// abbreviation are left to the caller.
fn expand_county_region(region: &str) -> Option<&'static str> {
    let (_, abbreviation) = region.rsplit_once(',')?;
    state_name(abbreviation)
}
