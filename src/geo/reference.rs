//! Static per-place reference data: population, hospital beds, county FIPS -> metro area.
//!
//! Loaded once from JSON and passed explicitly to the pipeline and the views. A place absent
//! from a table is simply not eligible for the views that need it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_POPULATION_PATH: &str = "data/reference/population.json";
pub const DEFAULT_BEDS_PATH: &str = "data/reference/beds.json";
pub const DEFAULT_CBSA_PATH: &str = "data/reference/cbsa.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencePaths {
    pub population: String,
    pub beds: String,
    pub cbsa: String,
}

impl Default for ReferencePaths {
    fn default() -> Self {
        Self {
            population: DEFAULT_POPULATION_PATH.to_string(),
            beds: DEFAULT_BEDS_PATH.to_string(),
            cbsa: DEFAULT_CBSA_PATH.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("failed to read reference table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse reference table {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTables {
    population: HashMap<String, f64>,
    beds: HashMap<String, f64>,
    /// County FIPS code -> metro area (CBSA) name.
    cbsa: HashMap<u32, String>,
}

impl ReferenceTables {
    pub fn new(
        population: HashMap<String, f64>,
        beds: HashMap<String, f64>,
        cbsa: HashMap<u32, String>,
    ) -> Self {
        Self {
            population,
            beds,
            cbsa,
        }
    }

    pub fn load(paths: &ReferencePaths) -> Result<Self, ReferenceError> {
        let population: HashMap<String, f64> = read_json(&paths.population)?;
        let beds: HashMap<String, f64> = read_json(&paths.beds)?;
        let raw_cbsa: HashMap<String, String> = read_json(&paths.cbsa)?;

        let mut cbsa = HashMap::with_capacity(raw_cbsa.len());
        for (code, metro) in raw_cbsa {
            match code.trim().parse::<u32>() {
                Ok(code) => {
                    cbsa.insert(code, metro);
                }
                Err(_) => warn!(code = %code, "skipping non-numeric FIPS code in metro table"),
            }
        }

        info!(
            population = population.len(),
            beds = beds.len(),
            counties = cbsa.len(),
            "loaded reference tables"
        );
        Ok(Self::new(population, beds, cbsa))
    }

    pub fn population(&self, place: &str) -> Option<f64> {
        self.population.get(place).copied()
    }

    pub fn beds(&self, place: &str) -> Option<f64> {
        self.beds.get(place).copied()
    }

    pub fn metro_area(&self, fips: u32) -> Option<&str> {
        self.cbsa.get(&fips).map(String::as_str)
    }
}

fn read_json<T>(path: &str) -> Result<T, ReferenceError>
where
    T: serde::de::DeserializeOwned,
{
    let raw = fs::read_to_string(Path::new(path)).map_err(|source| ReferenceError::Read {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ReferenceError::Parse {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_tables_load() {
        if !Path::new(DEFAULT_POPULATION_PATH).exists() {
            eprintln!("Skipping: {DEFAULT_POPULATION_PATH} not found");
            return;
        }
        let tables = ReferenceTables::load(&ReferencePaths::default()).unwrap();
        assert!(tables.population("Oregon").unwrap() > 1_000_000.0);
        assert!(tables.beds("Multnomah, Oregon").is_some());
        assert_eq!(tables.metro_area(46013), Some("Aberdeen, SD"));
    }

    #[test]
    fn missing_table_is_a_read_error() {
        let paths = ReferencePaths {
            population: "does/not/exist.json".to_string(),
            ..ReferencePaths::default()
        };
        assert!(matches!(
            ReferenceTables::load(&paths),
            Err(ReferenceError::Read { .. })
        ));
    }
}
