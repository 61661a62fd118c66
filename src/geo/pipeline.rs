//! Raw source tables to one merged dataset per metric per level.
//!
//! Parse each source, reconcile names, re-bucket counties into metro areas, then merge into
//! each level's key space with accumulate-on-collision. The result is a pure function of the
//! raw tables, the reference tables and the reconciliation rules.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::engine::{Dataset, Series, SeriesError, SeriesResult};
use crate::geo::cbsa::{county_level, rebucket_counties};
use crate::geo::reference::ReferenceTables;
use crate::geo::{Level, Metric, MetricSet};
use crate::ingest::frame::DayFrame;
use crate::ingest::reconcile::US_COUNTRY;
use crate::ingest::{jhu, nyt, split_key, IngestError, RawTable, ReconcileRules};

pub const DEFAULT_WIDE_CONFIRMED_PATH: &str =
    "data/sources/time_series_covid19_confirmed_global.csv";
pub const DEFAULT_WIDE_DEATHS_PATH: &str = "data/sources/time_series_covid19_deaths_global.csv";
pub const DEFAULT_US_STATES_PATH: &str = "data/sources/us-states.csv";
pub const DEFAULT_US_COUNTIES_PATH: &str = "data/sources/us-counties.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePaths {
    pub wide_confirmed: String,
    pub wide_deaths: String,
    pub us_states: Option<String>,
    pub us_counties: Option<String>,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            wide_confirmed: DEFAULT_WIDE_CONFIRMED_PATH.to_string(),
            wide_deaths: DEFAULT_WIDE_DEATHS_PATH.to_string(),
            us_states: Some(DEFAULT_US_STATES_PATH.to_string()),
            us_counties: Some(DEFAULT_US_COUNTIES_PATH.to_string()),
        }
    }
}

/// Parsed-but-untyped rows of every source in one snapshot.
#[derive(Debug, Clone, Default)]
pub struct RawSources {
    pub wide_confirmed: RawTable,
    pub wide_deaths: RawTable,
    pub us_states: Option<RawTable>,
    pub us_counties: Option<RawTable>,
}

impl RawSources {
    /// The wide files are required. A configured US file that does not exist is skipped
    /// with a warning and the levels built from it are left out.
    pub fn load(paths: &SourcePaths) -> Result<Self, IngestError> {
        Ok(Self {
            wide_confirmed: RawTable::from_path(&paths.wide_confirmed)?,
            wide_deaths: RawTable::from_path(&paths.wide_deaths)?,
            us_states: load_optional(paths.us_states.as_deref())?,
            us_counties: load_optional(paths.us_counties.as_deref())?,
        })
    }
}

fn load_optional(path: Option<&str>) -> Result<Option<RawTable>, IngestError> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !Path::new(path).exists() {
        warn!(path, "optional source not found, skipping");
        return Ok(None);
    }
    RawTable::from_path(path).map(Some)
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("failed to merge {metric} series for level {level}: {source}")]
    Merge {
        level: Level,
        metric: Metric,
        #[source]
        source: SeriesError,
    },
}

/// Calendar span of one source, for "data as of" reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSnapshot {
    pub source: &'static str,
    #[serde(flatten)]
    pub frame: DayFrame,
}

/// The published per-level datasets. Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct Levels {
    sets: BTreeMap<Level, MetricSet>,
    snapshot: Vec<SourceSnapshot>,
}

impl Levels {
    pub fn new(sets: BTreeMap<Level, MetricSet>, snapshot: Vec<SourceSnapshot>) -> Self {
        Self { sets, snapshot }
    }

    pub fn get(&self, level: Level) -> Option<&MetricSet> {
        self.sets.get(&level)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, &MetricSet)> + '_ {
        self.sets.iter().map(|(level, set)| (*level, set))
    }

    pub fn snapshot(&self) -> &[SourceSnapshot] {
        &self.snapshot
    }

    /// Names of US states, used to restrict highlights to states.
    pub fn state_names(&self) -> HashSet<String> {
        self.get(Level::State)
            .map(|set| set.confirmed.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

pub fn build_levels(
    sources: &RawSources,
    reference: &ReferenceTables,
    rules: &ReconcileRules,
) -> Result<Levels, PipelineError> {
    let confirmed = jhu::parse_wide(&sources.wide_confirmed, rules)?;
    let deaths = jhu::parse_wide(&sources.wide_deaths, rules)?;
    let states = sources.us_states.as_ref().map(nyt::parse_states).transpose()?;
    let counties = sources
        .us_counties
        .as_ref()
        .map(nyt::parse_counties)
        .transpose()?;

    let wide = |metric: Metric| match metric {
        Metric::Confirmed => &confirmed.dataset,
        Metric::Deaths => &deaths.dataset,
    };

    let mut sets = BTreeMap::new();
    sets.insert(
        Level::Country,
        assemble(Level::Country, |metric| by_country(wide(metric)))?,
    );
    sets.insert(
        Level::RegionOrCountry,
        assemble(Level::RegionOrCountry, |metric| {
            by_region_or_country(wide(metric), states.as_ref().map(|s| metric_of(s, metric)))
        })?,
    );

    let mut snapshot = vec![SourceSnapshot {
        source: "wide",
        frame: confirmed.frame,
    }];

    if let Some(states) = &states {
        sets.insert(
            Level::State,
            MetricSet {
                confirmed: states.confirmed.clone(),
                deaths: states.deaths.clone(),
            },
        );
        snapshot.push(SourceSnapshot {
            source: "us-states",
            frame: states.frame,
        });
    }

    if let Some(counties) = &counties {
        sets.insert(
            Level::County,
            assemble(Level::County, |metric| county_level(metric_of(counties, metric)))?,
        );
        sets.insert(
            Level::Cbsa,
            assemble(Level::Cbsa, |metric| {
                rebucket_counties(metric_of(counties, metric), reference)
            })?,
        );
        snapshot.push(SourceSnapshot {
            source: "us-counties",
            frame: counties.frame,
        });
    }

    for (level, set) in &sets {
        info!(
            level = %level,
            confirmed = set.confirmed.len(),
            deaths = set.deaths.len(),
            "built level"
        );
    }
    Ok(Levels::new(sets, snapshot))
}

fn metric_of(source: &nyt::LongSource, metric: Metric) -> &Dataset {
    match metric {
        Metric::Confirmed => &source.confirmed,
        Metric::Deaths => &source.deaths,
    }
}

fn assemble<F>(level: Level, build: F) -> Result<MetricSet, PipelineError>
where
    F: Fn(Metric) -> SeriesResult<Dataset>,
{
    let merge_error = |metric: Metric| move |source: SeriesError| PipelineError::Merge {
        level,
        metric,
        source,
    };
    Ok(MetricSet {
        confirmed: build(Metric::Confirmed).map_err(merge_error(Metric::Confirmed))?,
        deaths: build(Metric::Deaths).map_err(merge_error(Metric::Deaths))?,
    })
}

fn add(existing: &Series, incoming: &Series) -> SeriesResult<Series> {
    existing.add(incoming)
}

/// Every wide row keyed by its country, regions summed.
fn by_country(wide: &Dataset) -> SeriesResult<Dataset> {
    Dataset::merge_by(
        wide.iter().cloned(),
        |series| Some(split_key(series.id()).0.to_string()),
        add,
    )
}

/// International rows keyed by region, or by country when no region is given. US rows come
/// from the state source when it is available, otherwise from the wide rows' regions.
fn by_region_or_country(wide: &Dataset, states: Option<&Dataset>) -> SeriesResult<Dataset> {
    let international = wide
        .iter()
        .filter(|series| states.is_none() || split_key(series.id()).0 != US_COUNTRY)
        .cloned();
    let us_states = states.into_iter().flat_map(|d| d.iter().cloned());
    Dataset::merge_by(
        international.chain(us_states),
        |series| {
            let (country, region) = split_key(series.id());
            let key = if region.is_empty() { country } else { region };
            Some(key.to_string())
        },
        add,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(input: &str) -> RawTable {
        RawTable::from_reader(input.as_bytes()).unwrap()
    }

    fn wide() -> RawTable {
        table(
            "Province/State,Country/Region,Lat,Long,3/1/20,3/2/20\n\
             ,Italy,0,0,1,2\n\
             Ontario,Canada,0,0,1,1\n\
             Quebec,Canada,0,0,2,2\n\
             Washington,US,0,0,5,6\n",
        )
    }

    #[test]
    fn wide_only_sources_fall_back_to_wide_us_regions() {
        let sources = RawSources {
            wide_confirmed: wide(),
            wide_deaths: wide(),
            ..RawSources::default()
        };
        let levels = build_levels(
            &sources,
            &ReferenceTables::default(),
            &ReconcileRules::default(),
        )
        .unwrap();

        let country = &levels.get(Level::Country).unwrap().confirmed;
        assert_eq!(country.get("Canada").unwrap().values(), &[3.0, 3.0]);
        assert_eq!(country.get("US").unwrap().values(), &[5.0, 6.0]);

        let region = &levels.get(Level::RegionOrCountry).unwrap().confirmed;
        assert_eq!(region.sorted_keys(), vec!["Italy", "Ontario", "Quebec", "Washington"]);
        assert!(levels.get(Level::State).is_none());
        assert!(levels.get(Level::Cbsa).is_none());
    }

    #[test]
    fn state_source_replaces_wide_us_rows() {
        let sources = RawSources {
            wide_confirmed: wide(),
            wide_deaths: wide(),
            us_states: Some(table(
                "date,state,fips,cases,deaths\n2020-03-02,Washington,53,9,1\n",
            )),
            us_counties: None,
        };
        let levels = build_levels(
            &sources,
            &ReferenceTables::default(),
            &ReconcileRules::default(),
        )
        .unwrap();
        let region = &levels.get(Level::RegionOrCountry).unwrap();
        assert_eq!(region.confirmed.get("Washington").unwrap().values(), &[9.0]);
        assert_eq!(region.deaths.get("Washington").unwrap().values(), &[1.0]);
        assert!(levels.state_names().contains("Washington"));
        assert_eq!(levels.snapshot().len(), 2);
    }
}
