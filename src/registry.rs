//! Startup-loaded tracker state shared by the CLI and the server.
//! Load once, pass via Arc to handlers; every view is a pure read over it.

use std::collections::HashSet;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::geo::reference::ReferenceError;
use crate::geo::{
    build_levels, Level, Levels, PipelineError, RawSources, ReferenceTables, SourceSnapshot,
};
use crate::ingest::{IngestError, ReconcileRules};
use crate::parallel::WorkerPool;
use crate::views::{
    compute_view, resolve_highlights, Selection, ViewError, ViewKind, ViewOutput, ViewParams,
    ViewRequest, ViewSettings,
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSummary {
    pub level: Level,
    pub label: &'static str,
    pub confirmed: usize,
    pub deaths: usize,
}

/// One line of a level report. A failing view records its error and leaves the rest alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub view: ViewKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<usize>,
    pub top_areas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelReport {
    pub level: Level,
    pub views: Vec<ReportEntry>,
}

/// Places of one level absent from the reference tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceCoverage {
    pub level: Level,
    pub places: usize,
    pub missing_population: Vec<String>,
    pub missing_beds: Vec<String>,
}

/// Read-only tracker state built once at startup.
#[derive(Debug)]
pub struct Tracker {
    levels: Levels,
    reference: ReferenceTables,
    settings: ViewSettings,
    state_names: HashSet<String>,
}

impl Tracker {
    /// Read reference tables and sources from the configured paths and build every level.
    pub fn load(config: &AppConfig) -> Result<Arc<Tracker>, LoadError> {
        let reference = ReferenceTables::load(&config.reference)?;
        let sources = RawSources::load(&config.sources)?;
        let tracker = Self::from_sources(&sources, reference, &config.reconcile, config.views)?;
        Ok(Arc::new(tracker))
    }

    pub fn from_sources(
        sources: &RawSources,
        reference: ReferenceTables,
        rules: &ReconcileRules,
        settings: ViewSettings,
    ) -> Result<Tracker, PipelineError> {
        let levels = build_levels(sources, &reference, rules)?;
        let state_names = levels.state_names();
        info!(levels = levels.iter().count(), "tracker ready");
        Ok(Tracker {
            levels,
            reference,
            settings,
            state_names,
        })
    }

    pub fn levels(&self) -> &Levels {
        &self.levels
    }

    pub fn reference(&self) -> &ReferenceTables {
        &self.reference
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> &[SourceSnapshot] {
        self.levels.snapshot()
    }

    pub fn level_summaries(&self) -> Vec<LevelSummary> {
        self.levels
            .iter()
            .map(|(level, set)| LevelSummary {
                level,
                label: level.label(),
                confirmed: set.confirmed.len(),
                deaths: set.deaths.len(),
            })
            .collect()
    }

    /// Compute one view with the caller's overrides and highlight selections.
    pub fn view(
        &self,
        level: Level,
        kind: ViewKind,
        request: &ViewRequest,
    ) -> Result<ViewOutput, ViewError> {
        let set = self
            .levels
            .get(level)
            .ok_or(ViewError::LevelUnavailable(level))?;
        let params = ViewParams::resolve(kind, request, &self.settings)?;
        let data = compute_view(set, &self.reference, kind, &params)?;

        let selections: Vec<Selection> = request
            .highlight
            .iter()
            .map(|raw| Selection::parse(raw))
            .collect();
        let highlighted = resolve_highlights(&data, &selections, &self.state_names);
        Ok(ViewOutput::new(level, kind, params, &data, highlighted))
    }

    /// Every view of `level` at its default parameters, computed in parallel.
    pub fn report(&self, level: Level) -> Result<LevelReport, ViewError> {
        if self.levels.get(level).is_none() {
            return Err(ViewError::LevelUnavailable(level));
        }
        let request = ViewRequest {
            highlight: vec!["top-areas".to_string()],
            ..ViewRequest::default()
        };
        let pool = WorkerPool::with_workers(self.settings.workers);
        let views = pool.install(|| {
            ViewKind::ALL
                .par_iter()
                .map(|&kind| match self.view(level, kind, &request) {
                    Ok(output) => ReportEntry {
                        view: kind,
                        series: Some(output.series.len()),
                        top_areas: output.highlighted,
                        error: None,
                    },
                    Err(err) => {
                        warn!(level = %level, view = %kind, error = %err, "view failed");
                        ReportEntry {
                            view: kind,
                            series: None,
                            top_areas: Vec::new(),
                            error: Some(err.to_string()),
                        }
                    }
                })
                .collect::<Vec<_>>()
        });
        Ok(LevelReport { level, views })
    }

    /// Which places of the population-normalized levels the reference tables do not cover.
    pub fn reference_coverage(&self) -> Vec<ReferenceCoverage> {
        self.levels
            .iter()
            .map(|(level, set)| {
                let places = set.confirmed.sorted_keys();
                let missing = |lookup: &dyn Fn(&str) -> Option<f64>| {
                    places
                        .iter()
                        .filter(|place| lookup(place).is_none())
                        .map(|place| place.to_string())
                        .collect::<Vec<_>>()
                };
                ReferenceCoverage {
                    level,
                    places: places.len(),
                    missing_population: missing(&|p| self.reference.population(p)),
                    missing_beds: missing(&|p| self.reference.beds(p)),
                }
            })
            .collect()
    }
}
