use serde::Serialize;
use thiserror::Error;

use crate::registry::Tracker;
use crate::views::{parse_level, Base, Family, ViewError, ViewKind, ViewRequest, ViewSettings};

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "vitrack-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn levels_payload(tracker: &Tracker) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&tracker.level_summaries())
}

/// Calendar span of each loaded source.
pub fn snapshot_payload(tracker: &Tracker) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tracker.snapshot())
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewCatalogEntry {
    pub view: ViewKind,
    pub title: &'static str,
    pub base: Base,
    pub family: Family,
    pub default_threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_periods: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_min_population: Option<f64>,
}

pub fn view_catalog(settings: &ViewSettings) -> Vec<ViewCatalogEntry> {
    ViewKind::ALL
        .into_iter()
        .map(|kind| ViewCatalogEntry {
            view: kind,
            title: kind.title(),
            base: kind.base(),
            family: kind.family(),
            default_threshold: kind.default_threshold(),
            default_periods: kind.default_periods(),
            default_min_population: kind
                .uses_min_population()
                .then_some(settings.min_population),
        })
        .collect()
}

pub fn views_payload(tracker: &Tracker) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&view_catalog(tracker.settings()))
}

#[derive(Debug, Error)]
pub enum ViewPayloadError {
    #[error(transparent)]
    View(#[from] ViewError),

    #[error("failed to serialize view: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// `level` and `view` are path segments; `query` is the raw query string without `?`.
pub fn view_payload(
    tracker: &Tracker,
    level: &str,
    view: &str,
    query: &str,
) -> Result<String, ViewPayloadError> {
    let level = parse_level(level)?;
    let kind = view.parse::<ViewKind>()?;
    let request = ViewRequest::from_query(query)?;
    let output = tracker.view(level, kind, &request)?;
    Ok(serde_json::to_string_pretty(&output)?)
}
