//! View recipes: fixed chains of dataset operations over one level's cumulative series.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::{Dataset, SeriesResult};
use crate::geo::{Level, MetricSet, ReferenceTables};
use crate::views::{attribution, Base, Family, ViewError, ViewKind, ViewParams};

const PER_MILLION: f64 = 1_000_000.0;

/// A computed view ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewOutput {
    pub level: Level,
    pub view: ViewKind,
    pub title: &'static str,
    pub params: ViewParams,
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
    pub highlighted: Vec<String>,
    pub series: BTreeMap<String, Vec<f64>>,
}

impl ViewOutput {
    pub fn new(
        level: Level,
        view: ViewKind,
        params: ViewParams,
        data: &Dataset,
        highlighted: Vec<String>,
    ) -> Self {
        let attribution = attribution(level, view.family());
        Self {
            level,
            view,
            title: view.title(),
            params,
            source: attribution.source,
            note: attribution.note,
            highlighted,
            series: data.to_sorted_map(),
        }
    }
}

/// Run the recipe of `kind` over `set`.
pub fn compute_view(
    set: &MetricSet,
    reference: &ReferenceTables,
    kind: ViewKind,
    params: &ViewParams,
) -> Result<Dataset, ViewError> {
    let base = base_dataset(set, kind.base(), params.window_length);
    let threshold = params.threshold;

    let data = match kind.family() {
        Family::PerMillion => {
            let floor = params.min_population.unwrap_or_default();
            per_million(&base, reference, floor)?
                .round(2)
                .get_past_threshold(threshold)
                .filter(|s| s.len() > 1)
        }
        Family::PerBed => {
            let floor = params.min_population.unwrap_or_default();
            per_bed(&base, reference, floor)?
                .round(3)
                .get_past_threshold(threshold)
        }
        Family::Counts => counts(&base, kind, params)?,
    };
    Ok(data)
}

fn base_dataset(set: &MetricSet, base: Base, window_length: usize) -> Cow<'_, Dataset> {
    match base {
        Base::Confirmed => Cow::Borrowed(&set.confirmed),
        Base::Deaths => Cow::Borrowed(&set.deaths),
        Base::Recent => Cow::Owned(set.confirmed.change(window_length)),
    }
}

fn counts(base: &Dataset, kind: ViewKind, params: &ViewParams) -> SeriesResult<Dataset> {
    let threshold = params.threshold;
    let data = match (kind, params.periods) {
        (ViewKind::Recent, _) => base.get_past_threshold(threshold),
        (
            ViewKind::ChangeConfirmed | ViewKind::ChangeDeaths | ViewKind::ChangeRecent,
            Some(periods),
        ) => base
            .get_past_threshold(threshold)
            .change(periods)
            .filter(|s| s.len().saturating_sub(1) > periods),
        (
            ViewKind::GrowthConfirmed | ViewKind::GrowthDeaths | ViewKind::GrowthRecent,
            Some(periods),
        ) => base
            .growth_rate(periods, threshold)
            .filter(|s| s.len().saturating_sub(1) > periods)
            .mul(100.0)?
            .round(1),
        _ => base.get_past_threshold(threshold).filter(|s| s.len() > 1),
    };
    Ok(data)
}

/// Places above the population floor, per million residents. Places without a population
/// are left out.
fn per_million(base: &Dataset, reference: &ReferenceTables, floor: f64) -> SeriesResult<Dataset> {
    base.try_map(|series| {
        let Some(population) = reference.population(series.id()).filter(|p| *p > floor) else {
            return Ok(None);
        };
        series.divide(population / PER_MILLION).map(Some)
    })
}

/// Places above the population floor with a known bed count, per hospital bed.
fn per_bed(base: &Dataset, reference: &ReferenceTables, floor: f64) -> SeriesResult<Dataset> {
    base.try_map(|series| {
        let qualifies = reference.population(series.id()).is_some_and(|p| p > floor);
        let beds = reference.beds(series.id()).filter(|_| qualifies);
        match beds {
            Some(beds) => series.divide(beds).map(Some),
            None => Ok(None),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::engine::Series;
    use crate::views::{ViewRequest, ViewSettings};

    fn set() -> MetricSet {
        let confirmed = Dataset::from_iter([
            Series::new("Bigland", vec![0.0, 50.0, 100.0, 200.0, 400.0, 800.0, 1600.0, 3200.0]),
            Series::new("Smallville", vec![0.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0]),
            Series::new("Quiet", vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0]),
        ]);
        let deaths = Dataset::from_iter([
            Series::new("Bigland", vec![0.0, 0.0, 5.0, 10.0, 20.0, 40.0, 80.0, 160.0]),
            Series::new("Smallville", vec![0.0; 8]),
            Series::new("Quiet", vec![0.0; 8]),
        ]);
        MetricSet { confirmed, deaths }
    }

    fn reference() -> ReferenceTables {
        let population: HashMap<String, f64> = [
            ("Bigland".to_string(), 2_000_000.0),
            ("Smallville".to_string(), 10_000.0),
        ]
        .into_iter()
        .collect();
        let beds = [("Bigland".to_string(), 4_000.0)].into_iter().collect();
        ReferenceTables::new(population, beds, HashMap::new())
    }

    fn params(kind: ViewKind, request: ViewRequest) -> ViewParams {
        let settings = ViewSettings {
            window_length: 2,
            ..ViewSettings::default()
        };
        ViewParams::resolve(kind, &request, &settings).unwrap()
    }

    fn run(kind: ViewKind, request: ViewRequest) -> Dataset {
        compute_view(&set(), &reference(), kind, &params(kind, request)).unwrap()
    }

    #[test]
    fn counts_trim_to_threshold_and_drop_single_points() {
        let confirmed = run(ViewKind::Confirmed, ViewRequest::default());
        assert_eq!(confirmed.sorted_keys(), vec!["Bigland", "Smallville"]);
        assert_eq!(
            confirmed.get("Bigland").unwrap().values(),
            &[100.0, 200.0, 400.0, 800.0, 1600.0, 3200.0]
        );
        assert_eq!(confirmed.get("Smallville").unwrap().len(), 7);
    }

    #[test]
    fn recent_is_a_trailing_window_difference() {
        let recent = run(ViewKind::Recent, ViewRequest::default());
        // Bigland window differences: 100, 150, 300, 600, 1200, 2400.
        assert_eq!(
            recent.get("Bigland").unwrap().values(),
            &[100.0, 150.0, 300.0, 600.0, 1200.0, 2400.0]
        );
        assert_eq!(
            recent.get("Smallville").unwrap().values(),
            &[300.0, 200.0, 200.0, 200.0, 200.0, 200.0]
        );
        assert!(!recent.has("Quiet"));
    }

    #[test]
    fn per_million_applies_population_floor() {
        let view = run(ViewKind::ConfirmedPerMillion, ViewRequest::default());
        assert_eq!(view.sorted_keys(), vec!["Bigland"]);
        assert_eq!(
            view.get("Bigland").unwrap().values(),
            &[25.0, 50.0, 100.0, 200.0, 400.0, 800.0, 1600.0]
        );

        let lowered = run(
            ViewKind::ConfirmedPerMillion,
            ViewRequest {
                min_population: Some(0.0),
                ..ViewRequest::default()
            },
        );
        assert!(lowered.has("Smallville"));
        assert!(!lowered.has("Quiet"));
    }

    #[test]
    fn per_bed_needs_beds_and_rounds_to_three_places() {
        let view = run(ViewKind::RecentPerBed, ViewRequest::default());
        assert_eq!(view.sorted_keys(), vec!["Bigland"]);
        assert_eq!(view.get("Bigland").unwrap().values()[0], 0.025);
    }

    #[test]
    fn change_view_drops_short_series() {
        let view = run(
            ViewKind::ChangeDeaths,
            ViewRequest {
                periods: Some(1),
                ..ViewRequest::default()
            },
        );
        assert_eq!(view.sorted_keys(), vec!["Bigland"]);
        assert_eq!(view.get("Bigland").unwrap().values(), &[10.0, 20.0, 40.0, 80.0]);
    }

    #[test]
    fn growth_view_is_a_rounded_percentage() {
        let view = run(
            ViewKind::GrowthConfirmed,
            ViewRequest {
                periods: Some(1),
                ..ViewRequest::default()
            },
        );
        assert_eq!(view.get("Bigland").unwrap().values(), &[100.0; 5]);
        let small = view.get("Smallville").unwrap().values();
        assert_eq!(small[0], 50.0);
        assert_eq!(small[1], 33.3);
    }

    #[test]
    fn lag_longer_than_any_series_yields_an_empty_view() {
        for kind in [ViewKind::ChangeConfirmed, ViewKind::GrowthConfirmed, ViewKind::ChangeRecent] {
            let view = run(
                kind,
                ViewRequest {
                    periods: Some(usize::MAX),
                    ..ViewRequest::default()
                },
            );
            assert!(view.is_empty(), "{kind:?}");
        }
    }

    #[test]
    fn output_carries_attribution_and_sorted_series() {
        let kind = ViewKind::RecentPerBed;
        let params = params(kind, ViewRequest::default());
        let data = compute_view(&set(), &reference(), kind, &params).unwrap();
        let output = ViewOutput::new(Level::County, kind, params, &data, vec![]);
        assert_eq!(output.title, "Recent Cases per Hospital Bed");
        assert!(output.note.is_some());
        assert_eq!(output.series.keys().collect::<Vec<_>>(), vec!["Bigland"]);
    }
}
