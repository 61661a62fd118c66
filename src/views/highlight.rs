//! Which labels of a view the caller wants emphasized.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::engine::Dataset;

/// How many places `top-areas` and `top-states` pick.
pub const TOP_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Places with the highest latest observation.
    TopAreas,
    /// Same, restricted to US states.
    TopStates,
    Label(String),
}

impl Selection {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "top-areas" => Self::TopAreas,
            "top-states" => Self::TopStates,
            label => Self::Label(label.to_string()),
        }
    }
}

/// Labels to emphasize, in selection order without duplicates. Labels absent from the view
/// are left out.
pub fn resolve_highlights(
    data: &Dataset,
    selections: &[Selection],
    state_names: &HashSet<String>,
) -> Vec<String> {
    let ranked = rank_by_latest(data);
    let mut chosen: Vec<String> = Vec::new();
    let mut push = |label: &str| {
        if data.has(label) && !chosen.iter().any(|c| c == label) {
            chosen.push(label.to_string());
        }
    };

    for selection in selections {
        match selection {
            Selection::TopAreas => ranked.iter().take(TOP_COUNT).for_each(|l| push(*l)),
            Selection::TopStates => ranked
                .iter()
                .filter(|label| state_names.contains(**label))
                .take(TOP_COUNT)
                .for_each(|l| push(*l)),
            Selection::Label(label) => push(label),
        }
    }
    chosen
}

/// Labels by descending last observation. Empty series and NaN sort last.
fn rank_by_latest(data: &Dataset) -> Vec<&str> {
    let mut latest: Vec<(&str, f64)> = data
        .iter()
        .map(|s| (s.id(), s.last().filter(|v| !v.is_nan()).unwrap_or(f64::NEG_INFINITY)))
        .collect();
    latest.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    latest.into_iter().map(|(label, _)| label).collect()
}
