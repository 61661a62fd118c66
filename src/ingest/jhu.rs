//! Wide international layout: one row per place, one column per day.
//!
//! Columns: 0 place descriptor (`region` or `county, region`), 1 country, 2-3 latitude and
//! longitude (ignored), 4.. daily cumulative observations.

use tracing::debug;

use crate::engine::{Dataset, Series};
use crate::ingest::frame::DayFrame;
use crate::ingest::reconcile::ReconcileRules;
use crate::ingest::table::{cell, RawTable};
use crate::ingest::{compose_key, parse_observation, IngestError};

const REGION_COLUMN: usize = 0;
const COUNTRY_COLUMN: usize = 1;
const FIRST_OBSERVATION_COLUMN: usize = 4;

/// One wide file, reconciled, keyed `country----region`.
#[derive(Debug, Clone, Default)]
pub struct WideSource {
    pub dataset: Dataset,
    pub frame: DayFrame,
}

/// Parse and reconcile a wide table. Rows without a country and rows the rules exclude are
/// dropped; rows that reconcile to the same place are summed.
pub fn parse_wide(table: &RawTable, rules: &ReconcileRules) -> Result<WideSource, IngestError> {
    if table.header.is_empty() {
        return Err(IngestError::EmptyTable);
    }
    let width = table.header.len().max(FIRST_OBSERVATION_COLUMN);
    let frame = DayFrame::from_wide_header(
        table.header.get(FIRST_OBSERVATION_COLUMN..).unwrap_or_default(),
    );

    let mut dataset = Dataset::new();
    let mut dropped = 0usize;
    for row in &table.rows {
        let country = cell(row, COUNTRY_COLUMN);
        if country.trim().is_empty() {
            dropped += 1;
            continue;
        }
        let Some(place) = rules.reconcile(country, cell(row, REGION_COLUMN)) else {
            dropped += 1;
            continue;
        };
        let values = (FIRST_OBSERVATION_COLUMN..width)
            .map(|index| parse_observation(cell(row, index)))
            .collect();
        dataset.add_series(Series::new(compose_key(&place.country, &place.region), values))?;
    }

    debug!(
        rows = table.rows.len(),
        dropped,
        places = dataset.len(),
        "parsed wide source"
    );
    Ok(WideSource { dataset, frame })
}
