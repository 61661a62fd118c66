//! Raw source rows to typed series.
//!
//! Two source layouts are understood: the wide international layout (one row per place,
//! one column per day) and the long US layout (one row per place per day).

pub mod frame;
pub mod jhu;
pub mod nyt;
pub mod reconcile;
pub mod table;

use thiserror::Error;

use crate::engine::SeriesError;

pub use frame::DayFrame;
pub use reconcile::ReconcileRules;
pub use table::RawTable;

/// Separator of the composite keys used before reconciliation (`country----region`,
/// `county, state----fips`).
pub const KEY_SEPARATOR: &str = "----";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("source table has no header row")]
    EmptyTable,

    #[error("source table is missing column '{0}'")]
    MissingColumn(&'static str),

    #[error(transparent)]
    Merge(#[from] SeriesError),
}

/// Join a composite key.
pub fn compose_key(primary: &str, secondary: &str) -> String {
    format!("{primary}{KEY_SEPARATOR}{secondary}")
}

/// Split a composite key into its two halves; keys without a separator have an empty
/// second half.
pub fn split_key(key: &str) -> (&str, &str) {
    key.split_once(KEY_SEPARATOR).unwrap_or((key, ""))
}

/// Numeric cell: blank reads as 0, anything unparseable as NaN.
pub fn parse_observation(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
