//! Calendar span covered by one source. Series stay indexed by day offset; the span is only
//! reported as "data as of" metadata.

use chrono::NaiveDate;
use serde::Serialize;

/// Header dates of the wide layout, e.g. `3/14/20`.
const WIDE_DATE_FORMAT: &str = "%m/%d/%y";
/// Row dates of the long layout, e.g. `2020-03-14`.
const LONG_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayFrame {
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    /// Number of daily observations in the longest series.
    pub days: usize,
}

impl DayFrame {
    /// Span of a wide header's date columns.
    pub fn from_wide_header(date_columns: &[String]) -> Self {
        Self {
            first_day: date_columns.first().and_then(|d| parse_wide_date(d)),
            last_day: date_columns.last().and_then(|d| parse_wide_date(d)),
            days: date_columns.len(),
        }
    }

    /// Widen the frame to include `day`.
    pub fn observe(&mut self, day: NaiveDate) {
        self.first_day = Some(self.first_day.map_or(day, |first| first.min(day)));
        self.last_day = Some(self.last_day.map_or(day, |last| last.max(day)));
        if let (Some(first), Some(last)) = (self.first_day, self.last_day) {
            self.days = (last - first).num_days() as usize + 1;
        }
    }
}

pub fn parse_wide_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), WIDE_DATE_FORMAT).ok()
}

pub fn parse_long_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), LONG_DATE_FORMAT).ok()
}
