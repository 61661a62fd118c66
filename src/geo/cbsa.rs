//! County series re-bucketed into metro areas (CBSAs) through the FIPS lookup.
//!
//! Counties begin reporting on different days, so two counties of one metro area rarely
//! have the same length. Both are indexed from their own first day and end on the source's
//! last day; left-zero-padding the shorter one lines the days back up before summing.

use crate::engine::{Dataset, SeriesResult};
use crate::geo::reference::ReferenceTables;
use crate::ingest::split_key;

/// Metro-area dataset. Counties without a known FIPS code or outside every metro area are
/// left out.
pub fn rebucket_counties(counties: &Dataset, reference: &ReferenceTables) -> SeriesResult<Dataset> {
    Dataset::merge_by(
        counties.iter().cloned(),
        |series| {
            let (_, fips) = split_key(series.id());
            let code = fips.parse::<u32>().ok()?;
            reference.metro_area(code).map(str::to_string)
        },
        |existing, incoming| existing.add_aligned(incoming),
    )
}

/// County-level dataset keyed `County, State`.
pub fn county_level(counties: &Dataset) -> SeriesResult<Dataset> {
    Dataset::merge_by(
        counties.iter().cloned(),
        |series| Some(split_key(series.id()).0.to_string()),
        |existing, incoming| existing.add_aligned(incoming),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::engine::Series;

    fn reference() -> ReferenceTables {
        let cbsa = HashMap::from([
            (41051, "Portland, OR".to_string()),
            (41067, "Portland, OR".to_string()),
        ]);
        ReferenceTables::new(HashMap::new(), HashMap::new(), cbsa)
    }

    #[test]
    fn counties_of_one_metro_are_padded_and_summed() {
        let counties = Dataset::from_iter([
            Series::new("Multnomah, Oregon----41051", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            Series::new("Washington, Oregon----41067", vec![10.0, 20.0, 30.0]),
            Series::new("Unknown, Oregon----", vec![7.0]),
            Series::new("Lane, Oregon----41039", vec![1.0]),
        ]);
        let metros = rebucket_counties(&counties, &reference()).unwrap();
        assert_eq!(metros.len(), 1);
        assert_eq!(
            metros.get("Portland, OR").unwrap().values(),
            &[1.0, 2.0, 13.0, 24.0, 35.0]
        );
    }

    #[test]
    fn county_level_strips_the_fips_code() {
        let counties = Dataset::from_iter([Series::new("Lane, Oregon----41039", vec![1.0])]);
        let level = county_level(&counties).unwrap();
        assert_eq!(level.sorted_keys(), vec!["Lane, Oregon"]);
    }
}
