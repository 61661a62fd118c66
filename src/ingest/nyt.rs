//! Long US layout: one row per place per day, in chronological order.
//!
//! State files carry `date,state,fips,cases,deaths`; county files add a `county` column.
//! Each place's rows are appended in order, so a place's series starts on its first
//! reported day.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::engine::{Dataset, Series};
use crate::ingest::frame::{parse_long_date, DayFrame};
use crate::ingest::table::{cell, RawTable};
use crate::ingest::{compose_key, parse_observation, IngestError};

/// Confirmed and death series from one long file.
#[derive(Debug, Clone, Default)]
pub struct LongSource {
    pub confirmed: Dataset,
    pub deaths: Dataset,
    pub frame: DayFrame,
}

/// Series keyed by state name.
pub fn parse_states(table: &RawTable) -> Result<LongSource, IngestError> {
    let state = table.require_column("state")?;
    parse_long(table, |row| cell(row, state).trim().to_string())
}

/// Series keyed `county, state----fips`. Rows without a usable FIPS code keep an empty
/// code and never match a metro area.
pub fn parse_counties(table: &RawTable) -> Result<LongSource, IngestError> {
    let county = table.require_column("county")?;
    let state = table.require_column("state")?;
    let fips = table.require_column("fips")?;
    parse_long(table, |row| {
        let place = format!("{}, {}", cell(row, county).trim(), cell(row, state).trim());
        let code = cell(row, fips)
            .trim()
            .parse::<u32>()
            .map(|code| code.to_string())
            .unwrap_or_default();
        compose_key(&place, &code)
    })
}

#[derive(Default)]
struct Accumulator {
    confirmed: Vec<f64>,
    deaths: Vec<f64>,
}

fn parse_long<K>(table: &RawTable, key: K) -> Result<LongSource, IngestError>
where
    K: Fn(&[String]) -> String,
{
    let date = table.require_column("date")?;
    let cases = table.require_column("cases")?;
    let deaths = table.require_column("deaths")?;

    let mut order: Vec<String> = Vec::new();
    let mut places: HashMap<String, Accumulator> = HashMap::new();
    let mut frame = DayFrame::default();
    let mut undated = 0usize;

    for row in &table.rows {
        match parse_long_date(cell(row, date)) {
            Some(day) => frame.observe(day),
            None => undated += 1,
        }
        let id = key(row);
        let entry = places.entry(id.clone()).or_insert_with(|| {
            order.push(id);
            Accumulator::default()
        });
        entry.confirmed.push(parse_observation(cell(row, cases)));
        entry.deaths.push(parse_observation(cell(row, deaths)));
    }
    if undated > 0 {
        warn!(undated, "long source rows with unparseable dates");
    }

    let mut confirmed = Vec::with_capacity(order.len());
    let mut death_series = Vec::with_capacity(order.len());
    for id in order {
        if let Some(acc) = places.remove(&id) {
            confirmed.push(Series::new(id.clone(), acc.confirmed));
            death_series.push(Series::new(id, acc.deaths));
        }
    }

    let source = LongSource {
        confirmed: confirmed.into_iter().collect(),
        deaths: death_series.into_iter().collect(),
        frame,
    };
    debug!(places = source.confirmed.len(), days = frame.days, "parsed long source");
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(input: &str) -> RawTable {
        RawTable::from_reader(input.as_bytes()).unwrap()
    }

    #[test]
    fn states_start_on_their_first_reported_day() {
        let input = "date,state,fips,cases,deaths\n\
            2020-03-01,Washington,53,1,0\n\
            2020-03-02,Washington,53,3,1\n\
            2020-03-02,Oregon,41,1,0\n";
        let source = parse_states(&table(input)).unwrap();
        assert_eq!(source.confirmed.get("Washington").unwrap().values(), &[1.0, 3.0]);
        assert_eq!(source.deaths.get("Washington").unwrap().values(), &[0.0, 1.0]);
        assert_eq!(source.confirmed.get("Oregon").unwrap().values(), &[1.0]);
        assert_eq!(source.frame.days, 2);
    }

    #[test]
    fn counties_carry_their_fips_code() {
        let input = "date,county,state,fips,cases,deaths\n\
            2020-03-01,Multnomah,Oregon,41051,2,0\n\
            2020-03-01,New York City,New York,,10,1\n";
        let source = parse_counties(&table(input)).unwrap();
        assert!(source.confirmed.has("Multnomah, Oregon----41051"));
        assert!(source.confirmed.has("New York City, New York----"));
    }

    #[test]
    fn missing_columns_are_reported() {
        let input = "date,state,cases\n2020-03-01,Oregon,1\n";
        assert!(matches!(
            parse_states(&table(input)),
            Err(IngestError::MissingColumn("deaths"))
        ));
    }
}
