//! Header row plus string rows, the shape every source arrives in.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::ingest::IngestError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Parse CSV text. The first record is the header; ragged rows are accepted.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, IngestError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = csv_reader.records();
        let header = match records.next() {
            Some(record) => record?.iter().map(|cell| cell.trim().to_string()).collect(),
            None => return Err(IngestError::EmptyTable),
        };
        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { header, rows })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| IngestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Index of a header column, matched case-insensitively.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    pub fn require_column(&self, name: &'static str) -> Result<usize, IngestError> {
        self.column(name).ok_or(IngestError::MissingColumn(name))
    }
}

/// Cell accessor tolerant of short rows.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_and_skips_blank_rows() {
        let input = "date,state,cases\n2020-03-01,Oregon,1\n,,\n2020-03-02,Oregon,3\n";
        let table = RawTable::from_reader(input.as_bytes()).unwrap();
        assert_eq!(table.header, vec!["date", "state", "cases"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.column("STATE"), Some(1));
        assert!(matches!(
            table.require_column("deaths"),
            Err(IngestError::MissingColumn("deaths"))
        ));
    }

    #[test]
    fn quoted_place_names_keep_their_commas() {
        let input = "Province/State,Country/Region,Lat,Long,1/22/20\n\"King County, WA\",US,0,0,1\n";
        let table = RawTable::from_reader(input.as_bytes()).unwrap();
        assert_eq!(cell(&table.rows[0], 0), "King County, WA");
        assert_eq!(cell(&table.rows[0], 9), "");
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(
            RawTable::from_reader("".as_bytes()),
            Err(IngestError::EmptyTable)
        ));
    }
}
