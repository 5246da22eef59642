//! CSV-backed local source adapter.

use std::io;

use thiserror::Error;

use crate::engine::{Item, LocalSource};
use crate::error::SourceError;

/// A row that does not carry exactly a key and a value.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("row {row}: expected 2 fields (key, value), found {found}")]
pub struct MalformedRow {
    pub row: usize,
    pub found: usize,
}

/// Reads `(key, value)` pairs from two-column CSV input, in file order.
///
/// Rows are taken verbatim — no header row, no trimming, no normalisation.
/// Duplicate detection and limit checks are the engine's job, not the
/// adapter's.
pub struct CsvSource<R: io::Read> {
    reader: csv::Reader<R>,
}

impl<R: io::Read> CsvSource<R> {
    pub fn new(input: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input);
        Self { reader }
    }
}

impl<R: io::Read> LocalSource for CsvSource<R> {
    fn read_all(&mut self) -> Result<Vec<Item>, SourceError> {
        let mut items = Vec::new();

        for (index, record) in self.reader.records().enumerate() {
            let record = record?;
            if record.len() != 2 {
                return Err(Box::new(MalformedRow {
                    row: index + 1,
                    found: record.len(),
                }));
            }
            items.push(Item::new(&record[0], &record[1]));
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> Result<Vec<Item>, SourceError> {
        CsvSource::new(input.as_bytes()).read_all()
    }

    #[test]
    fn parses_two_column_records_in_file_order() {
        let items = read("zulu,26\nalpha,1\n").expect("read");
        assert_eq!(
            items,
            vec![Item::new("zulu", "26"), Item::new("alpha", "1")]
        );
    }

    #[test]
    fn empty_input_yields_no_items() {
        assert_eq!(read("").expect("read"), vec![]);
    }

    #[test]
    fn values_are_taken_verbatim() {
        let items = read("key,\" spaced, quoted \"\n").expect("read");
        assert_eq!(items, vec![Item::new("key", " spaced, quoted ")]);
    }

    #[test]
    fn ragged_rows_are_rejected_with_their_position() {
        let err = read("a,1\nb\n").expect_err("must reject");
        let malformed = err.downcast_ref::<MalformedRow>().expect("typed error");
        assert_eq!(*malformed, MalformedRow { row: 2, found: 1 });
    }

    #[test]
    fn rows_with_extra_fields_are_rejected() {
        let err = read("a,1,extra\n").expect_err("must reject");
        let malformed = err.downcast_ref::<MalformedRow>().expect("typed error");
        assert_eq!(*malformed, MalformedRow { row: 1, found: 3 });
    }
}
