//! CSV sample parsing.
//!
//! Rows are `voltage,current`; extra columns are ignored. A leading header
//! row is skipped and malformed rows are dropped without failing the file.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::Sample;
use crate::error::ScenarioError;

/// Samples read from one source.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedSamples {
    pub samples: Vec<Sample>,
    /// Whether the first row was a header.
    pub header: bool,
    /// Malformed rows that were dropped.
    pub skipped: usize,
}

/// Reads every well-formed sample row from `reader`.
///
/// Only I/O failures are errors; anything the parser can't make sense of is
/// counted in [`ParsedSamples::skipped`].
pub fn read_samples<R: Read>(reader: R) -> Result<ParsedSamples, ScenarioError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut parsed = ParsedSamples::default();
    let mut record = StringRecord::new();
    let mut row = 0usize;

    loop {
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(_) => {
                parsed.skipped += 1;
                row += 1;
                continue;
            }
        }

        match parse_record(&record) {
            Some(sample) => parsed.samples.push(sample),
            None if row == 0 && is_header(&record) => parsed.header = true,
            None => parsed.skipped += 1,
        }
        row += 1;
    }

    Ok(parsed)
}

fn parse_record(record: &StringRecord) -> Option<Sample> {
    let voltage = record.get(0)?.parse::<f64>().ok()?;
    let current = record.get(1)?.parse::<f64>().ok()?;
    Some(Sample::new(voltage, current))
}

/// A header row has a non-numeric first column, e.g. `raw_v,raw_i`.
fn is_header(record: &StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|field| !field.is_empty() && field.parse::<f64>().is_err())
}
