use std::io::Read;

use csv::{ReaderBuilder, StringRecord};

use crate::error::SortError;
use crate::quote_check::QuoteCheck;
use crate::record::Record;

/// Sequential decoder of CSV records.
///
/// The input has no header row and records may have different numbers of fields, but every
/// record must have the sort column. A record that cannot be decoded, that breaks the RFC 4180
/// quoting rules, or that is too short, is an error and ends the sort.
pub struct RecordReader<R: Read> {
    reader: csv::Reader<QuoteCheck<R>>,
    column: usize,
    records: u64,
}

impl<R: Read> RecordReader<R> {
    pub fn new(input: R, column: usize, delimiter: u8) -> RecordReader<R> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(QuoteCheck::new(input, delimiter));
        RecordReader {
            reader,
            column,
            records: 0,
        }
    }

    /// Decode the next record, `None` at the end of the input.
    pub fn next_record(&mut self) -> Result<Option<Record>, anyhow::Error> {
        let mut fields = StringRecord::new();
        let more = self.reader.read_record(&mut fields)
            .map_err(|e| SortError::MalformedRecord { record: self.records + 1, source: Box::new(e) })?;

        // the quote check runs ahead of the csv reader, a violation belongs to this record only
        // if it lies before the start of the next one
        if let Some(violation) = self.reader.get_ref().violation() {
            if !more || violation.byte() < self.reader.position().byte() {
                return Err(SortError::MalformedRecord { record: self.records + 1, source: Box::new(violation) }.into());
            }
        }
        if !more {
            return Ok(None);
        }
        self.records += 1;

        if fields.len() <= self.column {
            let line = fields.position().map(|p| p.line()).unwrap_or(self.records);
            return Err(
                SortError::ColumnOutOfRange {
                    line,
                    fields: fields.len(),
                    column: self.column,
                }.into()
            );
        }
        Ok(Some(Record::new(fields)))
    }

    /// Number of records decoded so far
    pub fn records(&self) -> u64 {
        self.records
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record, anyhow::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
