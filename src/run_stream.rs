use std::cmp::Ordering;
use std::fs::File;
use std::io::Read;

use crate::comparator::Comparator;
use crate::config::Config;
use crate::error::SortError;
use crate::record::Record;
use crate::record_reader::RecordReader;
use crate::run_file::RunFile;

/// Cursor over one sorted run, buffering the next record.
///
/// Once the run is exhausted the stream stays exhausted, `peek` and `pop` keep returning `None`.
pub(crate) struct RunStream<R: Read> {
    sequence: usize,
    reader: RecordReader<R>,
    head: Option<Record>,
}

impl RunStream<File> {
    pub(crate) fn open(run: &RunFile, config: &Config) -> Result<RunStream<File>, anyhow::Error> {
        let file = File::open(run.path())
            .map_err(|e| SortError::Input { path: run.path().clone(), source: e })?;
        let reader = RecordReader::new(file, config.column(), config.delimiter());
        RunStream::new(reader, run.sequence())
    }
}

impl<R: Read> RunStream<R> {
    pub(crate) fn new(mut reader: RecordReader<R>, sequence: usize) -> Result<RunStream<R>, anyhow::Error> {
        let head = reader.next_record()?;
        Ok(
            RunStream {
                sequence,
                reader,
                head,
            }
        )
    }

    pub(crate) fn peek(&self) -> Option<&Record> {
        self.head.as_ref()
    }

    pub(crate) fn pop(&mut self) -> Result<Option<Record>, anyhow::Error> {
        if self.head.is_none() {
            return Ok(None);
        }
        let next = self.reader.next_record()?;
        Ok(std::mem::replace(&mut self.head, next))
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.head.is_none()
    }

    /// Order two streams by their buffered records.
    ///
    /// An exhausted stream is greater than any stream that still has a record, so exhausted
    /// streams sink to the bottom of the merge heap and never need to be removed from it. Equal
    /// keys are ordered by run sequence, which keeps records with equal keys in input order.
    pub(crate) fn cmp_head(&self, other: &RunStream<R>, column: usize, comparator: Comparator) -> Ordering {
        match (self.peek(), other.peek()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => comparator.compare(a.key(column), b.key(column))
                .then_with(|| self.sequence.cmp(&other.sequence)),
        }
    }
}
