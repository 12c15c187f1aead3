use std::io::{self, Read};

use csv::WriterBuilder;
use tempfile::{Builder, NamedTempFile};

use crate::config::Config;
use crate::error::SortError;
use crate::record::Record;
use crate::record_reader::RecordReader;
use crate::run_file::RunFile;

pub(crate) fn create_tmp_file(config: &Config, sequence: usize) -> Result<NamedTempFile, anyhow::Error> {
    let prefix = format!("{}{}-", config.tmp_prefix(), sequence);
    let tmp_file = Builder::new()
        .prefix(&prefix)
        .suffix(config.tmp_suffix())
        .tempfile_in(config.tmp())
        .map_err(|e| SortError::output(config.tmp().clone(), e))?;
    Ok(tmp_file)
}

/// Spill phase: splits the input into batches bounded by the configured chunk size, sorts every
/// batch in memory and writes it to its own run file.
pub(crate) struct RunBuilder<'a> {
    config: &'a Config,
}

impl<'a> RunBuilder<'a> {
    pub(crate) fn new(config: &'a Config) -> RunBuilder<'a> {
        RunBuilder {
            config,
        }
    }

    /// Consume `reader`, appending every run written to `runs`.
    ///
    /// Runs are appended as soon as they are on disk so that the caller can still remove them
    /// when a later record fails.
    pub(crate) fn build<R: Read>(&self, reader: RecordReader<R>, runs: &mut Vec<RunFile>) -> Result<(), anyhow::Error> {
        let mut batch: Vec<Record> = Vec::new();
        let mut batch_bytes: u64 = 0;
        for record in reader {
            let record = record?;
            batch_bytes += record.byte_size() as u64;
            batch.push(record);
            if batch_bytes >= self.config.chunk_size_bytes() {
                let capacity = batch.len();
                let full = std::mem::replace(&mut batch, Vec::with_capacity(capacity));
                let run = self.spill(full, batch_bytes, runs.len())?;
                runs.push(run);
                batch_bytes = 0;
            }
        }

        if !batch.is_empty() {
            let run = self.spill(batch, batch_bytes, runs.len())?;
            runs.push(run);
        }
        log::info!(
            "Spilled {} runs, records: {}, bytes: {}",
            runs.len(),
            runs.iter().map(|r| r.records()).sum::<usize>(),
            runs.iter().map(|r| r.bytes()).sum::<u64>(),
        );
        Ok(())
    }

    fn spill(&self, mut batch: Vec<Record>, bytes: u64, sequence: usize) -> Result<RunFile, anyhow::Error> {
        let column = self.config.column();
        let comparator = self.config.comparator();
        // sort_by is stable, equal keys keep their input order
        batch.sort_by(|a, b| comparator.compare(a.key(column), b.key(column)));

        let tmp_file = create_tmp_file(self.config, sequence)?;
        let path = tmp_file.path().to_path_buf();
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .delimiter(self.config.delimiter())
            .from_writer(tmp_file);
        for record in &batch {
            writer.write_record(record.fields())
                .map_err(|e| SortError::output(&path, e))?;
        }
        let tmp_file = writer.into_inner()
            .map_err(|e| SortError::output(&path, io::Error::new(e.error().kind(), e.error().to_string())))?;
        let path = tmp_file.into_temp_path()
            .keep()
            .map_err(|e| SortError::output(&path, e.error))?;

        log::debug!("Wrote run {}, records: {}, bytes: {}, path: {}", sequence, batch.len(), bytes, path.display());
        Ok(RunFile::new(path, sequence, batch.len(), bytes))
    }
}
