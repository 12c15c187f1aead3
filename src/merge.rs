use std::io::{self, Write};
use std::path::Path;

use csv::WriterBuilder;

use crate::config::Config;
use crate::error::SortError;
use crate::run_file::RunFile;
use crate::run_heap::RunHeap;
use crate::run_stream::RunStream;

/// Merge sorted runs into `output`, returning the writer and the number of records written.
///
/// All runs are open for the duration of the merge, one buffered record each. The run files are
/// closed when this returns but not removed.
pub(crate) fn merge<W: Write>(runs: &[RunFile], config: &Config, output: W, output_path: &Path) -> Result<(W, usize), anyhow::Error> {
    let mut streams = Vec::with_capacity(runs.len());
    for run in runs {
        streams.push(RunStream::open(run, config)?);
    }
    let mut heap = RunHeap::new(streams, config.column(), config.comparator());
    log::info!("Merging {} runs into {}", heap.len(), output_path.display());

    let mut writer = WriterBuilder::new()
        .flexible(true)
        .delimiter(config.delimiter())
        .from_writer(output);
    let mut merged: usize = 0;
    while let Some(record) = heap.pop()? {
        writer.write_record(record.fields())
            .map_err(|e| SortError::output(output_path, e))?;
        merged += 1;
    }
    let output = writer.into_inner()
        .map_err(|e| SortError::output(output_path, io::Error::new(e.error().kind(), e.error().to_string())))?;

    log::info!("Finished merging runs, merged length: {} records", merged);
    Ok((output, merged))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::comparator::Comparator;
    use crate::config::tests::test_config;
    use crate::merge::merge;
    use crate::record_reader::RecordReader;
    use crate::run_builder::RunBuilder;

    fn spill_and_merge(input: &str, column: usize, comparator: Comparator, chunk_size_bytes: u64) -> Result<(String, usize), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let config = test_config(tmp.path().to_path_buf(), column, comparator, chunk_size_bytes);
        let mut runs = Vec::new();
        RunBuilder::new(&config).build(RecordReader::new(Cursor::new(input.as_bytes().to_vec()), column, b','), &mut runs)?;
        let (output, merged) = merge(&runs, &config, Vec::new(), tmp.path())?;
        assert_eq!(merged, runs.iter().map(|r| r.records()).sum::<usize>());
        Ok((String::from_utf8(output)?, runs.len()))
    }

    #[test]
    fn test_merge_no_runs() -> Result<(), anyhow::Error> {
        let (output, runs) = spill_and_merge("", 0, Comparator::String, 1)?;
        assert_eq!(runs, 0);
        assert_eq!(output, "");
        Ok(())
    }

    #[test]
    fn test_merge_string_column() -> Result<(), anyhow::Error> {
        let (output, runs) = spill_and_merge("b,2\na,3\nc,1\n", 0, Comparator::String, 1)?;
        assert_eq!(runs, 3);
        assert_eq!(output, "a,3\nb,2\nc,1\n");
        Ok(())
    }

    #[test]
    fn test_merge_integer_column() -> Result<(), anyhow::Error> {
        let (output, runs) = spill_and_merge("b,2\na,3\nc,1\n", 1, Comparator::Integer, 1)?;
        assert_eq!(runs, 3);
        assert_eq!(output, "c,1\nb,2\na,3\n");
        Ok(())
    }

    #[test]
    fn test_merge_float_column() -> Result<(), anyhow::Error> {
        let (output, _) = spill_and_merge("x,2.5\ny,-1e1\nz,0.25\nw,nope\n", 1, Comparator::Float, 6)?;
        assert_eq!(output, "y,-1e1\nw,nope\nz,0.25\nx,2.5\n");
        Ok(())
    }

    #[test]
    fn test_merge_is_stable_across_runs() -> Result<(), anyhow::Error> {
        let (output, runs) = spill_and_merge("k,1\nj,2\nk,3\nj,4\nk,5\n", 0, Comparator::String, 4)?;
        assert_eq!(runs, 3);
        assert_eq!(output, "j,2\nj,4\nk,1\nk,3\nk,5\n");
        Ok(())
    }
}
