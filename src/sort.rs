use std::cmp::{max, min, Ordering};
use std::ffi::OsString;
use std::fs::{self, File, Permissions};
use std::io::Read;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use rlimit::{getrlimit, Resource, setrlimit};
use tempfile::{Builder, NamedTempFile};

use crate::cleanup_command::{discard_runs, remove_runs};
use crate::comparator::Comparator;
use crate::config::Config;
use crate::error::SortError;
use crate::merge::merge;
use crate::record::Record;
use crate::record_reader::RecordReader;
use crate::run_builder::RunBuilder;
use crate::run_file::RunFile;

/// Default in-memory batch size, 256 MiB of field data.
pub const DEFAULT_CHUNK_SIZE_BYTES: u64 = 1 << 28;

struct OpenFilesLimit {
    holders: usize,
    baseline: Option<(u64, u64)>,
}

// sorts merging right now and the NOFILE limit found before the first of them raised it
static NOFILE: Mutex<OpenFilesLimit> = Mutex::new(OpenFilesLimit { holders: 0, baseline: None });

/// Default output path for `input`: `<dir>/<stem>_sorted.<ext>`.
///
/// # Examples
/// ```
/// use std::path::{Path, PathBuf};
/// use csv_file_sort::sort::sorted_path;
/// assert_eq!(sorted_path(Path::new("data/people.csv")), PathBuf::from("data/people_sorted.csv"));
/// assert_eq!(sorted_path(Path::new("people")), PathBuf::from("people_sorted"));
/// ```
pub fn sorted_path(input: &Path) -> PathBuf {
    let mut name: OsString = input.file_stem().unwrap_or_default().to_os_string();
    name.push("_sorted");
    if let Some(extension) = input.extension() {
        name.push(".");
        name.push(extension);
    }
    input.with_file_name(name)
}

/// Outcome of a successful sort.
#[derive(Debug)]
pub struct SortSummary {
    output: PathBuf,
    records: usize,
    runs: usize,
    cleanup_failures: Vec<SortError>,
}

impl SortSummary {
    fn new(output: PathBuf, records: usize, runs: usize, cleanup_failures: Vec<SortError>) -> SortSummary {
        SortSummary {
            output,
            records,
            runs,
            cleanup_failures,
        }
    }

    /// Path of the sorted file
    pub fn output(&self) -> &PathBuf {
        &self.output
    }

    /// Number of records written
    pub fn records(&self) -> usize {
        self.records
    }

    /// Number of intermediate runs the input was split into
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Run files that could not be removed after the merge. The output is still valid.
    pub fn cleanup_failures(&self) -> &Vec<SortError> {
        &self.cleanup_failures
    }
}

/// Sort a CSV file by one column
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use csv_file_sort::comparator::Comparator;
/// use csv_file_sort::sort::Sort;
///
/// fn sort_by_age(input: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
///     let mut csv_sort = Sort::new(input, 2);
///     csv_sort.with_comparator(Comparator::Integer);
///     // for large files use a dedicated directory for the intermediate runs
///     csv_sort.with_tmp_dir(tmp);
///     let summary = csv_sort.sort()?;
///     println!("sorted to: {}", summary.output().display());
///     Ok(())
/// }
/// ```
pub struct Sort {
    input: PathBuf,
    output: Option<PathBuf>,
    tmp: PathBuf,
    column: usize,
    comparator: Comparator,
    delimiter: u8,
    chunk_size_bytes: u64,
    cleanup_tasks: usize,
}

impl Sort {
    /// Create a default Sort definition for `input` keyed on the zero based `column`.
    ///
    /// * the output is written next to the input, see [sorted_path]
    /// * intermediate runs are written to the current working directory
    /// * values are compared as strings
    /// * the field delimiter is ','
    /// * input is sorted in memory in batches of 256 MiB
    /// * run files are removed using all available cores
    pub fn new(input: PathBuf, column: usize) -> Sort {
        Sort {
            input,
            output: None,
            tmp: PathBuf::from("."),
            column,
            comparator: Comparator::String,
            delimiter: b',',
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
            cleanup_tasks: 0,
        }
    }

    /// Write the sorted result to `output` instead of the default path. An existing file is
    /// replaced.
    pub fn with_output(&mut self, output: PathBuf) {
        self.output = Some(output);
    }

    /// Set the directory for intermediate run files. Preferably on a file system with enough
    /// space to hold a full copy of the input.
    pub fn with_tmp_dir(&mut self, tmp: PathBuf) {
        self.tmp = tmp;
    }

    /// Set the [Comparator]. The default is [Comparator::String]
    pub fn with_comparator(&mut self, comparator: Comparator) {
        self.comparator = comparator;
    }

    /// Set the field delimiter. The default is b','
    pub fn with_delimiter(&mut self, delimiter: u8) {
        self.delimiter = delimiter;
    }

    /// Sort the input in memory in batches of 'chunk_size_bytes' of field data
    pub fn with_chunk_size_bytes(&mut self, chunk_size_bytes: u64) {
        self.chunk_size_bytes = chunk_size_bytes;
    }

    /// Sort the input in memory in batches of 'chunk_size_mb' MB of field data
    pub fn with_chunk_size_mb(&mut self, chunk_size_mb: u64) {
        self.chunk_size_bytes = chunk_size_mb.saturating_mul(1_000_000);
    }

    /// Set the number of threads removing run files after the merge. Zero uses all cores
    pub fn with_cleanup_tasks(&mut self, cleanup_tasks: usize) {
        self.cleanup_tasks = cleanup_tasks;
    }

    /// Path the sorted result is written to
    pub fn output(&self) -> PathBuf {
        match &self.output {
            Some(output) => output.clone(),
            None => sorted_path(&self.input),
        }
    }

    /// Sort the input file
    pub fn sort(&self) -> Result<SortSummary, anyhow::Error> {
        let file = File::open(&self.input)
            .map_err(|e| SortError::Input { path: self.input.clone(), source: e })?;
        self.sort_reader(file)
    }

    /// Sort records read from `input` instead of the input file
    pub fn sort_reader<R: Read>(&self, input: R) -> Result<SortSummary, anyhow::Error> {
        let config = self.create_config();
        Self::internal_sort(input, &config, &self.output())
            .with_context(|| format!("sort {}", self.input.display()))
    }

    /// Check that the input file is already sorted
    pub fn check(&self) -> Result<bool, anyhow::Error> {
        let config = self.create_config();
        let file = File::open(&self.input)
            .map_err(|e| SortError::Input { path: self.input.clone(), source: e })?;
        Self::internal_check(file, &config)
    }

    fn create_config(&self) -> Config {
        let mut cleanup_tasks = self.cleanup_tasks;
        if cleanup_tasks == 0 {
            cleanup_tasks = num_cpus::get();
        }

        Config::new(
            self.tmp.clone(),
            "csv-sort-run-".to_string(),
            ".csv".to_string(),
            cleanup_tasks,
            self.column,
            self.comparator,
            self.delimiter,
            self.chunk_size_bytes,
        )
    }

    fn get_rlimits() -> Result<(u64, u64), anyhow::Error> {
        getrlimit(Resource::NOFILE).with_context(|| "getrlimit")
    }

    fn set_rlimits(soft: u64, hard: u64) -> Result<(), anyhow::Error> {
        setrlimit(Resource::NOFILE, soft, hard)
            .with_context(|| format!("set rlimit NOFILE, soft: {}, hard: {}", soft, hard))?;
        Ok(())
    }

    /// Raise the NOFILE soft limit to hold `files` open files. The limit is process wide, so
    /// concurrent sorts share one baseline that the last of them restores.
    fn raise_open_files(files: usize) -> Result<(), anyhow::Error> {
        let mut state = NOFILE.lock().map_err(|_| anyhow!("rlimit NOFILE lock poisoned"))?;
        let (current_soft, current_hard) = Self::get_rlimits()?;
        log::debug!("Current rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
        if state.holders == 0 {
            state.baseline = Some((current_soft, current_hard));
        }
        let new_soft = min(max((files + 256) as u64, current_soft), current_hard);
        if new_soft > current_soft {
            log::info!("Set new rlimit NOFILE, soft: {}, hard: {}", new_soft, current_hard);
            Self::set_rlimits(new_soft, current_hard)?;
        }
        state.holders += 1;
        Ok(())
    }

    fn restore_open_files() -> Result<(), anyhow::Error> {
        let mut state = NOFILE.lock().map_err(|_| anyhow!("rlimit NOFILE lock poisoned"))?;
        state.holders = state.holders.saturating_sub(1);
        if state.holders > 0 {
            return Ok(());
        }
        if let Some((soft, hard)) = state.baseline.take() {
            let (current_soft, _) = Self::get_rlimits()?;
            if current_soft != soft {
                log::info!("Restore rlimit NOFILE, soft: {}, hard: {}", soft, hard);
                Self::set_rlimits(soft, hard)?;
            }
        }
        Ok(())
    }

    /// Run `f` with the NOFILE soft limit raised to hold `files` open files, then restore it.
    fn with_open_files<T>(files: usize, f: impl FnOnce() -> Result<T, anyhow::Error>) -> Result<T, anyhow::Error> {
        Self::raise_open_files(files)?;
        let result = f();
        let restored = Self::restore_open_files();
        let value = result?;
        restored?;
        Ok(value)
    }

    fn create_merged_file(output: &Path) -> Result<NamedTempFile, anyhow::Error> {
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut builder = Builder::new();
        builder.prefix(".csv-sort-").suffix(".merging");
        // created like any new file, 0666 less the umask
        #[cfg(unix)]
        builder.permissions(Permissions::from_mode(0o666));
        let merged_file = builder
            .tempfile_in(&dir)
            .map_err(|e| SortError::output(output, e))?;

        // a replaced output keeps its mode
        if let Ok(metadata) = fs::metadata(output) {
            merged_file.as_file()
                .set_permissions(metadata.permissions())
                .map_err(|e| SortError::output(output, e))?;
        }
        Ok(merged_file)
    }

    pub(crate) fn internal_check<R: Read>(input: R, config: &Config) -> Result<bool, anyhow::Error> {
        let column = config.column();
        let comparator = config.comparator();
        let mut previous: Option<Record> = None;
        for record in RecordReader::new(input, column, config.delimiter()) {
            let current = record?;
            if let Some(previous) = &previous {
                if comparator.compare(previous.key(column), current.key(column)) == Ordering::Greater {
                    return Ok(false);
                }
            }
            previous = Some(current);
        }
        Ok(true)
    }

    fn spill_and_merge<R: Read>(input: R, config: &Config, output: &Path, runs: &mut Vec<RunFile>) -> Result<usize, anyhow::Error> {
        let reader = RecordReader::new(input, config.column(), config.delimiter());
        RunBuilder::new(config).build(reader, runs)?;

        // the merged file is renamed over the output only once complete
        let merged_file = Self::create_merged_file(output)?;
        let (merged_file, records) = Self::with_open_files(
            runs.len(),
            || merge(runs.as_slice(), config, merged_file, output),
        )?;
        merged_file.persist(output)
            .map_err(|e| SortError::output(output, e.error))?;
        Ok(records)
    }

    fn internal_sort<R: Read>(input: R, config: &Config, output: &Path) -> Result<SortSummary, anyhow::Error> {
        log::info!(
            "Start sort, column: {}, comparator: {}, chunk size: {} bytes",
            config.column(),
            config.comparator().name(),
            config.chunk_size_bytes(),
        );
        let mut runs = Vec::new();
        let records = match Self::spill_and_merge(input, config, output, &mut runs) {
            Ok(records) => records,
            Err(e) => {
                discard_runs(&runs);
                return Err(e);
            }
        };

        let cleanup_failures = remove_runs(&runs, config)?;
        log::info!("Finish sort, records: {}, runs: {}, output: {}", records, runs.len(), output.display());
        Ok(SortSummary::new(output.to_path_buf(), records, runs.len(), cleanup_failures))
    }
}
