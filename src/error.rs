use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures the sort can report.
///
/// Fallible operations return [anyhow::Error]; the underlying [SortError] can be recovered with
/// `error.downcast_ref::<SortError>()` to tell input problems from output problems.
#[derive(Debug, Error)]
pub enum SortError {
    /// The input could not be opened or read.
    #[error("failed to read input: {}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A record could not be decoded, either invalid CSV quoting or invalid UTF-8.
    #[error("malformed record {record}")]
    MalformedRecord {
        record: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A record does not have the column the sort is keyed on.
    #[error("record at line {line} has {fields} fields, sort column {column} is out of range")]
    ColumnOutOfRange {
        line: u64,
        fields: usize,
        column: usize,
    },

    /// The sorted output or an intermediate run could not be created or written.
    #[error("failed to write: {}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An intermediate run was not removed after a successful merge. Not fatal.
    #[error("failed to remove run file: {}", path.display())]
    RunCleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SortError {
    pub(crate) fn output(path: impl Into<PathBuf>, source: impl Into<io::Error>) -> SortError {
        SortError::Output {
            path: path.into(),
            source: source.into(),
        }
    }
}
