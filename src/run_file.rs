use std::path::PathBuf;

/// A sorted run written by the spill phase.
#[derive(Debug, Clone)]
pub(crate) struct RunFile {
    path: PathBuf,
    sequence: usize,
    records: usize,
    bytes: u64,
}

impl RunFile {
    pub(crate) fn new(path: PathBuf, sequence: usize, records: usize, bytes: u64) -> RunFile {
        RunFile {
            path,
            sequence,
            records,
            bytes,
        }
    }

    pub(crate) fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Position of the run in input order
    pub(crate) fn sequence(&self) -> usize {
        self.sequence
    }

    pub(crate) fn records(&self) -> usize {
        self.records
    }

    pub(crate) fn bytes(&self) -> u64 {
        self.bytes
    }
}
