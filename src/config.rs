use std::path::PathBuf;

use crate::comparator::Comparator;

#[derive(Clone, Debug)]
pub(crate) struct Config {
    tmp: PathBuf,
    tmp_prefix: String,
    tmp_suffix: String,
    cleanup_tasks: usize,
    queue_size: usize,
    column: usize,
    comparator: Comparator,
    delimiter: u8,
    chunk_size_bytes: u64,
}

impl Config {
    pub(crate) fn new(
        tmp: PathBuf,
        tmp_prefix: String,
        tmp_suffix: String,
        cleanup_tasks: usize,
        column: usize,
        comparator: Comparator,
        delimiter: u8,
        chunk_size_bytes: u64,
    ) -> Config {
        let queue_size = 4096;
        Config {
            tmp,
            tmp_prefix,
            tmp_suffix,
            cleanup_tasks,
            queue_size,
            column,
            comparator,
            delimiter,
            chunk_size_bytes,
        }
    }

    pub(crate) fn tmp(&self) -> &PathBuf {
        &self.tmp
    }

    pub(crate) fn tmp_prefix(&self) -> &String {
        &self.tmp_prefix
    }

    pub(crate) fn tmp_suffix(&self) -> &String {
        &self.tmp_suffix
    }

    pub(crate) fn cleanup_tasks(&self) -> usize {
        self.cleanup_tasks
    }

    pub(crate) fn queue_size(&self) -> usize {
        self.queue_size
    }

    pub(crate) fn column(&self) -> usize {
        self.column
    }

    pub(crate) fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub(crate) fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub(crate) fn chunk_size_bytes(&self) -> u64 {
        self.chunk_size_bytes
    }
}
