//! This crate sorts CSV files by a single column, including files far larger than the available
//! memory.
//!
//! Sorting is done in two phases. The spill phase reads the input in batches bounded by a byte
//! budget, sorts every batch in memory and writes it to a temporary run file. The merge phase
//! then streams all runs through a min-heap into the sorted output, removes the run files and
//! only then reports success. Values of the sort column are compared as strings, integers or
//! floating point numbers, see [comparator::Comparator].
//!
//! Records with equal keys keep their input order.
//!
//! # Examples
//! ```
//! use std::path::PathBuf;
//! use csv_file_sort::comparator::Comparator;
//! use csv_file_sort::sort::Sort;
//!
//! fn sort_by_price(input: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
//!     let mut csv_sort = Sort::new(input, 3);
//!     csv_sort.with_comparator(Comparator::Float);
//!
//!     // set the directory for intermediate runs. The default is the current working directory,
//!     // for large files it is recommended to provide a dedicated directory with enough space
//!     // for a full copy of the input.
//!     csv_sort.with_tmp_dir(tmp);
//!
//!     // in-memory batch size, the default is 256 MiB
//!     csv_sort.with_chunk_size_mb(64);
//!
//!     let summary = csv_sort.sort()?;
//!     for failure in summary.cleanup_failures() {
//!         eprintln!("{failure}");
//!     }
//!     Ok(())
//! }
//! ```
//!

pub(crate) mod config;
pub(crate) mod run_file;
pub(crate) mod run_builder;
pub(crate) mod run_stream;
pub(crate) mod run_heap;
pub(crate) mod merge;
pub(crate) mod cleanup_command;

pub mod sort;
pub mod comparator;
pub mod error;
pub mod record;
pub mod record_reader;
pub mod quote_check;
