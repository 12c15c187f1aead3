use std::cmp::{max, min};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use command_executor::command::Command;
use command_executor::shutdown_mode::ShutdownMode;
use command_executor::thread_pool_builder::ThreadPoolBuilder;

use crate::config::Config;
use crate::error::SortError;
use crate::run_file::RunFile;

/// Removes one run file. Failures are collected rather than returned so that every run gets its
/// removal attempt.
pub(crate) struct CleanupCommand {
    path: PathBuf,
    failures: Arc<Mutex<Vec<SortError>>>,
}

impl CleanupCommand {
    pub(crate) fn new(path: PathBuf, failures: Arc<Mutex<Vec<SortError>>>) -> CleanupCommand {
        CleanupCommand {
            path,
            failures,
        }
    }
}

impl Command for CleanupCommand {
    fn execute(&self) -> Result<(), anyhow::Error> {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!("Failed to remove run file {}: {}", self.path.display(), e);
            self.failures
                .lock()
                .map_err(|_| anyhow!("cleanup failures lock poisoned"))?
                .push(SortError::RunCleanup { path: self.path.clone(), source: e });
        }
        Ok(())
    }
}

/// Remove all run files in parallel and wait until every removal has finished.
///
/// Returns the removals that failed. Those leave residue on disk but do not invalidate the
/// sorted output.
pub(crate) fn remove_runs(runs: &[RunFile], config: &Config) -> Result<Vec<SortError>, anyhow::Error> {
    if runs.is_empty() {
        return Ok(Vec::new());
    }

    let failures: Arc<Mutex<Vec<SortError>>> = Arc::new(Mutex::new(Vec::new()));
    let tasks = max(1, min(config.cleanup_tasks(), runs.len()));
    log::debug!("Removing {} run files, tasks: {}", runs.len(), tasks);

    let mut thread_pool_builder = ThreadPoolBuilder::new();
    let mut cleanup_pool = thread_pool_builder
        .with_name("cleanup".to_string())
        .with_tasks(tasks)
        .with_queue_size(config.queue_size())
        .with_shutdown_mode(ShutdownMode::CompletePending)
        .build()?;

    for run in runs {
        let command = Box::new(CleanupCommand::new(run.path().clone(), failures.clone()));
        cleanup_pool.submit(command);
    }
    cleanup_pool.shutdown();
    cleanup_pool.join()?;

    let mut failures_guard = failures
        .lock()
        .map_err(|_| anyhow!("cleanup failures lock poisoned"))?;
    Ok(std::mem::take(&mut *failures_guard))
}

/// Best effort removal of runs left behind by a failed sort.
pub(crate) fn discard_runs(runs: &[RunFile]) {
    for run in runs {
        if let Err(e) = std::fs::remove_file(run.path()) {
            log::warn!("Failed to remove run file {} after failed sort: {}", run.path().display(), e);
        }
    }
}
