//! Bounded-concurrency batch runner for per-file jobs.
//!
//! Jobs are CPU-bound raster work, so each one runs on the blocking pool via
//! `spawn_blocking`. A semaphore caps how many run at once. Results are
//! streamed to a callback as they complete and returned in input order.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Outcome of one job.
#[derive(Debug)]
pub struct BatchEntry<T> {
    /// Path the job ran on
    pub path: PathBuf,

    /// Job value, or the error message if it failed or panicked
    pub outcome: Result<T, String>,
}

impl<T> BatchEntry<T> {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Run `job` over every path with at most `parallel` jobs in flight.
///
/// `on_result` is called once per path in completion order, after the job's
/// permit is released. A failing or panicking job never stops the batch.
pub async fn run_batch<T, E, J, F>(
    paths: Vec<PathBuf>,
    parallel: usize,
    job: J,
    on_result: F,
) -> Vec<BatchEntry<T>>
where
    T: Send + 'static,
    E: Display + Send + 'static,
    J: Fn(&Path) -> Result<T, E> + Send + Sync + 'static,
    F: Fn(&Path, &Result<T, String>) + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(parallel.max(1)));
    let job = Arc::new(job);
    let on_result = Arc::new(on_result);
    let mut handles = Vec::with_capacity(paths.len());

    for path in paths {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            tracing::warn!("Batch semaphore closed unexpectedly, stopping batch");
            break;
        };

        let job = job.clone();
        let on_result = on_result.clone();
        let job_path = path.clone();

        let handle = tokio::spawn(async move {
            let outcome = match tokio::task::spawn_blocking(move || job(&job_path)).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => {
                    tracing::error!("Worker for {:?} panicked: {e}", path);
                    Err(format!("Worker panicked: {e}"))
                }
            };
            drop(permit);
            on_result(&path, &outcome);
            BatchEntry { path, outcome }
        });
        handles.push(handle);
    }

    let mut entries = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(entry) => entries.push(entry),
            // Only reachable if the callback itself panicked.
            Err(e) => tracing::error!("Batch task failed: {e}"),
        }
    }
    entries
}
