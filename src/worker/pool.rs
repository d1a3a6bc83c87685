//! Search coordination: workers, reporter and status emitter.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::bounded;
use tracing::{error, info};

use crate::error::{Result, SearchError};
use crate::matcher::MatchSpec;

use super::cpu::CpuWorker;
use super::reporter::Reporter;
use super::state::SearchState;
use super::status::StatusEmitter;

/// One accepted match, as written to the result log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// The private key (hex encoded, no 0x prefix)
    pub private_key: String,
    /// The address (checksummed with 0x prefix)
    pub address: String,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Private Key: {}, Address: {}", self.private_key, self.address)
    }
}

/// Immutable parameters of one search run.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub spec: MatchSpec,
    /// Number of worker threads
    pub workers: usize,
    /// The search stops once more than this many matches are found
    pub limit: u64,
    /// Append-only result log
    pub output: PathBuf,
    pub status_interval: Duration,
    /// Capacity of the result queue. A worker blocks in `send` while the
    /// queue holds this many unreported matches.
    pub queue_capacity: usize,
}

/// Final counters of a finished search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSummary {
    /// Derivations performed
    pub generated: u64,
    /// Matches counted, including ones dropped past the limit
    pub found: u64,
    /// Lines appended to the result log
    pub written: u64,
    pub elapsed: Duration,
}

/// Runs a search to completion.
///
/// Shutdown order: workers observe the stop signal and exit, dropping their
/// queue senders; the queue closes only once the last worker is gone; the
/// reporter drains what is left and returns; the status emitter is released
/// last.
pub struct Coordinator {
    settings: SearchSettings,
    state: Arc<SearchState>,
}

impl Coordinator {
    pub fn new(settings: SearchSettings) -> Self {
        let state = Arc::new(SearchState::new(settings.limit));
        Self { settings, state }
    }

    /// Shared state handle, e.g. for a Ctrl-C handler to raise the stop
    /// signal.
    pub fn state(&self) -> Arc<SearchState> {
        Arc::clone(&self.state)
    }

    /// Blocks until every worker has stopped and the queue is drained.
    ///
    /// On any fatal error the stop signal is raised, every thread is joined
    /// and the root cause is returned: a reporter failure first, otherwise
    /// the first worker failure.
    pub fn run(self) -> Result<SearchSummary> {
        let reporter = Reporter::open(&self.settings.output)?;
        let (result_tx, result_rx) = bounded(self.settings.queue_capacity.max(1));
        let (done_tx, done_rx) = bounded::<()>(0);

        let reporter_handle = {
            let state = Arc::clone(&self.state);
            spawn("vanity-reporter", move || {
                let result = reporter.run(result_rx);
                if result.is_err() {
                    state.stop();
                }
                result
            })?
        };

        let status_handle = {
            let emitter = StatusEmitter::new(Arc::clone(&self.state), self.settings.status_interval);
            match spawn("vanity-status", move || {
                emitter.run(done_rx);
                Ok(())
            }) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    // progress output is optional
                    error!("status emitter unavailable: {}", e);
                    None
                }
            }
        };

        let spec = Arc::new(self.settings.spec.clone());
        let mut worker_handles = Vec::with_capacity(self.settings.workers);
        let mut first_error = None;

        for id in 0..self.settings.workers {
            let worker = CpuWorker::new(
                id,
                Arc::clone(&spec),
                result_tx.clone(),
                Arc::clone(&self.state),
            );
            let state = Arc::clone(&self.state);
            let spawned = spawn(&format!("vanity-worker-{}", id), move || {
                let result = worker.run();
                if let Err(e) = &result {
                    error!(worker = worker.id(), "worker failed: {}", e);
                    state.stop();
                }
                result
            });

            match spawned {
                Ok(handle) => worker_handles.push(handle),
                Err(e) => {
                    self.state.stop();
                    first_error = Some(e);
                    break;
                }
            }
        }
        info!(workers = worker_handles.len(), "search running");

        // Workers now hold the only senders.
        drop(result_tx);

        for handle in worker_handles {
            if let Err(e) = join(handle) {
                first_error.get_or_insert(e);
            }
        }

        let reporter_result = join(reporter_handle);

        drop(done_tx);
        if let Some(handle) = status_handle {
            if let Err(e) = join(handle) {
                error!("status emitter failed: {}", e);
            }
        }

        let written = reporter_result?;
        if let Some(e) = first_error {
            return Err(e);
        }

        let snapshot = self.state.snapshot();
        info!(
            generated = snapshot.generated,
            found = snapshot.found,
            written,
            "search finished"
        );

        Ok(SearchSummary {
            generated: snapshot.generated,
            found: snapshot.found,
            written,
            elapsed: snapshot.elapsed,
        })
    }
}

fn spawn<T, F>(name: &str, f: F) -> Result<JoinHandle<Result<T>>>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .map_err(SearchError::Spawn)
}

fn join<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    let name = handle.thread().name().unwrap_or("unnamed").to_string();
    handle
        .join()
        .map_err(|_| SearchError::WorkerPanicked(name))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::AffixSet;
    use std::fs;
    use tempfile::tempdir;

    fn settings(spec: MatchSpec, workers: usize, limit: u64, output: PathBuf) -> SearchSettings {
        SearchSettings {
            spec,
            workers,
            limit,
            output,
            status_interval: Duration::from_secs(60),
            queue_capacity: workers,
        }
    }

    #[test]
    fn test_record_display() {
        let record = MatchRecord {
            private_key: "01".repeat(32),
            address: "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf".into(),
            worker_id: 3,
        };
        assert_eq!(
            record.to_string(),
            format!(
                "Private Key: {}, Address: 0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
                "01".repeat(32)
            )
        );
    }

    #[test]
    fn test_run_writes_exactly_limit_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let spec = MatchSpec::PrefixSuffix(AffixSet::new(["0x"], [""]));

        let summary = Coordinator::new(settings(spec, 4, 25, path.clone()))
            .run()
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 25);
        assert_eq!(summary.written, 25);
        assert!(summary.found > 25);
        assert!(summary.found <= 25 + 4);
        assert!(summary.generated >= summary.found);
    }

    #[test]
    fn test_missing_output_dir_fails_before_search() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("results.txt");
        let spec = MatchSpec::AdjacentRun { length: 40 };

        let coordinator = Coordinator::new(settings(spec, 2, 1, path));
        let state = coordinator.state();
        let err = coordinator.run().unwrap_err();

        assert!(matches!(err, SearchError::LogOpen { .. }));
        assert_eq!(state.total_generated(), 0);
    }

    #[test]
    fn test_external_stop_drains_cleanly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.txt");
        // effectively never matches
        let spec = MatchSpec::AdjacentRun { length: 40 };

        let coordinator = Coordinator::new(settings(spec, 2, 1, path.clone()));
        let state = coordinator.state();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            state.stop();
        });

        let summary = coordinator.run().unwrap();
        stopper.join().unwrap();

        assert_eq!(summary.written, 0);
        assert_eq!(summary.found, 0);
        assert!(path.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_log_write_failure_is_root_cause() {
        // /dev/full opens fine but every write fails with ENOSPC
        let spec = MatchSpec::PrefixSuffix(AffixSet::new(["0x"], [""]));
        let coordinator = Coordinator::new(settings(spec, 4, 1_000_000, PathBuf::from("/dev/full")));
        let state = coordinator.state();

        let err = coordinator.run().unwrap_err();

        assert!(matches!(err, SearchError::LogWrite { .. }), "got {:?}", err);
        assert!(state.is_stopped());
        assert!(state.total_found() >= 1);
        assert!(state.total_found() < 1_000_000);
    }
}
