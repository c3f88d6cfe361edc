//! Search coordination: spawning workers, aggregating progress and
//! handing off the first match.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};

use crate::config::SearchConfig;
use crate::crypto::{Candidate, CandidateSource, DerivedAddress, OsCandidateSource};
use crate::error::{Result, SearchError};
use crate::matcher::Pattern;

use super::cpu::{SearchWorker, WorkerMessage};
use super::CancellationSignal;

/// Channel slots per worker. Progress messages are rare (one per batch), so
/// this only has to absorb scheduling hiccups.
const CHANNEL_SLOTS_PER_WORKER: usize = 16;

const MAX_CHANNEL_CAPACITY: usize = 4096;

/// The winning candidate of a search run.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The private key
    pub candidate: Candidate,
    /// The checksummed address with 0x prefix
    pub address: DerivedAddress,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

impl MatchResult {
    /// The private key (hex encoded, no 0x prefix)
    pub fn private_key_hex(&self) -> String {
        self.candidate.to_hex()
    }
}

/// Aggregated progress of a search run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchStats {
    /// Candidates checked, as reported by workers so far
    pub attempts: u64,
    pub elapsed: Duration,
}

impl SearchStats {
    /// Returns the generation rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            self.attempts as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// How a search run ended.
#[derive(Debug)]
pub enum SearchOutcome {
    Found {
        result: MatchResult,
        stats: SearchStats,
    },
    /// Stopped through the cancellation signal before any match.
    Cancelled { stats: SearchStats },
}

impl SearchOutcome {
    pub fn stats(&self) -> &SearchStats {
        match self {
            SearchOutcome::Found { stats, .. } | SearchOutcome::Cancelled { stats } => stats,
        }
    }

    pub fn into_match(self) -> Option<MatchResult> {
        match self {
            SearchOutcome::Found { result, .. } => Some(result),
            SearchOutcome::Cancelled { .. } => None,
        }
    }
}

struct WorkerHandle {
    id: usize,
    handle: JoinHandle<Result<()>>,
}

/// Owns the worker threads, the shared cancellation signal and the
/// receiving end of the worker channel.
pub struct SearchCoordinator {
    config: SearchConfig,
    handles: Vec<WorkerHandle>,
    rx: Receiver<WorkerMessage>,
    signal: CancellationSignal,
    /// Workers that ended with an error or a panic
    failed: usize,
    start_time: Instant,
}

impl SearchCoordinator {
    /// Validates `config` and spawns workers drawing from the OS RNG.
    pub fn new(config: SearchConfig) -> Result<Self> {
        Self::with_source(config, |_| OsCandidateSource::new())
    }

    /// Validates `config` and spawns one worker per source produced by
    /// `make_source` (called with the worker ID).
    pub fn with_source<S, F>(config: SearchConfig, make_source: F) -> Result<Self>
    where
        S: CandidateSource + Send + 'static,
        F: Fn(usize) -> S,
    {
        config.validate()?;

        let num_workers = config.worker_count();
        let (tx, rx) = bounded(
            num_workers
                .saturating_mul(CHANNEL_SLOTS_PER_WORKER)
                .min(MAX_CHANNEL_CAPACITY),
        );
        let signal = CancellationSignal::new();
        let pattern = Pattern::from_config(&config);

        let mut coordinator = Self {
            config,
            handles: Vec::with_capacity(num_workers),
            rx,
            signal,
            failed: 0,
            start_time: Instant::now(),
        };

        for id in 0..num_workers {
            let worker = SearchWorker::new(
                id,
                pattern.clone(),
                make_source(id),
                tx.clone(),
                coordinator.signal.clone(),
            );

            // On error the coordinator is dropped, which stops and joins the
            // workers spawned so far.
            let handle = thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || worker.run())?;
            coordinator.handles.push(WorkerHandle { id, handle });
        }

        // Only workers hold senders now, so disconnection means all exited.
        drop(tx);
        log::info!("spawned {} search workers", num_workers);

        coordinator.start_time = Instant::now();
        Ok(coordinator)
    }

    /// Runs the search until a match, cancellation or loss of every worker.
    pub fn run(self) -> Result<SearchOutcome> {
        self.run_with(|stats| {
            log::info!(
                "{:.0} keys/s, {} keys checked",
                stats.keys_per_second(),
                stats.attempts
            );
        })
    }

    /// Like [`run`](Self::run), calling `on_progress` once per report interval.
    pub fn run_with<F>(mut self, mut on_progress: F) -> Result<SearchOutcome>
    where
        F: FnMut(&SearchStats),
    {
        let mut attempts = 0u64;
        let mut accepted: Option<MatchResult> = None;
        let mut last_report = Instant::now();

        loop {
            match self.rx.recv_timeout(self.config.poll_interval()) {
                Ok(WorkerMessage::Progress(count)) => attempts += count,
                Ok(WorkerMessage::Found(result)) => {
                    self.signal.cancel();
                    accepted = Some(result);
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if self.signal.is_cancelled() {
                break;
            }

            self.reap_finished();
            if self.handles.is_empty() {
                break;
            }

            if last_report.elapsed() >= self.config.report_interval() {
                on_progress(&self.stats(attempts));
                last_report = Instant::now();
            }
        }

        // A worker queues its match before raising the signal, so anything
        // it found is already in the channel.
        if accepted.is_none() {
            accepted = self.drain(&mut attempts);
        }

        let cancelled = self.signal.is_cancelled();
        self.shutdown();
        let stats = self.stats(attempts);

        match accepted {
            Some(result) => {
                log::info!("worker {} found {}", result.worker_id, result.address);
                Ok(SearchOutcome::Found { result, stats })
            }
            None if cancelled => Ok(SearchOutcome::Cancelled { stats }),
            None => Err(SearchError::SearchUnavailable {
                failed: self.failed,
            }),
        }
    }

    /// Empties the channel without blocking, keeping the first match.
    fn drain(&self, attempts: &mut u64) -> Option<MatchResult> {
        let mut accepted = None;
        while let Ok(message) = self.rx.try_recv() {
            match message {
                WorkerMessage::Progress(count) => *attempts += count,
                WorkerMessage::Found(result) if accepted.is_none() => accepted = Some(result),
                WorkerMessage::Found(result) => {
                    log::debug!("discarding later match from worker {}", result.worker_id);
                }
            }
        }
        accepted
    }

    /// Joins workers that already exited and records failures.
    fn reap_finished(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) = self
            .handles
            .drain(..)
            .partition(|worker| worker.handle.is_finished());
        self.handles = running;

        for worker in finished {
            if self.join_worker(worker) {
                log::warn!(
                    "search continues with {} of {} workers",
                    self.handles.len(),
                    self.config.worker_count()
                );
            }
        }
    }

    /// Joins one worker; returns `true` if it ended with an error or a panic.
    fn join_worker(&mut self, worker: WorkerHandle) -> bool {
        match worker.handle.join() {
            Ok(Ok(())) => {
                log::debug!("worker {} exited", worker.id);
                return false;
            }
            Ok(Err(e)) => log::error!("{}", e),
            Err(_) => log::error!("worker {} panicked", worker.id),
        }
        self.failed += 1;
        true
    }

    /// Signals every worker, hangs up the channel and joins all threads.
    fn shutdown(&mut self) {
        self.signal.cancel();
        // Dropping the receiver unblocks any worker stuck on a full channel.
        self.rx = crossbeam_channel::never();
        for worker in std::mem::take(&mut self.handles) {
            self.join_worker(worker);
        }
    }

    fn stats(&self, attempts: u64) -> SearchStats {
        SearchStats {
            attempts,
            elapsed: self.elapsed(),
        }
    }

    /// Returns a handle that stops the search when cancelled.
    pub fn cancellation(&self) -> CancellationSignal {
        self.signal.clone()
    }

    /// Returns the elapsed time since the workers were started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptoError;
    use crate::matcher::Position;

    struct FailingSource;

    impl CandidateSource for FailingSource {
        fn next_candidate(&mut self) -> std::result::Result<Candidate, CryptoError> {
            Err(CryptoError::EntropyUnavailable("no entropy".into()))
        }
    }

    /// Always yields private key 1 (address 0x7E5F4552...).
    struct FixedSource;

    impl CandidateSource for FixedSource {
        fn next_candidate(&mut self) -> std::result::Result<Candidate, CryptoError> {
            let mut bytes = [0u8; 32];
            bytes[31] = 1;
            Ok(Candidate::from_bytes(bytes))
        }
    }

    #[test]
    fn test_all_workers_failing_is_unavailable() {
        let config = SearchConfig::new("dead", Position::Prefix, false, 4).unwrap();
        let coordinator = SearchCoordinator::with_source(config, |_| FailingSource).unwrap();
        match coordinator.run() {
            Err(SearchError::SearchUnavailable { failed }) => assert_eq!(failed, 4),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_join_worker_flags_only_failures() {
        let config = SearchConfig::new("dead", Position::Prefix, false, 1).unwrap();
        let mut coordinator = SearchCoordinator::with_source(config, |_| FailingSource).unwrap();

        let clean = WorkerHandle {
            id: 7,
            handle: thread::spawn(|| Ok(())),
        };
        let broken = WorkerHandle {
            id: 8,
            handle: thread::spawn(|| {
                Err(SearchError::Worker {
                    id: 8,
                    source: CryptoError::EntropyUnavailable("gone".into()),
                })
            }),
        };

        assert!(!coordinator.join_worker(clean));
        assert_eq!(coordinator.failed, 0);
        assert!(coordinator.join_worker(broken));
        assert_eq!(coordinator.failed, 1);
    }

    #[test]
    fn test_duplicate_matches_resolve_to_one() {
        let config = SearchConfig::new("7e5f", Position::Prefix, false, 8).unwrap();
        let coordinator = SearchCoordinator::with_source(config, |_| FixedSource).unwrap();
        let result = coordinator.run().unwrap().into_match().unwrap();
        assert_eq!(result.address.as_str(), "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
        assert!(result.worker_id < 8);
    }

    #[test]
    fn test_cancel_before_run() {
        let config = SearchConfig::new("F".repeat(40), Position::Prefix, true, 2).unwrap();
        let coordinator = SearchCoordinator::new(config).unwrap();
        coordinator.cancellation().cancel();
        assert!(matches!(
            coordinator.run().unwrap(),
            SearchOutcome::Cancelled { .. }
        ));
    }

    #[test]
    fn test_stats_rate() {
        let stats = SearchStats {
            attempts: 5000,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(stats.keys_per_second(), 2500.0);

        let idle = SearchStats {
            attempts: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(idle.keys_per_second(), 0.0);
    }
}
