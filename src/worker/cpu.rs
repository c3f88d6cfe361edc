//! CPU-based worker for the vanity search.

use crossbeam_channel::Sender;

use crate::crypto::{AddressDeriver, Candidate, CandidateSource, DerivedAddress};
use crate::error::{CryptoError, SearchError};
use crate::matcher::Pattern;

use super::{CancellationSignal, MatchResult};

/// Iterations between two progress messages.
pub const REPORT_BATCH: u64 = 1000;

/// Messages sent from workers to the coordinator.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Number of candidates checked since the previous report.
    Progress(u64),
    /// A candidate whose address satisfies the pattern.
    Found(MatchResult),
}

/// A CPU worker that generates candidates and tests them against the pattern.
pub struct SearchWorker<S> {
    /// Worker ID
    id: usize,
    pattern: Pattern,
    source: S,
    deriver: AddressDeriver,
    tx: Sender<WorkerMessage>,
    signal: CancellationSignal,
}

impl<S: CandidateSource> SearchWorker<S> {
    pub fn new(
        id: usize,
        pattern: Pattern,
        source: S,
        tx: Sender<WorkerMessage>,
        signal: CancellationSignal,
    ) -> Self {
        Self {
            id,
            pattern,
            source,
            deriver: AddressDeriver::new(),
            tx,
            signal,
        }
    }

    /// Runs the worker loop.
    ///
    /// Returns `Ok(())` when:
    /// - A match is found (sent through the channel, signal set)
    /// - The signal is set by someone else
    /// - The coordinator hung up
    ///
    /// Returns an error if the candidate source fails.
    pub fn run(mut self) -> Result<(), SearchError> {
        let mut local_count = 0u64;

        while !self.signal.is_cancelled() {
            let candidate = self
                .source
                .next_candidate()
                .map_err(|source| SearchError::Worker {
                    id: self.id,
                    source,
                })?;

            let address = match self.deriver.derive(&candidate) {
                Ok(address) => address,
                Err(CryptoError::InvalidCandidate) => continue,
                Err(source) => return Err(SearchError::Worker { id: self.id, source }),
            };

            local_count += 1;
            if local_count == REPORT_BATCH {
                if self.tx.send(WorkerMessage::Progress(local_count)).is_err() {
                    return Ok(());
                }
                local_count = 0;
            }

            if self.pattern.matches(&address) {
                self.publish(candidate, address);
                return Ok(());
            }
        }

        log::debug!("worker {} observed cancellation", self.id);
        Ok(())
    }

    fn publish(&self, candidate: Candidate, address: DerivedAddress) {
        log::debug!("worker {} found {}", self.id, address);
        let result = MatchResult {
            candidate,
            address,
            worker_id: self.id,
        };
        // Send before cancelling so the coordinator never sees the flag
        // without the match already queued.
        let _ = self.tx.send(WorkerMessage::Found(result));
        self.signal.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::OsCandidateSource;
    use crate::matcher::Position;
    use crossbeam_channel::unbounded;

    /// Replays a fixed list of candidates, then runs dry.
    struct ScriptedSource(Vec<Candidate>);

    impl CandidateSource for ScriptedSource {
        fn next_candidate(&mut self) -> Result<Candidate, CryptoError> {
            if self.0.is_empty() {
                return Err(CryptoError::EntropyUnavailable("script exhausted".into()));
            }
            Ok(self.0.remove(0))
        }
    }

    fn key(last: u8) -> Candidate {
        let mut bytes = [0u8; 32];
        bytes[31] = last;
        Candidate::from_bytes(bytes)
    }

    #[test]
    fn test_invalid_candidates_are_resampled() {
        let (tx, rx) = unbounded();
        let signal = CancellationSignal::new();
        // Private key 1 -> 0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf
        let source = ScriptedSource(vec![Candidate::from_bytes([0u8; 32]), key(1)]);
        let pattern = Pattern::new("7e5f", Position::Prefix, false);

        SearchWorker::new(0, pattern, source, tx, signal.clone())
            .run()
            .unwrap();

        assert!(signal.is_cancelled());
        match rx.try_recv().unwrap() {
            WorkerMessage::Found(result) => {
                assert_eq!(result.candidate, key(1));
                assert_eq!(result.address.as_str(), "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
                assert_eq!(result.worker_id, 0);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_entropy_failure_terminates_worker() {
        let (tx, rx) = unbounded();
        let signal = CancellationSignal::new();
        let pattern = Pattern::new("ffffffff", Position::Prefix, false);

        let err = SearchWorker::new(3, pattern, ScriptedSource(vec![key(1)]), tx, signal.clone())
            .run()
            .unwrap_err();

        assert!(matches!(
            err,
            SearchError::Worker { id: 3, source: CryptoError::EntropyUnavailable(_) }
        ));
        assert!(!signal.is_cancelled());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_cancelled_worker_exits_immediately() {
        let (tx, rx) = unbounded();
        let signal = CancellationSignal::new();
        signal.cancel();
        let pattern = Pattern::new("0", Position::Prefix, false);

        SearchWorker::new(0, pattern, ScriptedSource(Vec::new()), tx, signal)
            .run()
            .unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_progress_reported_in_batches() {
        let (tx, rx) = unbounded();
        let signal = CancellationSignal::new();
        // Unmatchable in practice: 40 fixed case-sensitive characters.
        let pattern = Pattern::new("F".repeat(40), Position::Prefix, true);
        let worker = SearchWorker::new(1, pattern, OsCandidateSource::new(), tx, signal.clone());

        let handle = std::thread::spawn(move || worker.run());
        let first = rx.recv_timeout(std::time::Duration::from_secs(30)).unwrap();
        signal.cancel();
        handle.join().unwrap().unwrap();

        assert!(matches!(first, WorkerMessage::Progress(REPORT_BATCH)));
    }

    #[test]
    fn test_worker_exits_when_coordinator_hangs_up() {
        let (tx, rx) = crossbeam_channel::bounded(0);
        drop(rx);
        let pattern = Pattern::new("F".repeat(40), Position::Prefix, true);
        let worker = SearchWorker::new(0, pattern, OsCandidateSource::new(), tx, CancellationSignal::new());
        assert!(worker.run().is_ok());
    }
}
