//! Worker pool for the parallel vanity search.
//!
//! This module provides:
//! - Multi-threaded CPU workers
//! - The shared cancellation signal
//! - The coordinator that aggregates progress and accepts the first match
//!
//! ## Future Extensions
//! - GPU workers (OpenCL/CUDA)

mod cpu;
mod pool;
mod signal;

pub use cpu::{SearchWorker, WorkerMessage, REPORT_BATCH};
pub use pool::{MatchResult, SearchCoordinator, SearchOutcome, SearchStats};
pub use signal::CancellationSignal;
