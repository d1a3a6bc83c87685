//! Concurrent search machinery.
//!
//! This module provides:
//! - `SearchState`: shared atomic counters and the one-shot stop signal
//! - `CpuWorker`: the generate, derive, match loop
//! - `Reporter`: sole writer of the append-only result log
//! - `StatusEmitter`: periodic progress sampling
//! - `Coordinator`: starts everything and enforces the shutdown order

mod cpu;
mod pool;
mod reporter;
mod state;
mod status;

pub use cpu::CpuWorker;
pub use pool::{Coordinator, MatchRecord, SearchSettings, SearchSummary};
pub use reporter::Reporter;
pub use state::{Admission, SearchState, Snapshot};
pub use status::{format_number, format_progress, StatusEmitter};
