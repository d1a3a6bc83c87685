//! Fatal error taxonomy for the search.
//!
//! Nothing here is retried. Every variant ends the search: the coordinator
//! raises the stop signal, joins its threads and hands the error to `main`.

use std::io;
use std::path::PathBuf;

/// Errors that abort a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The OS entropy source failed to produce seed bytes.
    #[error("entropy source failure: {0}")]
    Entropy(#[from] rand::Error),

    /// A seed could not be used as a secp256k1 secret key.
    #[error("seed is not a valid private key: {0}")]
    Derivation(#[from] secp256k1::Error),

    /// The result log could not be opened.
    #[error("cannot open result log {}: {source}", path.display())]
    LogOpen { path: PathBuf, source: io::Error },

    /// Appending to the result log failed.
    #[error("cannot append to result log {}: {source}", path.display())]
    LogWrite { path: PathBuf, source: io::Error },

    /// A worker tried to enqueue a match after the result queue closed.
    #[error("result queue closed while a worker was still enqueueing")]
    QueueClosed,

    /// A spawned thread panicked instead of returning an error.
    #[error("thread {0} panicked")]
    WorkerPanicked(String),

    /// A thread could not be spawned.
    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
