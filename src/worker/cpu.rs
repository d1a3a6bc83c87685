//! CPU worker running the generate, derive, match loop.

use std::sync::Arc;

use crossbeam_channel::Sender;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::crypto::{Deriver, MutationAlphabet, Seed};
use crate::error::{Result, SearchError};
use crate::matcher::MatchSpec;

use super::state::{Admission, SearchState};
use super::MatchRecord;

/// A CPU worker that generates seeds and tests their addresses.
pub struct CpuWorker {
    /// Worker ID
    id: usize,
    /// What counts as a hit
    spec: Arc<MatchSpec>,
    /// Per-worker secp256k1 context
    deriver: Deriver,
    /// Queue into the reporter
    result_tx: Sender<MatchRecord>,
    /// Shared counters and stop signal
    state: Arc<SearchState>,
}

impl CpuWorker {
    pub fn new(
        id: usize,
        spec: Arc<MatchSpec>,
        result_tx: Sender<MatchRecord>,
        state: Arc<SearchState>,
    ) -> Self {
        Self {
            id,
            spec,
            deriver: Deriver::new(),
            result_tx,
            state,
        }
    }

    /// Runs until the stop signal is observed or a fatal error occurs.
    ///
    /// The signal is checked once per round, so a round in progress always
    /// finishes. Errors are returned as-is; raising the stop signal for the
    /// other threads is left to the caller.
    pub fn run(&self) -> Result<()> {
        debug!(worker = self.id, "worker started");

        while !self.state.is_stopped() {
            let seed = Seed::generate()?;
            self.state.add_generated(self.spec.fan_out());

            match self.spec.as_ref() {
                MatchSpec::KeyMutation { alphabet, .. } => self.test_siblings(&seed, alphabet)?,
                _ => self.test(&seed)?,
            }
        }

        debug!(worker = self.id, "worker stopped");
        Ok(())
    }

    /// Derives all 16 siblings of `seed` in parallel and waits for every one.
    fn test_siblings(&self, seed: &Seed, alphabet: &MutationAlphabet) -> Result<()> {
        let siblings = seed.siblings(alphabet);
        siblings.par_iter().try_for_each(|sibling| self.test(sibling))
    }

    fn test(&self, seed: &Seed) -> Result<()> {
        let keypair = self.deriver.derive(seed)?;
        let address = keypair.address().to_checksum();

        if !self.spec.matches(&address).is_match() {
            return Ok(());
        }

        match self.state.record_match() {
            Admission::Accepted => {
                let record = MatchRecord {
                    private_key: keypair.private_key_hex(),
                    address,
                    worker_id: self.id,
                };
                // Blocks while the queue is full.
                self.result_tx
                    .send(record)
                    .map_err(|_| SearchError::QueueClosed)
            }
            Admission::LimitExceeded => {
                trace!(worker = self.id, "match past limit dropped");
                Ok(())
            }
        }
    }

    /// Returns the worker ID.
    pub fn id(&self) -> usize {
        self.id
    }
}
