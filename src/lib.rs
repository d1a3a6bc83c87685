//! # vanity_search
//!
//! Brute-force search for Ethereum keys whose address matches a cosmetic
//! pattern.
//!
//! ## Architecture
//!
//! - `crypto`: Seed generation and address derivation
//! - `matcher`: Prefix/suffix, key-mutation and adjacent-run policies
//! - `worker`: Worker pool, shared state, reporter and status output
//! - `config`: Command line configuration
//! - `error`: Fatal error types

pub mod config;
pub mod crypto;
pub mod error;
pub mod matcher;
pub mod worker;

pub use config::{Config, ConfigError};
pub use crypto::{Address, Deriver, Keypair, MutationAlphabet, Seed};
pub use error::{Result, SearchError};
pub use matcher::{AffixSet, MatchMode, MatchResult, MatchSpec};
pub use worker::{Coordinator, MatchRecord, SearchSettings, SearchState, SearchSummary};
