//! Pattern matching for derived addresses.
//!
//! Supports three policies:
//! - PrefixSuffix: any prefix and any suffix from two independent sets
//! - KeyMutation: prefix/suffix over the 16 last-character variants of a key
//! - AdjacentRun: N identical characters right after `0x`

mod policy;

pub use policy::{adjacent_run, AffixSet, MatchMode, MatchResult, MatchSpec};
