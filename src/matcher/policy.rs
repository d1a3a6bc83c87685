//! Match policies over textual addresses.

use std::fmt;
use std::str::FromStr;

use crate::crypto::{MutationAlphabet, ADDRESS_MARKER, ADDRESS_STR_LEN};

/// Selects which policy a search runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Any configured prefix and any configured suffix
    #[default]
    PrefixSuffix,
    /// 16 last-character variants of one base key, each tested by prefix/suffix
    KeyMutation,
    /// A run of identical characters right after the marker
    AdjacentRun,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prefix-suffix" | "prefixsuffix" | "affix" => Ok(MatchMode::PrefixSuffix),
            "key-mutation" | "keymutation" | "mutation" | "16" => Ok(MatchMode::KeyMutation),
            "adjacent-run" | "adjacentrun" | "run" => Ok(MatchMode::AdjacentRun),
            _ => Err(format!("Unknown match mode: {}", s)),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::PrefixSuffix => write!(f, "prefix-suffix"),
            MatchMode::KeyMutation => write!(f, "key-mutation"),
            MatchMode::AdjacentRun => write!(f, "adjacent-run"),
        }
    }
}

/// Result of a pattern match operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Match,
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

impl From<bool> for MatchResult {
    #[inline]
    fn from(matched: bool) -> Self {
        if matched {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }
}

/// Independent prefix and suffix sets.
///
/// Prefixes are compared against the whole lowercased address, marker
/// included. An address matches when some prefix and some suffix both hold;
/// they need not come from the same position in their lists. An empty list
/// leaves that side unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffixSet {
    prefixes: Vec<String>,
    suffixes: Vec<String>,
}

impl AffixSet {
    pub fn new<P, S>(prefixes: P, suffixes: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let normalize = |s: String| s.to_lowercase();
        let mut prefixes: Vec<String> = prefixes.into_iter().map(|p| normalize(p.into())).collect();
        let mut suffixes: Vec<String> = suffixes.into_iter().map(|s| normalize(s.into())).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        suffixes.sort_unstable();
        suffixes.dedup();

        Self { prefixes, suffixes }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    #[inline]
    pub fn matches(&self, address: &str) -> MatchResult {
        check_length(address);
        let lower = address.to_ascii_lowercase();

        let prefix_ok =
            self.prefixes.is_empty() || self.prefixes.iter().any(|p| lower.starts_with(p.as_str()));
        let suffix_ok =
            self.suffixes.is_empty() || self.suffixes.iter().any(|s| lower.ends_with(s.as_str()));

        (prefix_ok && suffix_ok).into()
    }

    /// Probability that a uniformly random address passes.
    fn probability(&self) -> f64 {
        side_probability(&self.prefixes, ADDRESS_MARKER.len())
            * side_probability(&self.suffixes, 0)
    }
}

/// Chance that any pattern in `patterns` holds, ignoring overlaps between
/// patterns. `skip` characters of each pattern are fixed (the marker).
fn side_probability(patterns: &[String], skip: usize) -> f64 {
    if patterns.is_empty() {
        return 1.0;
    }
    let sum: f64 = patterns
        .iter()
        .map(|p| 16f64.powi(-(p.len().saturating_sub(skip) as i32)))
        .sum();
    sum.min(1.0)
}

/// Passes when the `length` characters after the marker are all equal.
///
/// The run must start at the first address character; a run elsewhere in
/// the address does not count.
#[inline]
pub fn adjacent_run(address: &str, length: usize) -> MatchResult {
    check_length(address);
    let lower = address.to_ascii_lowercase();
    let body = lower.strip_prefix(ADDRESS_MARKER).unwrap_or(&lower).as_bytes();

    match body.get(..length) {
        Some(run) => run.iter().all(|&c| c == run[0]).into(),
        None => MatchResult::NoMatch,
    }
}

#[inline]
fn check_length(address: &str) {
    debug_assert_eq!(
        address.len(),
        ADDRESS_STR_LEN,
        "deriver returned a malformed address: {address}"
    );
}

/// What counts as a hit for one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSpec {
    PrefixSuffix(AffixSet),
    KeyMutation {
        affixes: AffixSet,
        alphabet: MutationAlphabet,
    },
    AdjacentRun {
        length: usize,
    },
}

impl MatchSpec {
    pub fn mode(&self) -> MatchMode {
        match self {
            MatchSpec::PrefixSuffix(_) => MatchMode::PrefixSuffix,
            MatchSpec::KeyMutation { .. } => MatchMode::KeyMutation,
            MatchSpec::AdjacentRun { .. } => MatchMode::AdjacentRun,
        }
    }

    /// Matches one derived address. Under key mutation this tests a single
    /// sibling; the fan-out itself happens in the worker.
    #[inline]
    pub fn matches(&self, address: &str) -> MatchResult {
        match self {
            MatchSpec::PrefixSuffix(affixes) | MatchSpec::KeyMutation { affixes, .. } => {
                affixes.matches(address)
            }
            MatchSpec::AdjacentRun { length } => adjacent_run(address, *length),
        }
    }

    /// Number of derivations per generated base seed.
    #[inline]
    pub fn fan_out(&self) -> u64 {
        match self {
            MatchSpec::KeyMutation { .. } => 16,
            _ => 1,
        }
    }

    /// Expected number of derivations per hit.
    pub fn estimated_attempts(&self) -> f64 {
        let probability = match self {
            MatchSpec::PrefixSuffix(affixes) | MatchSpec::KeyMutation { affixes, .. } => {
                affixes.probability()
            }
            // first char is free, the remaining length-1 must repeat it
            MatchSpec::AdjacentRun { length } => 16f64.powi(-(length.saturating_sub(1) as i32)),
        };
        if probability > 0.0 {
            1.0 / probability
        } else {
            f64::INFINITY
        }
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let attempts = self.estimated_attempts();
        let label = match attempts {
            a if a <= 1_000.0 => "Very Easy (< 1 second)",
            a if a <= 100_000.0 => "Easy (seconds)",
            a if a <= 10_000_000.0 => "Medium (minutes)",
            a if a <= 1_000_000_000.0 => "Hard (hours)",
            _ => "Very Hard (days or more)",
        };
        format!("{} (~{:.0} keys per match)", label, attempts)
    }

    /// Short description of the patterns for the startup banner.
    pub fn describe(&self) -> String {
        let affix_text = |affixes: &AffixSet| {
            let join = |v: &[String]| {
                if v.is_empty() {
                    "*".to_string()
                } else {
                    v.join(",")
                }
            };
            format!(
                "prefixes [{}] suffixes [{}]",
                join(affixes.prefixes()),
                join(affixes.suffixes())
            )
        };

        match self {
            MatchSpec::PrefixSuffix(affixes) => affix_text(affixes),
            MatchSpec::KeyMutation { affixes, alphabet } => {
                format!("{} alphabet {}", affix_text(affixes), alphabet.as_string())
            }
            MatchSpec::AdjacentRun { length } => format!("{} identical leading characters", length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 40 hex chars after the marker
    const NEITHER: &str = "0x1234567890123456789012345678901234567890";
    const PREFIX_ONLY: &str = "0xDEAD567890123456789012345678901234567890";
    const SUFFIX_ONLY: &str = "0x123456789012345678901234567890123456BEEF";
    const BOTH: &str = "0xdEaD56789012345678901234567890123456bEeF";

    fn dead_beef() -> AffixSet {
        AffixSet::new(["0xdead"], ["beef"])
    }

    #[test]
    fn test_prefix_suffix_requires_both_sides() {
        let affixes = dead_beef();
        assert!(!affixes.matches(NEITHER).is_match());
        assert!(!affixes.matches(PREFIX_ONLY).is_match());
        assert!(!affixes.matches(SUFFIX_ONLY).is_match());
        assert!(affixes.matches(BOTH).is_match());
    }

    #[test]
    fn test_prefix_and_suffix_chosen_independently() {
        let affixes = AffixSet::new(["0xaaaa", "0xdead"], ["0000", "beef"]);
        // second prefix with second suffix, and unrelated pairings
        assert!(affixes.matches(BOTH).is_match());
        assert!(affixes
            .matches("0xaaaa567890123456789012345678901234560000")
            .is_match());
        assert!(affixes
            .matches("0xdead567890123456789012345678901234560000")
            .is_match());
        assert!(affixes
            .matches("0xaaaa56789012345678901234567890123456beef")
            .is_match());
    }

    #[test]
    fn test_patterns_are_lowercased() {
        let affixes = AffixSet::new(["0xDEAD"], ["BEEF"]);
        assert_eq!(affixes.prefixes(), ["0xdead"]);
        assert!(affixes.matches(BOTH).is_match());
    }

    #[test]
    fn test_empty_side_is_unconstrained() {
        let prefix_only = AffixSet::new(["0xdead"], Vec::<String>::new());
        assert!(prefix_only.matches(PREFIX_ONLY).is_match());
        assert!(!prefix_only.matches(SUFFIX_ONLY).is_match());

        let empty_pattern = AffixSet::new(["0x"], [""]);
        assert!(empty_pattern.matches(NEITHER).is_match());
    }

    #[test]
    fn test_adjacent_run() {
        assert!(adjacent_run("0xaaaaa12345678901234567890123456789012345", 5).is_match());
        assert!(!adjacent_run("0xaaaa1a2345678901234567890123456789012345", 5).is_match());
        assert!(adjacent_run("0xAAAAA12345678901234567890123456789012345", 5).is_match());
    }

    #[test]
    fn test_adjacent_run_must_start_at_first_char() {
        // five 7s, but not at the start
        assert!(!adjacent_run("0x1777771234567890123456789012345678901234", 5).is_match());
        // the marker's own characters do not count
        assert!(!adjacent_run("0x0000a12345678901234567890123456789012345", 5).is_match());
        assert!(adjacent_run("0x0000012345678901234567890123456789012345", 5).is_match());
    }

    #[test]
    fn test_match_spec_dispatch() {
        let spec = MatchSpec::PrefixSuffix(dead_beef());
        assert!(spec.matches(BOTH).is_match());
        assert_eq!(spec.fan_out(), 1);

        let spec = MatchSpec::KeyMutation {
            affixes: dead_beef(),
            alphabet: MutationAlphabet::default(),
        };
        assert!(spec.matches(BOTH).is_match());
        assert!(!spec.matches(PREFIX_ONLY).is_match());
        assert_eq!(spec.fan_out(), 16);

        let spec = MatchSpec::AdjacentRun { length: 4 };
        assert!(spec.matches("0xbbbb567890123456789012345678901234567890").is_match());
        assert_eq!(spec.mode(), MatchMode::AdjacentRun);
    }

    #[test]
    fn test_difficulty() {
        let spec = MatchSpec::PrefixSuffix(AffixSet::new(["0xdead"], Vec::<String>::new()));
        assert_eq!(spec.estimated_attempts(), 65536.0); // 16^4

        let spec = MatchSpec::PrefixSuffix(dead_beef());
        assert_eq!(spec.estimated_attempts(), 16f64.powi(8));

        let spec = MatchSpec::AdjacentRun { length: 5 };
        assert_eq!(spec.estimated_attempts(), 65536.0);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("prefix-suffix".parse::<MatchMode>(), Ok(MatchMode::PrefixSuffix));
        assert_eq!("key-mutation".parse::<MatchMode>(), Ok(MatchMode::KeyMutation));
        assert_eq!("RUN".parse::<MatchMode>(), Ok(MatchMode::AdjacentRun));
        assert!("contains".parse::<MatchMode>().is_err());
    }
}
