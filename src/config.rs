//! Runtime configuration for the vanity search.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::crypto::{MutationAlphabet, ADDRESS_MARKER};
use crate::matcher::{AffixSet, MatchMode, MatchSpec};
use crate::worker::SearchSettings;

/// Hex characters in an address after the marker.
const ADDRESS_HEX_LEN: usize = 40;

/// Ethereum Vanity Key Search
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Match mode: prefix-suffix, key-mutation, or adjacent-run
    #[arg(short, long, default_value = "prefix-suffix")]
    pub mode: MatchMode,

    /// Address prefix, repeatable (hex; "0x" is added when missing)
    #[arg(short, long = "prefix")]
    pub prefixes: Vec<String>,

    /// Address suffix, repeatable (hex)
    #[arg(short, long = "suffix")]
    pub suffixes: Vec<String>,

    /// Add the 16 prefixes made of N copies of one hex digit
    #[arg(long)]
    pub repeated_prefix: Option<usize>,

    /// Add the 16 suffixes made of N copies of one hex digit
    #[arg(long)]
    pub repeated_suffix: Option<usize>,

    /// Replacement order for the last key character in key-mutation mode
    #[arg(long, default_value = MutationAlphabet::DEFAULT)]
    pub alphabet: String,

    /// Identical leading characters required in adjacent-run mode
    #[arg(short = 'n', long, default_value = "5")]
    pub run_length: usize,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Stop once more than this many matches are found
    #[arg(short, long, default_value = "100")]
    pub limit: u64,

    /// Result log, appended to
    #[arg(short, long, default_value = "results.txt")]
    pub output: PathBuf,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "60")]
    pub status_interval: u64,

    /// Result queue capacity (default: number of workers)
    #[arg(long)]
    pub queue_capacity: Option<usize>,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or_else(|| self.worker_count())
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("workers", self.worker_count() as u64)?;
        check_positive("limit", self.limit)?;
        check_positive("status-interval", self.status_interval)?;
        check_positive("queue-capacity", self.queue_capacity() as u64)?;

        for n in [self.repeated_prefix, self.repeated_suffix].into_iter().flatten() {
            if n == 0 || n > ADDRESS_HEX_LEN {
                return Err(ConfigError::InvalidValue {
                    name: "repeated-prefix/repeated-suffix",
                    reason: format!("must be between 1 and {}", ADDRESS_HEX_LEN),
                });
            }
        }

        let prefixes = self.normalized_prefixes()?;
        let suffixes = self.normalized_suffixes()?;

        match self.mode {
            MatchMode::PrefixSuffix | MatchMode::KeyMutation => {
                if prefixes.is_empty() && suffixes.is_empty() {
                    return Err(ConfigError::MissingPattern(self.mode));
                }

                let longest_prefix = prefixes
                    .iter()
                    .map(|p| p.len() - ADDRESS_MARKER.len())
                    .max()
                    .unwrap_or(0);
                let longest_suffix = suffixes.iter().map(String::len).max().unwrap_or(0);
                if longest_prefix + longest_suffix > ADDRESS_HEX_LEN {
                    return Err(ConfigError::InvalidPattern(format!(
                        "Combined prefix + suffix cannot be longer than {} characters",
                        ADDRESS_HEX_LEN
                    )));
                }
            }
            MatchMode::AdjacentRun => {
                if !prefixes.is_empty() || !suffixes.is_empty() {
                    return Err(ConfigError::InvalidPattern(
                        "Prefixes and suffixes are not used in adjacent-run mode".into(),
                    ));
                }
                if !(2..=ADDRESS_HEX_LEN).contains(&self.run_length) {
                    return Err(ConfigError::InvalidValue {
                        name: "run-length",
                        reason: format!("must be between 2 and {}", ADDRESS_HEX_LEN),
                    });
                }
            }
        }

        if self.mode == MatchMode::KeyMutation && MutationAlphabet::parse(&self.alphabet).is_none() {
            return Err(ConfigError::InvalidAlphabet(self.alphabet.clone()));
        }

        Ok(())
    }

    /// Returns the prefixes lowercased and starting with `0x`, presets
    /// included.
    pub fn normalized_prefixes(&self) -> Result<Vec<String>, ConfigError> {
        let mut out = Vec::with_capacity(self.prefixes.len());
        for raw in &self.prefixes {
            let lower = raw.to_lowercase();
            let body = lower.strip_prefix(ADDRESS_MARKER).unwrap_or(&lower);
            check_hex("Prefix", body)?;
            out.push(format!("{}{}", ADDRESS_MARKER, body));
        }
        if let Some(n) = self.repeated_prefix {
            out.extend(repeated(n).map(|r| format!("{}{}", ADDRESS_MARKER, r)));
        }
        Ok(out)
    }

    /// Returns the suffixes lowercased, presets included.
    pub fn normalized_suffixes(&self) -> Result<Vec<String>, ConfigError> {
        let mut out = Vec::with_capacity(self.suffixes.len());
        for raw in &self.suffixes {
            let lower = raw.to_lowercase();
            check_hex("Suffix", &lower)?;
            out.push(lower);
        }
        if let Some(n) = self.repeated_suffix {
            out.extend(repeated(n));
        }
        Ok(out)
    }

    /// Builds the match specification for the selected mode.
    pub fn match_spec(&self) -> Result<MatchSpec, ConfigError> {
        let spec = match self.mode {
            MatchMode::PrefixSuffix => MatchSpec::PrefixSuffix(AffixSet::new(
                self.normalized_prefixes()?,
                self.normalized_suffixes()?,
            )),
            MatchMode::KeyMutation => MatchSpec::KeyMutation {
                affixes: AffixSet::new(self.normalized_prefixes()?, self.normalized_suffixes()?),
                alphabet: MutationAlphabet::parse(&self.alphabet)
                    .ok_or_else(|| ConfigError::InvalidAlphabet(self.alphabet.clone()))?,
            },
            MatchMode::AdjacentRun => MatchSpec::AdjacentRun {
                length: self.run_length,
            },
        };
        Ok(spec)
    }

    /// Validates and converts into the settings a search runs with.
    pub fn settings(&self) -> Result<SearchSettings, ConfigError> {
        self.validate()?;
        Ok(SearchSettings {
            spec: self.match_spec()?,
            workers: self.worker_count(),
            limit: self.limit,
            output: self.output.clone(),
            status_interval: Duration::from_secs(self.status_interval),
            queue_capacity: self.queue_capacity(),
        })
    }
}

/// The 16 strings of `n` copies of a single hex digit.
fn repeated(n: usize) -> impl Iterator<Item = String> {
    "0123456789abcdef".chars().map(move |c| c.to_string().repeat(n))
}

fn check_hex(what: &str, body: &str) -> Result<(), ConfigError> {
    if body.is_empty() {
        return Err(ConfigError::InvalidPattern(format!("{} cannot be empty", what)));
    }
    if !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidPattern(format!(
            "{} must contain only hex characters (0-9, a-f): {}",
            what, body
        )));
    }
    if body.len() > ADDRESS_HEX_LEN {
        return Err(ConfigError::InvalidPattern(format!(
            "{} cannot be longer than {} characters (full address)",
            what, ADDRESS_HEX_LEN
        )));
    }
    Ok(())
}

fn check_positive(name: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            name,
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("{0} mode needs at least one --prefix, --suffix or repeated preset")]
    MissingPattern(MatchMode),

    #[error("Invalid alphabet {0:?}: must hold each hex digit exactly once")]
    InvalidAlphabet(String),

    #[error("Invalid --{name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}
