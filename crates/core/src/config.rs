//! Configuration system for the prefetcher simulator.
//!
//! This module defines all configuration structures used to parameterize a
//! run. It provides:
//! 1. **Defaults:** Baseline constants (page geometry, table sizes, learning
//!    rates) used when a field is omitted from the JSON file.
//! 2. **Structures:** The four recognized sections of the config file:
//!    `trace_config`, `system_config`, `q_fetcher_config`, `output_config`.
//! 3. **Loading:** `Config::from_file` (JSON via serde) and
//!    `Config::validate` for cross-field sanity checks.
//!
//! Geometry invariants (power-of-two page and line sizes, `signature_bits >
//! 1`) are enforced again at table construction time; `validate` exists so
//! the CLI can fail before touching the trace.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::QfetchError;

/// Default configuration constants.
///
/// These values define the baseline setup when not explicitly overridden in
/// the JSON configuration file.
mod defaults {
    /// Default page size in bytes (4 KiB).
    pub const PAGE_SIZE_BYTES: u64 = 4096;

    /// Default cache line size in bytes (64 bytes).
    ///
    /// Matches typical modern processor cache line sizes.
    pub const CACHE_LINE_SIZE_BYTES: u64 = 64;

    /// Default signature width in bits (4096 Q-table rows).
    pub const SIGNATURE_BITS: u32 = 12;

    /// Default left shift applied to the signature before folding a delta.
    pub const SIGNATURE_SHIFT: u32 = 3;

    /// Default number of rows in the reward tracking table.
    pub const REWARD_TABLE_ENTRIES: usize = 32;

    /// Default number of steps an entry may stay in the reward tracker
    /// before its accumulated reward is flushed into the Q-table.
    pub const ENTRY_EPOCH: u64 = 64;

    /// Default Q-learning step size.
    pub const ALPHA: f64 = 0.3;

    /// Default Q-learning discount factor.
    pub const GAMMA: f64 = 0.8;

    /// Default exploration probability. Held constant for the whole run;
    /// the access pattern can change at any time, so the rate never decays.
    pub const EPSILON: f64 = 0.05;

    /// Default reward for an exact (address and signature) tracker hit.
    pub const HIT_REWARD: i64 = 16;

    /// Default reward for an address-only (cross-signature) tracker hit.
    pub const PSEUDO_HIT_REWARD: i64 = 8;

    /// Default per-step penalty applied to every outstanding prefetch.
    pub const MISS_REWARD: i64 = -1;

    /// Default trace directory.
    pub const TRACE_DIR: &str = ".";

    /// Default trace file name.
    pub const TRACE_FILE: &str = "trace.csv";

    /// Default output directory.
    pub const OUTPUT_DIR: &str = "output";

    /// Default prediction file name.
    pub const OUTPUT_PRED_FILE: &str = "predictions.txt";

    /// Default Q-value file name.
    pub const OUTPUT_Q_FILE: &str = "q_values.txt";
}

/// Root configuration structure containing all simulator settings.
///
/// Deserialized from a JSON file with four fixed sections. Every field has a
/// default, so `{}` inside a section (or an entirely default `Config`) is a
/// runnable setup.
///
/// # Examples
///
/// ```
/// use qfetch_core::config::Config;
///
/// let json = r#"{
///     "trace_config": { "trace_dir": "traces", "trace_file": "spec_gcc.csv" },
///     "system_config": { "page_size_bytes": 4096, "cache_line_size_bytes": 64 },
///     "q_fetcher_config": {
///         "signature_bits": 12,
///         "signature_shift": 3,
///         "reward_table_entries": 32,
///         "entry_epoch": 64,
///         "alpha": 0.3,
///         "gamma": 0.8,
///         "epsilon": 0.05
///     },
///     "output_config": { "output_dir": "out" }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.system.page_size_bytes, 4096);
/// assert_eq!(config.q_fetcher.signature_bits, 12);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Trace input location.
    #[serde(rename = "trace_config", default)]
    pub trace: TraceConfig,
    /// Page and cache-line geometry.
    #[serde(rename = "system_config", default)]
    pub system: SystemConfig,
    /// Learning engine parameters.
    #[serde(rename = "q_fetcher_config", default)]
    pub q_fetcher: QFetcherConfig,
    /// Output file locations.
    #[serde(rename = "output_config", default)]
    pub output: OutputConfig,
}

impl Config {
    /// Loads and decodes a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`QfetchError::ConfigParse`] when the file cannot be read or
    /// is not valid JSON for this schema.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, QfetchError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| QfetchError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| QfetchError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Checks cross-field invariants before any table is built.
    ///
    /// # Errors
    ///
    /// Returns [`QfetchError::Config`] for non-power-of-two page or line
    /// sizes, a signature width outside `(1, 32)`, a shift as wide as the
    /// signature, an empty reward table, a zero epoch, or an exploration
    /// probability outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), QfetchError> {
        if !self.system.page_size_bytes.is_power_of_two() {
            return Err(QfetchError::Config(format!(
                "page size must be a power of 2, got {}",
                self.system.page_size_bytes
            )));
        }
        if !self.system.cache_line_size_bytes.is_power_of_two() {
            return Err(QfetchError::Config(format!(
                "cache line size must be a power of 2, got {}",
                self.system.cache_line_size_bytes
            )));
        }
        if self.q_fetcher.signature_bits <= 1 {
            return Err(QfetchError::Config(format!(
                "signature bits must be > 1, got {}",
                self.q_fetcher.signature_bits
            )));
        }
        if self.q_fetcher.signature_bits >= 32 {
            return Err(QfetchError::Config(format!(
                "signature bits must be < 32, got {}",
                self.q_fetcher.signature_bits
            )));
        }
        if self.q_fetcher.signature_shift >= self.q_fetcher.signature_bits {
            return Err(QfetchError::Config(format!(
                "signature shift must be smaller than the signature width, got shift {} for {} bits",
                self.q_fetcher.signature_shift, self.q_fetcher.signature_bits
            )));
        }
        if self.q_fetcher.reward_table_entries == 0 {
            return Err(QfetchError::Config(
                "reward table must have at least one entry".into(),
            ));
        }
        if self.q_fetcher.entry_epoch == 0 {
            return Err(QfetchError::Config(
                "entry epoch must be at least one step".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.q_fetcher.epsilon) {
            return Err(QfetchError::Config(format!(
                "epsilon must lie in [0, 1], got {}",
                self.q_fetcher.epsilon
            )));
        }
        Ok(())
    }
}

/// Trace input configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceConfig {
    /// Directory containing the trace file.
    #[serde(default = "TraceConfig::default_trace_dir")]
    pub trace_dir: String,

    /// Name of the trace file within `trace_dir`.
    #[serde(default = "TraceConfig::default_trace_file")]
    pub trace_file: String,
}

impl TraceConfig {
    /// Returns the default trace directory.
    fn default_trace_dir() -> String {
        defaults::TRACE_DIR.to_string()
    }

    /// Returns the default trace file name.
    fn default_trace_file() -> String {
        defaults::TRACE_FILE.to_string()
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            trace_dir: Self::default_trace_dir(),
            trace_file: Self::default_trace_file(),
        }
    }
}

/// Page and cache-line geometry.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SystemConfig {
    /// Page size in bytes; must be a power of two.
    #[serde(default = "SystemConfig::default_page_size")]
    pub page_size_bytes: u64,

    /// Cache line size in bytes; must be a power of two.
    #[serde(default = "SystemConfig::default_cache_line_size")]
    pub cache_line_size_bytes: u64,
}

impl SystemConfig {
    /// Returns the default page size in bytes.
    fn default_page_size() -> u64 {
        defaults::PAGE_SIZE_BYTES
    }

    /// Returns the default cache line size in bytes.
    fn default_cache_line_size() -> u64 {
        defaults::CACHE_LINE_SIZE_BYTES
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            page_size_bytes: defaults::PAGE_SIZE_BYTES,
            cache_line_size_bytes: defaults::CACHE_LINE_SIZE_BYTES,
        }
    }
}

/// Learning engine parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QFetcherConfig {
    /// Width of the rolling access signature in bits; the Q-table has
    /// `2^signature_bits` rows. Must be greater than 1.
    #[serde(default = "QFetcherConfig::default_signature_bits")]
    pub signature_bits: u32,

    /// Left shift applied to the signature before XOR-ing in a delta.
    #[serde(default = "QFetcherConfig::default_signature_shift")]
    pub signature_shift: u32,

    /// Number of rows in the reward tracking table.
    #[serde(default = "QFetcherConfig::default_reward_table_entries")]
    pub reward_table_entries: usize,

    /// Steps an entry may age in the tracker before being flushed into the
    /// Q-table.
    #[serde(default = "QFetcherConfig::default_entry_epoch")]
    pub entry_epoch: u64,

    /// Q-learning step size.
    #[serde(default = "QFetcherConfig::default_alpha")]
    pub alpha: f64,

    /// Q-learning discount factor.
    #[serde(default = "QFetcherConfig::default_gamma")]
    pub gamma: f64,

    /// Exploration probability for epsilon-greedy action selection.
    /// Constant for the whole run; never decayed.
    #[serde(default = "QFetcherConfig::default_epsilon")]
    pub epsilon: f64,

    /// Reward added on an exact (address and signature) tracker hit.
    #[serde(default = "QFetcherConfig::default_hit_reward")]
    pub hit_reward: i64,

    /// Reward added on an address-only (cross-signature) tracker hit.
    #[serde(default = "QFetcherConfig::default_pseudo_hit_reward")]
    pub pseudo_hit_reward: i64,

    /// Per-step penalty applied to every outstanding prefetch.
    #[serde(default = "QFetcherConfig::default_miss_reward")]
    pub miss_reward: i64,

    /// Seed for the exploration RNG. `None` draws from OS entropy; setting
    /// it makes a run with `epsilon > 0` reproducible.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl QFetcherConfig {
    /// Returns the default signature width.
    fn default_signature_bits() -> u32 {
        defaults::SIGNATURE_BITS
    }

    /// Returns the default signature shift.
    fn default_signature_shift() -> u32 {
        defaults::SIGNATURE_SHIFT
    }

    /// Returns the default reward table size.
    fn default_reward_table_entries() -> usize {
        defaults::REWARD_TABLE_ENTRIES
    }

    /// Returns the default entry epoch.
    fn default_entry_epoch() -> u64 {
        defaults::ENTRY_EPOCH
    }

    /// Returns the default learning rate.
    fn default_alpha() -> f64 {
        defaults::ALPHA
    }

    /// Returns the default discount factor.
    fn default_gamma() -> f64 {
        defaults::GAMMA
    }

    /// Returns the default exploration probability.
    fn default_epsilon() -> f64 {
        defaults::EPSILON
    }

    /// Returns the default exact-hit reward.
    fn default_hit_reward() -> i64 {
        defaults::HIT_REWARD
    }

    /// Returns the default pseudo-hit reward.
    fn default_pseudo_hit_reward() -> i64 {
        defaults::PSEUDO_HIT_REWARD
    }

    /// Returns the default miss penalty.
    fn default_miss_reward() -> i64 {
        defaults::MISS_REWARD
    }
}

impl Default for QFetcherConfig {
    fn default() -> Self {
        Self {
            signature_bits: defaults::SIGNATURE_BITS,
            signature_shift: defaults::SIGNATURE_SHIFT,
            reward_table_entries: defaults::REWARD_TABLE_ENTRIES,
            entry_epoch: defaults::ENTRY_EPOCH,
            alpha: defaults::ALPHA,
            gamma: defaults::GAMMA,
            epsilon: defaults::EPSILON,
            hit_reward: defaults::HIT_REWARD,
            pseudo_hit_reward: defaults::PSEUDO_HIT_REWARD,
            miss_reward: defaults::MISS_REWARD,
            seed: None,
        }
    }
}

/// Output file locations.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for the output files; created if it does not exist.
    #[serde(default = "OutputConfig::default_output_dir")]
    pub output_dir: String,

    /// Prediction file name: one `"<instruction_id> <address>"` line per
    /// accepted prefetch.
    #[serde(default = "OutputConfig::default_pred_file")]
    pub output_pred_file: String,

    /// Q-value file name: the scalar that justified each accepted prefetch,
    /// in prediction order.
    #[serde(default = "OutputConfig::default_q_file")]
    pub output_q_file: String,
}

impl OutputConfig {
    /// Returns the default output directory.
    fn default_output_dir() -> String {
        defaults::OUTPUT_DIR.to_string()
    }

    /// Returns the default prediction file name.
    fn default_pred_file() -> String {
        defaults::OUTPUT_PRED_FILE.to_string()
    }

    /// Returns the default Q-value file name.
    fn default_q_file() -> String {
        defaults::OUTPUT_Q_FILE.to_string()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: Self::default_output_dir(),
            output_pred_file: Self::default_pred_file(),
            output_q_file: Self::default_q_file(),
        }
    }
}
