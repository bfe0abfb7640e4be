//! Per-signature delta Q-table.
//!
//! One row per signature, one column per candidate delta. With a 4 KiB page
//! and 64-byte lines there are 64 blocks per page, so intra-page deltas span
//! `[-63, 63]` and the table has `2*64 - 1 = 127` columns. A delta maps to a
//! column through a fixed affine offset (`column = delta - least_delta`), and
//! back; the two conversions are exact inverses over the legal delta range.
//!
//! There is no point reserving columns for inter-page distances: the physical
//! adjacency of the next page is unknown, so the table only ever selects
//! deltas that stay within one page.

use rand::Rng;

use crate::common::addr::checked_log2;
use crate::common::error::QfetchError;
use crate::config::{QFetcherConfig, SystemConfig};
use crate::engine::signature::SignatureHasher;

/// Outcome of action selection for one signature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetSelection {
    /// Column index of the chosen delta.
    pub column: usize,
    /// The chosen delta, in cache-block units.
    pub delta: i64,
    /// The chosen delta, in bytes (`delta * cache_line_size`).
    pub byte_offset: i64,
    /// Q-estimate of the chosen (signature, delta) pair at decision time.
    pub q_value: f64,
}

/// Dense table of learned Q-estimates, indexed by (signature, delta column).
///
/// Created zero-initialized and never resized. Mutated only by the
/// Q-learning update rule; read by epsilon-greedy action selection.
#[derive(Debug, Clone)]
pub struct DeltaQTable {
    /// Row-major `n_rows x n_columns` matrix of Q-estimates.
    table: Vec<f64>,
    /// Number of delta columns (`2 * blocks_per_page - 1`).
    n_columns: usize,
    /// Most negative representable delta (`-(blocks_per_page - 1)`).
    least_delta: i64,
    /// Most positive representable delta (`blocks_per_page - 1`).
    largest_delta: i64,
    /// Cache blocks per page.
    blocks_per_page: i64,
    /// Cache line size in bytes.
    cache_line_size_bytes: i64,
    /// Q-learning step size.
    alpha: f64,
    /// Q-learning discount factor.
    gamma: f64,
    /// Exploration probability; constant for the process lifetime.
    epsilon: f64,
    /// Shared delta-folding hasher; also used to reach the next state
    /// inside the update rule.
    hasher: SignatureHasher,
}

impl DeltaQTable {
    /// Builds a zero-initialized Q-table from the system geometry and the
    /// learning parameters.
    ///
    /// # Errors
    ///
    /// Returns [`QfetchError::Config`] when the page or cache line size is
    /// not a power of two, the line does not fit in the page, the signature
    /// width falls outside `(1, 32)`, or the shift is as wide as the
    /// signature.
    pub fn new(system: &SystemConfig, params: &QFetcherConfig) -> Result<Self, QfetchError> {
        let page_bits = checked_log2(system.page_size_bytes).ok_or_else(|| {
            QfetchError::Config(format!(
                "page size must be a power of 2, got {}",
                system.page_size_bytes
            ))
        })?;
        let line_bits = checked_log2(system.cache_line_size_bytes).ok_or_else(|| {
            QfetchError::Config(format!(
                "cache line size must be a power of 2, got {}",
                system.cache_line_size_bytes
            ))
        })?;
        if line_bits >= page_bits {
            return Err(QfetchError::Config(format!(
                "cache line ({} B) must be smaller than the page ({} B)",
                system.cache_line_size_bytes, system.page_size_bytes
            )));
        }
        if params.signature_bits <= 1 {
            return Err(QfetchError::Config(format!(
                "signature bits must be > 1, got {}",
                params.signature_bits
            )));
        }
        // Row count is 1 << signature_bits; 32 bits would already be a
        // 4-billion-row table and anything wider overflows the shift.
        if params.signature_bits >= 32 {
            return Err(QfetchError::Config(format!(
                "signature bits must be < 32, got {}",
                params.signature_bits
            )));
        }
        if params.signature_shift >= params.signature_bits {
            return Err(QfetchError::Config(format!(
                "signature shift must be smaller than the signature width, got shift {} for {} bits",
                params.signature_shift, params.signature_bits
            )));
        }

        let blocks_per_page = (system.page_size_bytes / system.cache_line_size_bytes) as i64;
        let n_columns = (2 * blocks_per_page - 1) as usize;
        let n_rows = 1usize << params.signature_bits;
        let largest_delta = blocks_per_page - 1;

        let hasher = SignatureHasher::new(
            params.signature_bits,
            params.signature_shift,
            largest_delta as u64,
        );

        Ok(Self {
            table: vec![0.0; n_rows * n_columns],
            n_columns,
            least_delta: -largest_delta,
            largest_delta,
            blocks_per_page,
            cache_line_size_bytes: system.cache_line_size_bytes as i64,
            alpha: params.alpha,
            gamma: params.gamma,
            epsilon: params.epsilon,
            hasher,
        })
    }

    /// The hasher that folds deltas into signatures. Shared with the trace
    /// driver so both sides advance signatures identically.
    #[inline]
    pub fn hasher(&self) -> &SignatureHasher {
        &self.hasher
    }

    /// Number of delta columns per row.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Cache blocks per page.
    #[inline]
    pub fn blocks_per_page(&self) -> i64 {
        self.blocks_per_page
    }

    /// Most positive representable delta (`blocks_per_page - 1`).
    #[inline]
    pub fn largest_delta(&self) -> i64 {
        self.largest_delta
    }

    /// Most negative representable delta.
    #[inline]
    pub fn least_delta(&self) -> i64 {
        self.least_delta
    }

    /// Maps a delta to its column index.
    #[inline]
    pub fn column_from_delta(&self, delta: i64) -> usize {
        (delta - self.least_delta) as usize
    }

    /// Maps a column index back to its delta.
    #[inline]
    pub fn delta_from_column(&self, column: usize) -> i64 {
        column as i64 + self.least_delta
    }

    /// Reads the Q-estimate of one (signature, column) cell.
    #[inline]
    pub fn value(&self, signature: u64, column: usize) -> f64 {
        self.table[signature as usize * self.n_columns + column]
    }

    /// Returns the column with the highest Q-estimate in a row, ties broken
    /// by the lowest column index.
    fn argmax(&self, signature: u64) -> usize {
        let row = &self.table[signature as usize * self.n_columns..][..self.n_columns];
        let mut best = 0;
        for (col, &q) in row.iter().enumerate() {
            if q > row[best] {
                best = col;
            }
        }
        best
    }

    /// Selects the next prefetch offset for a signature.
    ///
    /// With probability `epsilon` a column is drawn uniformly at random
    /// (exploration); otherwise the argmax column is taken (exploitation).
    /// The exploration rate stays constant: the access pattern can change at
    /// any time, and a decayed rate would prevent re-adaptation.
    ///
    /// # Arguments
    ///
    /// * `signature` - Row to select from.
    /// * `rng` - Injected random source; tests pass a seeded generator.
    pub fn select_offset<R: Rng + ?Sized>(&self, signature: u64, rng: &mut R) -> OffsetSelection {
        let column = if self.epsilon > 0.0 && rng.random::<f64>() < self.epsilon {
            rng.random_range(0..self.n_columns)
        } else {
            self.argmax(signature)
        };

        let delta = self.delta_from_column(column);
        OffsetSelection {
            column,
            delta,
            byte_offset: delta * self.cache_line_size_bytes,
            q_value: self.value(signature, column),
        }
    }

    /// Applies the tabular Q-learning update for one (signature, delta)
    /// pair:
    ///
    /// ```text
    /// Q[s,a] += alpha * (reward + gamma * max_a'(Q[s',a']) - Q[s,a])
    /// ```
    ///
    /// The next state `s'` is the signature reached by folding this delta
    /// into this signature, not an externally observed state; the update is
    /// self-contained, matching the online single-stream trace.
    pub fn update(&mut self, signature: u64, delta: i64, reward: f64) {
        let column = self.column_from_delta(delta);
        let next_signature = self.hasher.next(signature, delta);
        let max_next = self.value(next_signature, self.argmax(next_signature));

        let idx = signature as usize * self.n_columns + column;
        let q = self.table[idx];
        self.table[idx] = q + self.alpha * (reward + self.gamma * max_next - q);
    }
}
