//! Reward-tracker replacement policies.
//!
//! Implements victim selection for the fixed-capacity reward tracking table.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used (provided).
//!
//! The policy is a capability interface so alternative strategies (LFU,
//! random) can be substituted without touching the tracker.

/// Least Recently Used replacement policy.
pub mod lru;

pub use lru::LruPolicy;

/// Trait for reward-tracker replacement policies.
///
/// Given the per-row recency timestamps and valid bits, a policy selects the
/// row to reclaim for a new insertion.
pub trait ReplacementPolicy: Send + Sync {
    /// Selects a victim row.
    ///
    /// Invalid rows must be preferred over evicting a live one; the
    /// tie-break among several candidates is implementation-defined but must
    /// be deterministic.
    ///
    /// # Arguments
    ///
    /// * `timestamps` - Last-access logical clock value per row.
    /// * `valid` - Valid bit per row; `false` marks a free slot.
    ///
    /// # Returns
    ///
    /// The index of the row to reclaim.
    fn find_victim(&self, timestamps: &[u64], valid: &[bool]) -> usize;
}
