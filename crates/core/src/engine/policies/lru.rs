//! Least Recently Used (LRU) replacement policy.
//!
//! Reclaims the row whose last access is the furthest in the past, measured
//! by the tracker's logical clock. Free (invalid) rows are always reused
//! before a live row is evicted.
//!
//! Both scans return the *first* index attaining the minimum, so victim
//! selection is fully deterministic for any input.

use super::ReplacementPolicy;

/// LRU policy state.
///
/// Stateless: recency lives in the tracker rows themselves, so the policy is
/// a pure function of the slices it is handed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LruPolicy;

impl LruPolicy {
    /// Creates a new LRU policy instance.
    pub fn new() -> Self {
        Self
    }
}

impl ReplacementPolicy for LruPolicy {
    /// Picks the victim with the smallest timestamp, preferring free slots.
    ///
    /// If any row is invalid, the lowest-indexed invalid row is returned.
    /// Otherwise the lowest-indexed row with the minimum timestamp wins.
    fn find_victim(&self, timestamps: &[u64], valid: &[bool]) -> usize {
        if let Some(free) = valid.iter().position(|&v| !v) {
            return free;
        }

        let mut victim = 0;
        for (idx, &ts) in timestamps.iter().enumerate() {
            if ts < timestamps[victim] {
                victim = idx;
            }
        }
        victim
    }
}
