//! The learning and decision engine.
//!
//! Components, leaves first:
//! 1. **Signature hashing:** folds recent address deltas into a bounded
//!    rolling signature.
//! 2. **Delta Q-table:** learned values per (signature, delta); selects an
//!    offset per access and applies the Q-learning update rule.
//! 3. **Replacement policies:** victim selection for the reward tracker.
//! 4. **Reward tracker:** in-flight prefetch records with delayed credit,
//!    epoch aging, and eviction-time flushes into the Q-table.
//! 5. **Prefetch engine:** the orchestrator driving all of the above over a
//!    preprocessed trace.

/// Victim-selection strategies for the reward tracker.
pub mod policies;

/// The prefetch engine orchestrator.
pub mod prefetcher;

/// Per-signature delta Q-table.
pub mod qtable;

/// Rolling access-signature hashing.
pub mod signature;

/// Reward tracking for in-flight prefetches.
pub mod tracker;

pub use self::prefetcher::PrefetchEngine;
pub use self::qtable::{DeltaQTable, OffsetSelection};
pub use self::signature::SignatureHasher;
pub use self::tracker::{MatchOutcome, RewardTrackerTable};
