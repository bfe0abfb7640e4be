//! Reward tracking table for in-flight prefetches.
//!
//! Every issued prefetch is parked here as a row:
//!
//! ```text
//! address    delta    signature    reward    step    timestamp    valid
//! ```
//!
//! and accumulates delayed credit while it waits for proof of usefulness.
//! Each processing step, every live row pays a small miss penalty; a later
//! access to the prefetched address earns the full hit reward when it arrives
//! under the same signature, or a smaller pseudo-hit when the address matches
//! but the signature differs (the same address may have been prefetched under
//! several signatures, and crediting the wrong one would teach the wrong
//! pattern). Once a row has aged past the entry epoch, or is evicted to make
//! room, its accumulated `(signature, delta, reward)` is flushed into the
//! [`DeltaQTable`] as one Q-learning update.
//!
//! Allocation is managed by a pluggable [`ReplacementPolicy`]; LRU over the
//! logical clock is the provided strategy.

use tracing::debug;

use crate::engine::policies::ReplacementPolicy;
use crate::engine::qtable::DeltaQTable;

/// One in-flight prefetch record.
///
/// While `valid` is set, the row is the claim "a prefetch to `address` was
/// issued under `signature`, currently expecting credit `reward`".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewardTrackerEntry {
    /// Byte address the prefetch targeted.
    pub address: u64,
    /// Delta (cache-block units) that produced the address.
    pub delta: i64,
    /// Signature active when the prefetch was issued.
    pub signature: u64,
    /// Accumulated reward; may go negative.
    pub reward: i64,
    /// Steps spent in the table since insertion.
    pub step: u64,
    /// Logical clock value of the last access; LRU recency key.
    pub timestamp: u64,
    /// Whether this row holds a live record.
    pub valid: bool,
}

/// Result of probing the table for a load address.
///
/// An address can match zero, one, or several valid rows (the same address
/// prefetched under different signatures), of which at most one may also
/// match the probing signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// No valid row targets this address.
    NoMatch,
    /// Rows targeting this address, none under the probing signature.
    AddressOnly(Vec<usize>),
    /// One row matches address and signature exactly; `address_only` lists
    /// the remaining same-address rows under other signatures.
    Exact {
        /// Row matching both address and signature.
        row: usize,
        /// Same-address rows under different signatures.
        address_only: Vec<usize>,
    },
}

impl MatchOutcome {
    /// Whether any valid row targets the probed address.
    pub fn found(&self) -> bool {
        !matches!(self, MatchOutcome::NoMatch)
    }

    /// Row indices matching on address (exact match included).
    pub fn address_rows(&self) -> Vec<usize> {
        match self {
            MatchOutcome::NoMatch => Vec::new(),
            MatchOutcome::AddressOnly(rows) => rows.clone(),
            MatchOutcome::Exact { row, address_only } => {
                let mut rows = address_only.clone();
                rows.push(*row);
                rows
            }
        }
    }
}

/// Bookkeeping summary of one [`RewardTrackerTable::insert`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Rows flushed because their age reached the entry epoch.
    pub expired: usize,
    /// Whether a still-valid row was evicted to make room.
    pub evicted_valid: bool,
    /// Whether a new row was allocated (false when an exact match already
    /// covered the address).
    pub allocated: bool,
}

/// Fixed-capacity table tracking rewards for outstanding prefetches.
pub struct RewardTrackerTable {
    /// The rows; length is fixed at construction.
    entries: Vec<RewardTrackerEntry>,
    /// Steps a row may age before its reward is flushed.
    steps_per_entry: u64,
    /// Reward for an exact (address and signature) hit.
    reward_hit: i64,
    /// Reward for an address-only (cross-signature) hit.
    reward_pseudo_hit: i64,
    /// Per-step penalty applied to every live row.
    reward_miss: i64,
    /// Victim selection strategy.
    policy: Box<dyn ReplacementPolicy>,
    /// Monotonic counter advanced once per insertion; LRU recency key.
    logical_clock: u64,
}

impl std::fmt::Debug for RewardTrackerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewardTrackerTable")
            .field("entries", &self.entries)
            .field("steps_per_entry", &self.steps_per_entry)
            .field("logical_clock", &self.logical_clock)
            .finish_non_exhaustive()
    }
}

impl RewardTrackerTable {
    /// Creates a table of `n_entries` invalid rows.
    ///
    /// # Arguments
    ///
    /// * `n_entries` - Fixed row count; the table never grows.
    /// * `steps_per_entry` - Epoch bound; a row reaching this age is flushed.
    /// * `hit` / `pseudo_hit` / `miss` - Reward constants.
    /// * `policy` - Victim selection strategy (LRU in the default setup).
    pub fn new(
        n_entries: usize,
        steps_per_entry: u64,
        hit: i64,
        pseudo_hit: i64,
        miss: i64,
        policy: Box<dyn ReplacementPolicy>,
    ) -> Self {
        Self {
            entries: vec![RewardTrackerEntry::default(); n_entries],
            steps_per_entry,
            reward_hit: hit,
            reward_pseudo_hit: pseudo_hit,
            reward_miss: miss,
            policy,
            logical_clock: 0,
        }
    }

    /// Read access to the rows, mainly for tests and diagnostics.
    pub fn entries(&self) -> &[RewardTrackerEntry] {
        &self.entries
    }

    /// Current logical clock value.
    pub fn logical_clock(&self) -> u64 {
        self.logical_clock
    }

    /// Number of live rows.
    pub fn valid_count(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }

    /// Probes the table for rows targeting `address`.
    ///
    /// # Panics
    ///
    /// Panics when more than one valid row matches both address and
    /// signature; that is a structural invariant violation, not a
    /// recoverable condition.
    pub fn lookup(&self, address: u64, signature: u64) -> MatchOutcome {
        let mut address_only = Vec::new();
        let mut exact = None;
        let mut exact_count = 0usize;

        for (idx, entry) in self.entries.iter().enumerate() {
            if !entry.valid || entry.address != address {
                continue;
            }
            if entry.signature == signature {
                exact_count += 1;
                exact = Some(idx);
            } else {
                address_only.push(idx);
            }
        }

        assert!(
            exact_count <= 1,
            "multiple reward tracker rows match address {address:#x} under signature {signature:#x}"
        );

        match exact {
            Some(row) => MatchOutcome::Exact { row, address_only },
            None if address_only.is_empty() => MatchOutcome::NoMatch,
            None => MatchOutcome::AddressOnly(address_only),
        }
    }

    /// Distributes one step of reward across the table.
    ///
    /// Every live row pays the miss penalty: an outstanding prefetch is
    /// presumed useless until an access proves otherwise. Rows matching the
    /// probed address get the penalty cancelled; the exact match (if any)
    /// earns the hit reward and a recency refresh, while same-address rows
    /// under other signatures earn only the pseudo-hit.
    pub fn issue_rewards(&mut self, outcome: &MatchOutcome) {
        for entry in self.entries.iter_mut().filter(|e| e.valid) {
            entry.reward += self.reward_miss;
        }
        for &idx in &outcome.address_rows() {
            self.entries[idx].reward -= self.reward_miss;
        }

        match outcome {
            MatchOutcome::NoMatch => {}
            MatchOutcome::AddressOnly(rows) => {
                for &idx in rows {
                    self.entries[idx].reward += self.reward_pseudo_hit;
                }
            }
            MatchOutcome::Exact { row, address_only } => {
                self.entries[*row].reward += self.reward_hit;
                self.entries[*row].timestamp = self.logical_clock;
                for &idx in address_only {
                    self.entries[idx].reward += self.reward_pseudo_hit;
                }
            }
        }
    }

    /// Read-only reward pass for page-boundary accesses.
    ///
    /// No prefetch can be attempted across an unknown page, so nothing is
    /// inserted. When the address matches nothing, no penalty is applied
    /// either: with no evidence about this page, penalizing every live row
    /// would be unwarranted.
    pub fn check_and_reward(&mut self, address: u64, signature: u64) {
        let outcome = self.lookup(address, signature);
        if !outcome.found() {
            return;
        }
        self.issue_rewards(&outcome);
    }

    /// Flushes every row whose age reached the epoch bound into the Q-table
    /// and invalidates it.
    fn expire_aged(&mut self, qtable: &mut DeltaQTable) -> usize {
        let mut expired = 0;
        for entry in self.entries.iter_mut() {
            if entry.valid && entry.step >= self.steps_per_entry {
                qtable.update(entry.signature, entry.delta, entry.reward as f64);
                debug!(
                    address = format_args!("{:#x}", entry.address),
                    reward = entry.reward,
                    "epoch expiry flushed to Q-table"
                );
                // Zero the slot so a later victim flush of it is a no-op;
                // an expired reward must reach the Q-table exactly once.
                *entry = RewardTrackerEntry::default();
                expired += 1;
            }
        }
        expired
    }

    /// Records a newly issued prefetch.
    ///
    /// The sequence is fixed and order-sensitive:
    /// 1. expire and flush rows whose age reached the epoch bound;
    /// 2. age every row by one step;
    /// 3. probe for existing matches (at most one exact match may exist);
    /// 4. compute the replacement victim, used or not;
    /// 5. distribute this step's rewards (penalize before the victim is
    ///    touched);
    /// 6. when no exact match existed, flush the victim's current contents
    ///    to the Q-table and overwrite it with the new record (flushing an
    ///    invalid, zeroed slot is a harmless no-op);
    /// 7. advance the logical clock.
    ///
    /// An insert that finds an exact match allocates nothing; step 5 already
    /// credited that row.
    ///
    /// # Arguments
    ///
    /// * `qtable` - Q-table credited by expiry and eviction flushes.
    /// * `address` - Byte address the prefetch targets.
    /// * `delta` - Chosen delta in cache-block units.
    /// * `signature` - Signature the decision was made under.
    pub fn insert(
        &mut self,
        qtable: &mut DeltaQTable,
        address: u64,
        delta: i64,
        signature: u64,
    ) -> InsertOutcome {
        let expired = self.expire_aged(qtable);

        for entry in self.entries.iter_mut() {
            entry.step += 1;
        }

        let outcome = self.lookup(address, signature);

        let timestamps: Vec<u64> = self.entries.iter().map(|e| e.timestamp).collect();
        let valid: Vec<bool> = self.entries.iter().map(|e| e.valid).collect();
        let victim = self.policy.find_victim(&timestamps, &valid);

        self.issue_rewards(&outcome);

        let mut result = InsertOutcome {
            expired,
            evicted_valid: false,
            allocated: false,
        };

        if !matches!(outcome, MatchOutcome::Exact { .. }) {
            let old = self.entries[victim];
            qtable.update(old.signature, old.delta, old.reward as f64);
            if old.valid {
                result.evicted_valid = true;
                debug!(
                    address = format_args!("{:#x}", old.address),
                    reward = old.reward,
                    "evicted live tracker row"
                );
            }

            self.entries[victim] = RewardTrackerEntry {
                address,
                delta,
                signature,
                reward: self.reward_hit,
                step: 0,
                timestamp: self.logical_clock,
                valid: true,
            };
            result.allocated = true;
        }

        self.logical_clock += 1;
        result
    }
}
