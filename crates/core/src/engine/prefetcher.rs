//! The prefetch engine: drives the learning tables over a load trace.
//!
//! The engine owns every piece of mutable state (Q-table, reward tracker,
//! rolling signature, logical clock inside the tracker, the exploration RNG)
//! and advances them strictly sequentially, one trace record per transition.
//! Ordering matters: rewards, ages, and the clock are read-modify-write over
//! shared rows, so the steps of a transition are not reorderable.
//!
//! Per record (after the first, which only seeds the previous tag/block):
//! 1. compute the block delta against the previous access;
//! 2. on a page jump, widen the delta by a page worth of blocks, advance the
//!    signature, and only *check* the tracker for earned rewards; the next
//!    page's physical adjacency is unknown, so no prefetch is attempted;
//! 3. otherwise advance the signature, select an offset (epsilon-greedy),
//!    insert the resulting prefetch into the tracker, and emit it to the
//!    sink when its target block stays within the page;
//! 4. remember the current tag/block.
//!
//! Rows still live in the tracker when the trace ends are dropped without
//! crediting the Q-table; partial data loss at shutdown is defined behavior.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::common::error::QfetchError;
use crate::config::{QFetcherConfig, SystemConfig};
use crate::engine::policies::LruPolicy;
use crate::engine::qtable::DeltaQTable;
use crate::engine::tracker::RewardTrackerTable;
use crate::sim::output::PredictionSink;
use crate::sim::trace::TraceRecord;
use crate::stats::EngineStats;

/// Orchestrator tying the Q-table, reward tracker, and signature together.
#[derive(Debug)]
pub struct PrefetchEngine {
    /// Learned per-signature delta values.
    qtable: DeltaQTable,
    /// In-flight prefetch records awaiting credit.
    tracker: RewardTrackerTable,
    /// Rolling access signature.
    signature: u64,
    /// Tag and block of the previous access, once seeded.
    prev: Option<(u64, u64)>,
    /// Exploration RNG, injected at construction for reproducibility.
    rng: StdRng,
    /// Run counters.
    stats: EngineStats,
}

impl PrefetchEngine {
    /// Builds an engine from the system geometry and learning parameters.
    ///
    /// The RNG is seeded from `params.seed` when set, otherwise from OS
    /// entropy. The reward tracker uses LRU replacement.
    ///
    /// # Errors
    ///
    /// Returns [`QfetchError::Config`] for invalid geometry or signature
    /// width (see [`DeltaQTable::new`]).
    pub fn new(system: &SystemConfig, params: &QFetcherConfig) -> Result<Self, QfetchError> {
        let qtable = DeltaQTable::new(system, params)?;
        let tracker = RewardTrackerTable::new(
            params.reward_table_entries,
            params.entry_epoch,
            params.hit_reward,
            params.pseudo_hit_reward,
            params.miss_reward,
            Box::new(LruPolicy::new()),
        );
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            qtable,
            tracker,
            signature: 0,
            prev: None,
            rng,
            stats: EngineStats::default(),
        })
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// The Q-table, for inspection after a run.
    pub fn qtable(&self) -> &DeltaQTable {
        &self.qtable
    }

    /// Mutable access to the Q-table, e.g. to warm-start it before a run.
    pub fn qtable_mut(&mut self) -> &mut DeltaQTable {
        &mut self.qtable
    }

    /// The reward tracker, for inspection after a run.
    pub fn tracker(&self) -> &RewardTrackerTable {
        &self.tracker
    }

    /// Processes one trace record.
    ///
    /// # Errors
    ///
    /// Propagates sink I/O failures.
    pub fn step(
        &mut self,
        record: &TraceRecord,
        sink: &mut dyn PredictionSink,
    ) -> Result<(), QfetchError> {
        self.stats.accesses += 1;

        let (curr_tag, curr_block) = (record.tag, record.block);
        let Some((prev_tag, prev_block)) = self.prev else {
            self.prev = Some((curr_tag, curr_block));
            return Ok(());
        };

        let mut delta = curr_block as i64 - prev_block as i64;

        if curr_tag != prev_tag {
            // Worst-case approximation of the inter-page jump distance; the
            // true physical distance between pages is unknowable here.
            delta += self.qtable.blocks_per_page();
            self.signature = self.qtable.hasher().next(self.signature, delta);
            self.tracker.check_and_reward(record.address, self.signature);
            self.stats.page_jumps += 1;
        } else {
            self.signature = self.qtable.hasher().next(self.signature, delta);

            let selection = self.qtable.select_offset(self.signature, &mut self.rng);
            let candidate = (record.address as i64 + selection.byte_offset) as u64;

            // The prefetch only makes sense while the target block stays in
            // this page.
            let target_block = curr_block as i64 + selection.delta;
            let valid = (0..=self.qtable.largest_delta()).contains(&target_block);

            // Invalid prefetches are still recorded so later credit
            // assignment sees a consistent table.
            let outcome =
                self.tracker
                    .insert(&mut self.qtable, candidate, selection.delta, self.signature);
            self.stats.epoch_expiries += outcome.expired as u64;
            if outcome.evicted_valid {
                self.stats.tracker_evictions += 1;
            }

            if valid {
                sink.record(record.instruction_id, candidate, selection.q_value)?;
                self.stats.prefetches_issued += 1;
            } else {
                self.stats.invalid_prefetches += 1;
            }
        }

        self.prev = Some((curr_tag, curr_block));
        Ok(())
    }

    /// Runs the engine over a whole trace.
    ///
    /// # Errors
    ///
    /// Propagates the first sink I/O failure; the trace is abandoned at that
    /// point.
    pub fn run(
        &mut self,
        trace: &[TraceRecord],
        sink: &mut dyn PredictionSink,
    ) -> Result<(), QfetchError> {
        for record in trace {
            self.step(record, sink)?;
        }
        info!(
            accesses = self.stats.accesses,
            prefetches = self.stats.prefetches_issued,
            page_jumps = self.stats.page_jumps,
            "trace replay complete"
        );
        Ok(())
    }
}
