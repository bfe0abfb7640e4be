//! Run statistics collection and reporting.
//!
//! Tracks what the engine did with the trace: how many accesses were
//! processed, how many crossed a page boundary, how many prefetches were
//! issued or suppressed, and how the reward tracker recycled its rows.

/// Counters accumulated over one trace run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Trace records processed (including the seeding first record).
    pub accesses: u64,
    /// Accesses whose page tag differed from the previous access.
    pub page_jumps: u64,
    /// Prefetches accepted and emitted to the prediction sink.
    pub prefetches_issued: u64,
    /// Prefetches whose target block fell outside the page; recorded in the
    /// tracker but never emitted.
    pub invalid_prefetches: u64,
    /// Live tracker rows evicted to make room for a new prefetch.
    pub tracker_evictions: u64,
    /// Tracker rows flushed because their age reached the entry epoch.
    pub epoch_expiries: u64,
}

impl EngineStats {
    /// Prints a human-readable summary to stdout.
    pub fn print(&self) {
        println!("── run statistics ──────────────────────");
        println!("  accesses processed   {:>12}", self.accesses);
        println!("  page jumps           {:>12}", self.page_jumps);
        println!("  prefetches issued    {:>12}", self.prefetches_issued);
        println!("  invalid prefetches   {:>12}", self.invalid_prefetches);
        println!("  tracker evictions    {:>12}", self.tracker_evictions);
        println!("  epoch expiries       {:>12}", self.epoch_expiries);
    }
}
