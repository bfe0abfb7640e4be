//! Reward tracker table tests.
//!
//! The insert sequence is order-sensitive (expire, age, lookup, victim,
//! reward, overwrite, clock), so these tests pin down the observable
//! arithmetic of each phase rather than poking at internals.

use pretty_assertions::assert_eq;

use qfetch_core::config::{QFetcherConfig, SystemConfig};
use qfetch_core::engine::policies::LruPolicy;
use qfetch_core::engine::{DeltaQTable, MatchOutcome, RewardTrackerTable};

const HIT: i64 = 16;
const PSEUDO_HIT: i64 = 8;
const MISS: i64 = -1;

fn qtable() -> DeltaQTable {
    let system = SystemConfig {
        page_size_bytes: 1024,
        cache_line_size_bytes: 64,
    };
    let params = QFetcherConfig {
        signature_bits: 8,
        signature_shift: 3,
        alpha: 0.3,
        gamma: 0.8,
        epsilon: 0.0,
        ..QFetcherConfig::default()
    };
    DeltaQTable::new(&system, &params).unwrap()
}

fn tracker(n_entries: usize, epoch: u64) -> RewardTrackerTable {
    RewardTrackerTable::new(
        n_entries,
        epoch,
        HIT,
        PSEUDO_HIT,
        MISS,
        Box::new(LruPolicy::new()),
    )
}

#[test]
fn insert_allocates_with_hit_reward() {
    let mut qt = qtable();
    let mut table = tracker(4, 100);

    let outcome = table.insert(&mut qt, 0x1000, 2, 7);
    assert!(outcome.allocated);
    assert!(!outcome.evicted_valid);
    assert_eq!(outcome.expired, 0);

    let row = table.entries()[0];
    assert!(row.valid);
    assert_eq!(row.address, 0x1000);
    assert_eq!(row.delta, 2);
    assert_eq!(row.signature, 7);
    assert_eq!(row.reward, HIT);
    assert_eq!(row.step, 0);
    assert_eq!(row.timestamp, 0);
    assert_eq!(table.logical_clock(), 1);
}

#[test]
fn every_insert_penalizes_live_rows() {
    let mut qt = qtable();
    let mut table = tracker(4, 100);

    table.insert(&mut qt, 0x1000, 1, 1);
    table.insert(&mut qt, 0x2000, 2, 2);

    // The first row paid one miss penalty while the second was inserted.
    assert_eq!(table.entries()[0].reward, HIT + MISS);
    assert_eq!(table.entries()[1].reward, HIT);
}

#[test]
fn eviction_flushes_oldest_row_to_qtable() {
    let mut qt = qtable();
    let mut table = tracker(4, 100);

    // Fill the table; row 0 (delta 3, signature 1) is the LRU victim.
    table.insert(&mut qt, 0x1000, 3, 1);
    table.insert(&mut qt, 0x2000, 4, 2);
    table.insert(&mut qt, 0x3000, 5, 3);
    table.insert(&mut qt, 0x4000, 6, 4);
    assert_eq!(table.valid_count(), 4);

    let outcome = table.insert(&mut qt, 0x5000, 7, 5);
    assert!(outcome.evicted_valid);
    assert!(outcome.allocated);

    // Row 0 held reward 16 - 3 (inserts two through four) and paid one more
    // miss during the evicting insert, so it flushed 12 into the Q-table.
    let column = qt.column_from_delta(3);
    assert_eq!(qt.value(1, column), 0.3 * 12.0);

    // The slot now holds the new record.
    let row = table.entries()[0];
    assert_eq!(row.address, 0x5000);
    assert_eq!(row.reward, HIT);
    assert_eq!(table.valid_count(), 4);
}

#[test]
fn epoch_expiry_flushes_during_a_later_insert() {
    let mut qt = qtable();
    let mut table = tracker(8, 3);

    table.insert(&mut qt, 0x1000, 2, 5);
    table.insert(&mut qt, 0x2000, 3, 6);
    table.insert(&mut qt, 0x3000, 4, 7);
    table.insert(&mut qt, 0x4000, 5, 8);
    // Row 0 reaches step 3 during the fourth insert; the bound is checked at
    // the top of the next one.
    assert!(table.entries()[0].valid);

    let outcome = table.insert(&mut qt, 0x5000, 6, 9);
    assert_eq!(outcome.expired, 1);
    assert!(!table.entries()[0].valid);

    // 16 hit minus three miss penalties; the expiring insert ages first and
    // only penalizes rows still live after the flush.
    let column = qt.column_from_delta(2);
    assert_eq!(qt.value(5, column), 0.3 * 13.0);
}

#[test]
fn exact_reinsert_credits_without_allocating() {
    let mut qt = qtable();
    let mut table = tracker(4, 100);

    table.insert(&mut qt, 0x1000, 2, 7);
    let outcome = table.insert(&mut qt, 0x1000, 2, 7);

    assert!(!outcome.allocated);
    assert!(!outcome.evicted_valid);
    assert_eq!(table.valid_count(), 1);

    // Miss cancelled, full hit credited, recency refreshed.
    let row = table.entries()[0];
    assert_eq!(row.reward, 2 * HIT);
    assert_eq!(row.timestamp, 1);
    assert_eq!(table.logical_clock(), 2);
}

#[test]
fn cross_signature_match_earns_pseudo_hit() {
    let mut qt = qtable();
    let mut table = tracker(4, 100);

    table.insert(&mut qt, 0x1000, 2, 7);
    table.insert(&mut qt, 0x2000, 3, 8);

    // Same address, different signature: the earlier row gets the pseudo-hit
    // only.
    table.check_and_reward(0x1000, 9);
    assert_eq!(table.entries()[0].reward, HIT + MISS + PSEUDO_HIT);
    assert_eq!(table.entries()[1].reward, HIT + MISS);
}

#[test]
fn check_and_reward_ignores_unknown_addresses() {
    let mut qt = qtable();
    let mut table = tracker(4, 100);

    table.insert(&mut qt, 0x1000, 2, 7);
    let before = table.entries().to_vec();
    let clock = table.logical_clock();

    table.check_and_reward(0xDEAD_0000, 7);

    // No match means no penalty pass and no clock movement.
    assert_eq!(table.entries(), &before[..]);
    assert_eq!(table.logical_clock(), clock);
}

#[test]
fn check_and_reward_never_allocates() {
    let mut qt = qtable();
    let mut table = tracker(4, 100);

    table.insert(&mut qt, 0x1000, 2, 7);
    table.check_and_reward(0x1000, 7);

    assert_eq!(table.valid_count(), 1);
    assert_eq!(table.logical_clock(), 1);
    assert_eq!(table.entries()[0].reward, 2 * HIT);
}

#[test]
fn lookup_classifies_matches() {
    let mut qt = qtable();
    let mut table = tracker(4, 100);

    table.insert(&mut qt, 0x1000, 2, 7);
    table.insert(&mut qt, 0x1000, 2, 9);

    assert_eq!(table.lookup(0x9999, 7), MatchOutcome::NoMatch);
    assert_eq!(table.lookup(0x1000, 5), MatchOutcome::AddressOnly(vec![0, 1]));
    assert_eq!(
        table.lookup(0x1000, 9),
        MatchOutcome::Exact {
            row: 1,
            address_only: vec![0],
        }
    );
}

#[test]
fn flushing_an_empty_slot_leaves_qtable_untouched() {
    let mut qt = qtable();
    let mut table = tracker(4, 100);

    // The victim for a fresh table is an invalid zeroed slot; its flush is a
    // zero-reward update that must not disturb the table.
    table.insert(&mut qt, 0x1000, 2, 7);
    for signature in 0..8 {
        for column in 0..qt.n_columns() {
            assert_eq!(qt.value(signature, column), 0.0);
        }
    }
}
