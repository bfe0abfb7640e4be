//! Unit tests for the learning and decision engine.


/// Engine state-machine tests (page jumps, validity, emission).
pub mod prefetcher;



/// Reward tracker tests (rewards, epochs, eviction).
pub mod tracker;
