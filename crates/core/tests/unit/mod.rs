//! # Unit Components
//!
//! Organizes the unit tests along the source tree of `qfetch-core`.

/// Tests for address decomposition and error formatting.
pub mod common;


/// Tests for the learning engine: signature hashing, Q-table, replacement
/// policies, reward tracker, and the orchestrating state machine.
pub mod engine;
