//! Online Q-learning cache-line prefetcher simulator.
//!
//! This crate replays a trace of memory load addresses and learns, online,
//! which cache-line offsets to prefetch next. It provides:
//! 1. **Engine:** signature hashing, the per-signature delta Q-table,
//!    epsilon-greedy action selection, and a reward tracker that feeds
//!    delayed credit back into the table.
//! 2. **Adapters:** ISCA-style load-trace preprocessing and the prediction /
//!    Q-value output sinks.
//! 3. **Configuration:** the four-section JSON config with defaults and
//!    validation.
//! 4. **Statistics:** per-run counters for accesses, prefetches, and table
//!    turnover.

/// Shared types: address decomposition and the error taxonomy.
pub mod common;
/// Simulator configuration (defaults, sections, loading, validation).
pub mod config;
/// The learning and decision engine.
pub mod engine;
/// Trace input and prediction output adapters.
pub mod sim;
/// Run statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or `Config::from_file`.
pub use crate::config::Config;
/// All fatal error conditions of a run.
pub use crate::common::error::QfetchError;
/// The orchestrator; construct with `PrefetchEngine::new` and feed it a
/// preprocessed trace.
pub use crate::engine::prefetcher::PrefetchEngine;
