//! Shared types for the prefetcher simulator.
//!
//! This module collects the pieces used across the engine and the trace
//! adapters: load-address decomposition and the error taxonomy.

/// Load-address decomposition into (page tag, cache block).
pub mod addr;

/// Fatal error types for configuration, input, and output failures.
pub mod error;

pub use addr::AddressMap;
pub use error::QfetchError;
