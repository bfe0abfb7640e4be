//! Trace input and prediction output adapters.
//!
//! The learning engine only sees preprocessed [`trace::TraceRecord`]s and
//! the [`output::PredictionSink`] interface; everything file-shaped lives
//! here.

/// Prediction and Q-value output sinks.
pub mod output;

/// Load-trace reading and preprocessing.
pub mod trace;
