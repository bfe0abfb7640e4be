//! Prediction output sinks.
//!
//! The engine emits accepted prefetches through the narrow
//! [`PredictionSink`] interface; the file-backed [`OutputWriter`] produces
//! the two line-oriented streams of the competition format:
//!
//! - prediction file: `"<instruction_id> <prefetch_address>"` per accepted
//!   prefetch, the address as lowercase hex without a `0x` prefix;
//! - Q-value file: the scalar that justified each decision, same order.
//!
//! Writes are buffered; contents are guaranteed on disk after `close()`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::common::error::QfetchError;

/// Destination for accepted prefetch predictions.
pub trait PredictionSink {
    /// Records one accepted prefetch.
    ///
    /// # Arguments
    ///
    /// * `instruction_id` - Trace id of the triggering load.
    /// * `prefetch_address` - Byte address being prefetched.
    /// * `q_value` - Q-estimate that justified the decision.
    ///
    /// # Errors
    ///
    /// I/O failures from file-backed sinks.
    fn record(
        &mut self,
        instruction_id: u64,
        prefetch_address: u64,
        q_value: f64,
    ) -> Result<(), QfetchError>;
}

/// File-backed sink writing the prediction and Q-value streams.
#[derive(Debug)]
pub struct OutputWriter {
    /// Buffered prediction stream.
    predictions: BufWriter<File>,
    /// Buffered Q-value stream.
    q_values: BufWriter<File>,
    /// Prediction file path, kept for diagnostics.
    pred_path: PathBuf,
}

impl OutputWriter {
    /// Creates the output directory (if needed) and opens both files,
    /// overwriting previous contents.
    ///
    /// # Errors
    ///
    /// Returns [`QfetchError::Io`] when the directory or either file cannot
    /// be created.
    pub fn new(output_dir: &str, pred_file: &str, q_file: &str) -> Result<Self, QfetchError> {
        let dir = Path::new(output_dir);
        fs::create_dir_all(dir)?;

        let pred_path = dir.join(pred_file);
        let q_path = dir.join(q_file);
        Ok(Self {
            predictions: BufWriter::new(File::create(&pred_path)?),
            q_values: BufWriter::new(File::create(&q_path)?),
            pred_path,
        })
    }

    /// Path of the prediction file.
    pub fn prediction_path(&self) -> &Path {
        &self.pred_path
    }

    /// Flushes both streams and closes the writer.
    ///
    /// # Errors
    ///
    /// Returns [`QfetchError::Io`] when a flush fails.
    pub fn close(mut self) -> Result<(), QfetchError> {
        self.predictions.flush()?;
        self.q_values.flush()?;
        Ok(())
    }
}

impl PredictionSink for OutputWriter {
    fn record(
        &mut self,
        instruction_id: u64,
        prefetch_address: u64,
        q_value: f64,
    ) -> Result<(), QfetchError> {
        writeln!(self.predictions, "{instruction_id} {prefetch_address:x}")?;
        writeln!(self.q_values, "{q_value}")?;
        Ok(())
    }
}

/// In-memory sink collecting emissions; used by tests.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VecSink {
    /// Recorded `(instruction_id, prefetch_address, q_value)` triples.
    pub records: Vec<(u64, u64, f64)>,
}

impl PredictionSink for VecSink {
    fn record(
        &mut self,
        instruction_id: u64,
        prefetch_address: u64,
        q_value: f64,
    ) -> Result<(), QfetchError> {
        self.records.push((instruction_id, prefetch_address, q_value));
        Ok(())
    }
}
