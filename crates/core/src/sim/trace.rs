//! Load-trace reading and preprocessing.
//!
//! Traces follow the ISCA 2021 ML Prefetching Competition layout: a
//! headerless CSV where each line is
//!
//! ```text
//! instruction_id, cycle_count, load_address, ip_load, llc_hit_miss
//! ```
//!
//! Addresses are hexadecimal strings without a `0x` prefix. Only the
//! instruction id, load address, and instruction pointer are used; the cycle
//! count and hit/miss flag are carried by the trace but irrelevant to the
//! engine. Each load address is split into its page tag and in-page cache
//! block up front so the engine works purely on preprocessed records.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::common::addr::AddressMap;
use crate::common::error::QfetchError;

/// One preprocessed trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// Unique id of the load instruction, as given by the trace.
    pub instruction_id: u64,
    /// Instruction pointer of the load.
    pub ip: u64,
    /// Raw load address in bytes.
    pub address: u64,
    /// Page tag (`address >> page_bits`).
    pub tag: u64,
    /// Cache block within the page.
    pub block: u64,
}

/// Reads a trace file from `trace_dir/trace_file` and preprocesses every
/// line.
///
/// # Errors
///
/// Returns [`QfetchError::TraceNotFound`] when the file cannot be opened and
/// [`QfetchError::TraceFormat`] (with a 1-based line number) for any line
/// that does not match the expected columns.
pub fn load_trace(
    trace_dir: &str,
    trace_file: &str,
    map: &AddressMap,
) -> Result<Vec<TraceRecord>, QfetchError> {
    let path: PathBuf = Path::new(trace_dir).join(trace_file);
    let file = File::open(&path).map_err(|source| QfetchError::TraceNotFound {
        path: path.clone(),
        source,
    })?;

    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_line(&line, idx + 1, map)?);
    }
    Ok(records)
}

/// Parses one CSV line into a [`TraceRecord`].
fn parse_line(line: &str, line_no: usize, map: &AddressMap) -> Result<TraceRecord, QfetchError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(QfetchError::TraceFormat {
            line: line_no,
            reason: format!("expected at least 4 comma-separated fields, got {}", fields.len()),
        });
    }

    let instruction_id = fields[0]
        .parse::<u64>()
        .map_err(|e| QfetchError::TraceFormat {
            line: line_no,
            reason: format!("bad instruction id '{}': {e}", fields[0]),
        })?;
    let address = u64::from_str_radix(fields[2], 16).map_err(|e| QfetchError::TraceFormat {
        line: line_no,
        reason: format!("bad load address '{}': {e}", fields[2]),
    })?;
    let ip = u64::from_str_radix(fields[3], 16).map_err(|e| QfetchError::TraceFormat {
        line: line_no,
        reason: format!("bad instruction pointer '{}': {e}", fields[3]),
    })?;

    let (tag, block) = map.decode(address);
    Ok(TraceRecord {
        instruction_id,
        ip,
        address,
        tag,
        block,
    })
}
