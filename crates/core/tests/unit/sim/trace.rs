//! Trace loader tests.

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use qfetch_core::common::AddressMap;
use qfetch_core::sim::trace::load_trace;
use qfetch_core::QfetchError;

fn write_trace(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).unwrap();
}

fn map() -> AddressMap {
    AddressMap::new(4096, 64).unwrap()
}

#[test]
fn parses_competition_csv() {
    let dir = TempDir::new().unwrap();
    write_trace(
        &dir,
        "trace.csv",
        "1, 100, dead0, 400abc, 1\n2, 120, dead40, 400abc, 0\n",
    );

    let records = load_trace(dir.path().to_str().unwrap(), "trace.csv", &map()).unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].instruction_id, 1);
    assert_eq!(records[0].address, 0xdead0);
    assert_eq!(records[0].ip, 0x400abc);
    assert_eq!(records[0].tag, 0xdead0 >> 12);
    assert_eq!(records[0].block, (0xdead0 >> 6) & 0x3f);

    assert_eq!(records[1].instruction_id, 2);
    assert_eq!(records[1].address, 0xdead40);
}

#[test]
fn skips_blank_lines() {
    let dir = TempDir::new().unwrap();
    write_trace(&dir, "trace.csv", "1, 100, 1000, 400abc, 1\n\n   \n2, 110, 1040, 400abc, 0\n");

    let records = load_trace(dir.path().to_str().unwrap(), "trace.csv", &map()).unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn missing_file_is_trace_not_found() {
    let dir = TempDir::new().unwrap();
    let err = load_trace(dir.path().to_str().unwrap(), "no_such.csv", &map()).unwrap_err();
    assert!(matches!(err, QfetchError::TraceNotFound { .. }));
}

#[test]
fn short_line_reports_line_number() {
    let dir = TempDir::new().unwrap();
    write_trace(&dir, "trace.csv", "1, 100, 1000, 400abc, 1\n2, 110\n");

    let err = load_trace(dir.path().to_str().unwrap(), "trace.csv", &map()).unwrap_err();
    match err {
        QfetchError::TraceFormat { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn bad_hex_address_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_trace(&dir, "trace.csv", "1, 100, 0xzz, 400abc, 1\n");

    let err = load_trace(dir.path().to_str().unwrap(), "trace.csv", &map()).unwrap_err();
    assert!(matches!(err, QfetchError::TraceFormat { line: 1, .. }));
}

#[test]
fn bad_instruction_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_trace(&dir, "trace.csv", "abc, 100, 1000, 400abc, 1\n");

    assert!(load_trace(dir.path().to_str().unwrap(), "trace.csv", &map()).is_err());
}
