//! End-to-end runs of the maprep binary: generate the demo workbook,
//! process it, and check the rendered output file.

use assert_cmd::Command;
use calamine::{open_workbook_auto, Data, Reader};
use predicates::prelude::*;
use std::path::Path;

fn maprep() -> Command {
    Command::cargo_bin("maprep").unwrap()
}

fn cell_text(range: &calamine::Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn cell_number(range: &calamine::Range<Data>, row: u32, col: u32) -> f64 {
    match range.get_value((row, col)) {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        _ => 0.0,
    }
}

fn write_demo(dir: &Path) -> std::path::PathBuf {
    let demo = dir.join("demo.xlsx");
    maprep()
        .args(["demo", "--output", demo.to_str().unwrap()])
        .assert()
        .success();
    demo
}

#[test]
fn test_demo_then_process() {
    let dir = tempfile::tempdir().unwrap();
    let demo = write_demo(dir.path());
    let out = dir.path().join("processed.xlsx");

    maprep()
        .args([
            "process",
            demo.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("merged 1 new row(s)"))
        .stdout(predicate::str::contains("Output written to"));

    let mut wb = open_workbook_auto(&out).unwrap();
    let far = wb.worksheet_range("FAR").unwrap();

    // First rendered table with its dynamic month headers.
    assert_eq!(cell_text(&far, 5, 0), "Plant & Machinery");
    assert_eq!(cell_text(&far, 6, 0), "Depreciation rate: 20%");
    assert_eq!(cell_text(&far, 7, 7), "Dep Apr-24");
    assert_eq!(cell_text(&far, 7, 18), "Dep Mar-25");
    assert_eq!(
        cell_text(&far, 7, 19),
        "Total Depreciation (as at Dec-2024)"
    );
    // Units row.
    assert_eq!(cell_text(&far, 8, 2), "£");
    assert_eq!(cell_text(&far, 8, 5), "%");
    // Dishwasher: 2400 at 20% is 40/month through the December cutoff.
    assert_eq!(cell_number(&far, 9, 2), 2400.0);
    assert_eq!(cell_number(&far, 9, 7), 40.0);
    // The merged pizza oven landed as a third data row, split into the
    // addition column because it was bought in-year.
    assert_eq!(cell_text(&far, 11, 1), "Pizza oven");
    assert_eq!(cell_number(&far, 11, 3), 3200.0);
    assert_eq!(cell_text(&far, 12, 1), "Total");

    // Per-account sheets were created and summarized.
    let sheet_names = wb.sheet_names().to_vec();
    for name in ["Sales", "Bank Account", "VAT Control", "PAYE Control"] {
        assert!(sheet_names.iter().any(|n| n == name), "missing {name}");
    }
    let vat = wb.worksheet_range("VAT Control").unwrap();
    assert_eq!(cell_text(&vat, 14, 0), "Month");
}

#[test]
fn test_reprocessing_output_merges_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let demo = write_demo(dir.path());
    let first = dir.path().join("first.xlsx");
    let second = dir.path().join("second.xlsx");

    maprep()
        .args(["process", demo.to_str().unwrap(), "--output", first.to_str().unwrap()])
        .assert()
        .success();

    maprep()
        .args(["process", first.to_str().unwrap(), "--output", second.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("merged 0 new row(s)"));
}

#[test]
fn test_inspect_lists_tables() {
    let dir = tempfile::tempdir().unwrap();
    let demo = write_demo(dir.path());

    maprep()
        .args(["inspect", demo.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plant & Machinery"))
        .stdout(predicate::str::contains("Pizza oven"));
}

#[test]
fn test_inspect_csv_dump() {
    let dir = tempfile::tempdir().unwrap();
    let demo = write_demo(dir.path());
    let csv_dir = dir.path().join("csv");

    maprep()
        .args([
            "inspect",
            demo.to_str().unwrap(),
            "--csv",
            csv_dir.to_str().unwrap(),
        ])
        .assert()
        .success();

    let plant = std::fs::read_to_string(csv_dir.join("plant___machinery.csv")).unwrap();
    assert!(plant.starts_with("Purchase Date,Details,Cost"));
    assert!(plant.contains("Pizza oven"));
}

#[test]
fn test_missing_file_fails_cleanly() {
    maprep()
        .args(["process", "no-such-file.xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
