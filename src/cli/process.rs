use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::error::Result;
use crate::pipeline;
use crate::settings::load_settings;
use crate::sheet::Workbook;
use crate::writer;

pub fn run(file: &str, output: Option<String>) -> Result<()> {
    let input = Path::new(file);
    let output = output.map(PathBuf::from).unwrap_or_else(|| default_output(input));

    let settings = load_settings();
    let mut wb = Workbook::load(input)?;
    let report = pipeline::process_workbook(&mut wb, &settings)?;
    writer::write_workbook(&wb, &output)?;

    for warning in &report.warnings {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
    for note in &report.notes {
        println!("{note}");
    }
    if !report.sheets_deleted.is_empty() {
        println!(
            "Deleted {} sheet(s) with no summary data: {}",
            report.sheets_deleted.len(),
            report.sheets_deleted.join(", ")
        );
    }
    println!(
        "Recalculated {} asset table(s), merged {} new row(s).",
        report.tables, report.rows_merged
    );
    println!("{} {}", "Output written to".green(), output.display());
    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "workbook".to_string());
    input.with_file_name(format!("{stem}-processed.xlsx"))
}
