//! The batch pipeline: one workbook in, one reformatted workbook out.
//!
//! Stage order matters: header dates are extracted first (fatal when
//! absent, before any mutation), then the transactions sheet is split into
//! per-account sheets, the FormatN builders fill them, the FAR is
//! recalculated and re-rendered, and the post-pass cleans up.

use crate::cleanup;
use crate::dates::{extract_header_dates, HeaderDates};
use crate::error::{MaprepError, Result};
use crate::far;
use crate::formats;
use crate::layout;
use crate::models::FiscalCalendar;
use crate::settings::Settings;
use crate::sheet::Workbook;
use crate::splitter;

/// What a run did, for the CLI to report.
#[derive(Debug, Default)]
pub struct RunReport {
    pub tables: usize,
    pub rows_merged: usize,
    pub sheets_deleted: Vec<String>,
    /// Absorbed anomalies: parse fallbacks and skipped mappings.
    pub warnings: Vec<String>,
    /// Informational messages, e.g. which tables gained merged rows.
    pub notes: Vec<String>,
}

pub fn header_dates(wb: &Workbook) -> Result<HeaderDates> {
    let far = wb
        .sheet(layout::FAR_SHEET)
        .ok_or_else(|| MaprepError::MissingSheet(layout::FAR_SHEET.to_string()))?;
    extract_header_dates(far)
}

/// Run every stage against the workbook in place.
pub fn process_workbook(wb: &mut Workbook, settings: &Settings) -> Result<RunReport> {
    let dates = header_dates(wb)?;
    let cal = FiscalCalendar::new(dates);
    let mut report = RunReport::default();

    splitter::split_account_sheets(wb, dates, settings);
    formats::apply_mappings(wb, settings, &mut report.warnings);

    let far_outcome = far::recalculate_register(wb, &cal, settings, &mut report.warnings)?;
    report.tables = far_outcome.tables;
    report.rows_merged = far_outcome.rows_merged;
    report.notes = far_outcome.notes;

    report.sheets_deleted = cleanup::finalize_summary_sheets(wb);
    Ok(report)
}
