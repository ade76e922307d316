//! Fixed Asset Register recalculation: parse the embedded category tables,
//! merge newly observed purchases, recompute depreciation, re-render.

pub mod depreciation;
pub mod merge;
pub mod parse;
pub mod render;

use crate::error::{MaprepError, Result};
use crate::layout;
use crate::models::{AssetTable, FiscalCalendar};
use crate::settings::Settings;
use crate::sheet::Workbook;

pub struct FarOutcome {
    pub tables: usize,
    pub rows_merged: usize,
    /// Informational merge messages, one per table that gained rows.
    pub notes: Vec<String>,
}

/// Run the full FAR pipeline against the workbook in place.
pub fn recalculate_register(
    wb: &mut Workbook,
    cal: &FiscalCalendar,
    settings: &Settings,
    warnings: &mut Vec<String>,
) -> Result<FarOutcome> {
    let far = wb
        .sheet(layout::FAR_SHEET)
        .ok_or_else(|| MaprepError::MissingSheet(layout::FAR_SHEET.to_string()))?;

    let mut tables = parse::parse_far_tables(far, warnings);
    let mut notes = Vec::new();
    let rows_merged = match wb.sheet(layout::TRANSACTIONS_SHEET) {
        Some(trans) => merge::merge_new_transactions(trans, &mut tables, &mut notes),
        None => 0,
    };
    for table in tables.iter_mut() {
        depreciation::recalculate(table, cal);
    }

    let far = wb.sheet_mut(layout::FAR_SHEET).unwrap();
    render::render_far_sheet(far, &tables, cal, settings);

    Ok(FarOutcome { tables: tables.len(), rows_merged, notes })
}

/// Parse and recalculate without rendering; used by `inspect`.
pub fn recalculated_tables(
    wb: &Workbook,
    cal: &FiscalCalendar,
    warnings: &mut Vec<String>,
) -> Result<Vec<AssetTable>> {
    let far = wb
        .sheet(layout::FAR_SHEET)
        .ok_or_else(|| MaprepError::MissingSheet(layout::FAR_SHEET.to_string()))?;
    let mut tables = parse::parse_far_tables(far, warnings);
    if let Some(trans) = wb.sheet(layout::TRANSACTIONS_SHEET) {
        let mut notes = Vec::new();
        merge::merge_new_transactions(trans, &mut tables, &mut notes);
    }
    for table in tables.iter_mut() {
        depreciation::recalculate(table, cal);
    }
    Ok(tables)
}
