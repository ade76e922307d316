//! Summary post-pass over the per-account sheets.
//!
//! After the FormatN builders run, each account sheet's final summary value
//! is propagated into its C8 cell, the last table row is bolded, and the
//! summary columns are autosized. Sheets whose builders produced nothing
//! are deleted from the workbook.

use crate::fmt::{SUMMARY_MONEY_FORMAT, WHOLE_FORMAT};
use crate::layout;
use crate::sheet::{CellStyle, CellValue, Sheet, Workbook};

const NO_DATA_MARKER: &str = "No data found";

/// Run the post-pass; returns the names of the sheets deleted for holding
/// no summary data.
pub fn finalize_summary_sheets(wb: &mut Workbook) -> Vec<String> {
    let names: Vec<String> = wb
        .sheet_names()
        .into_iter()
        .filter(|n| !layout::is_system_sheet(n))
        .collect();

    for name in &names {
        let ws = wb.sheet_mut(name).unwrap();
        finalize_sheet(ws);
    }

    let mut deleted = Vec::new();
    for name in names {
        let ws = wb.sheet(&name).unwrap();
        let (sr, sc) = layout::SUMMARY_VALUE_CELL;
        if ws.text(sr, sc) == NO_DATA_MARKER {
            wb.remove_sheet(&name);
            deleted.push(name);
        }
    }
    deleted
}

fn finalize_sheet(ws: &mut Sheet) {
    let (sr, sc) = layout::SUMMARY_VALUE_CELL;

    let Some(last_row) = last_summary_row(ws) else {
        ws.set(sr, sc, CellValue::Text(NO_DATA_MARKER.to_string()));
        return;
    };

    let last_col = (0..=ws.max_col())
        .rev()
        .find(|c| !ws.is_blank(last_row, *c))
        .unwrap_or(0);

    // Last numeric value on the final row is the sheet's summary figure.
    let mut summary: Option<(u16, f64)> = None;
    for col in 0..=last_col {
        if let CellValue::Number(n) = ws.value(last_row, col) {
            summary = Some((col, *n));
        }
    }

    if ws.is_blank(sr, sc) {
        match summary {
            Some((col, value)) => {
                ws.style_mut(last_row, col).highlight = true;
                ws.set_styled(
                    sr,
                    sc,
                    CellValue::Number(value),
                    CellStyle {
                        num_format: Some(SUMMARY_MONEY_FORMAT.to_string()),
                        ..CellStyle::default()
                    },
                );
            }
            None => {
                ws.set(sr, sc, CellValue::Text("No numeric summary value".to_string()));
            }
        }
    }

    for col in 0..=last_col {
        ws.style_mut(last_row, col).bold = true;
    }

    // Whole-pound display on summary body numbers that carry no format yet.
    for row in layout::SUMMARY_START_ROW + 1..=last_row {
        for col in 0..=last_col {
            if matches!(ws.value(row, col), CellValue::Number(_)) {
                let style = ws.style_mut(row, col);
                if style.num_format.is_none() {
                    style.num_format = Some(WHOLE_FORMAT.to_string());
                }
            }
        }
    }
    autosize(ws, last_row, last_col);
}

/// Bottom-most non-blank first-column row of the summary table, if any.
fn last_summary_row(ws: &Sheet) -> Option<u32> {
    (layout::SUMMARY_START_ROW..=ws.max_row())
        .rev()
        .find(|r| !ws.is_blank(*r, 0))
}

fn autosize(ws: &mut Sheet, last_row: u32, last_col: u16) {
    for col in 0..=last_col {
        let mut longest = 0;
        for row in layout::SUMMARY_START_ROW..=last_row {
            let len = ws.text(row, col).len();
            if len > longest {
                longest = len;
            }
        }
        ws.set_col_width(col, (longest + 2) as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn summary_sheet(name: &str) -> Sheet {
        let mut ws = Sheet::new(name);
        ws.set(3, 0, text(name));
        ws.set(14, 0, text("Month"));
        ws.set(14, 3, text("Outstanding"));
        ws.set(15, 0, text("June 2024"));
        ws.set(15, 3, CellValue::Number(80.0));
        ws.set(16, 0, text("Outstanding Total"));
        ws.set(16, 3, CellValue::Number(310.0));
        ws
    }

    #[test]
    fn test_summary_value_propagates_to_c8() {
        let mut wb = Workbook::new();
        *wb.ensure_sheet("VAT Control") = summary_sheet("VAT Control");
        let deleted = finalize_summary_sheets(&mut wb);
        assert!(deleted.is_empty());
        let ws = wb.sheet("VAT Control").unwrap();
        assert_eq!(ws.number(7, 2), 310.0);
        // Source cell highlighted, final row bolded.
        let (_, cell) = ws.cells().find(|((r, c), _)| *r == 16 && *c == 3).unwrap();
        assert!(cell.style.highlight);
        assert!(cell.style.bold);
    }

    #[test]
    fn test_existing_c8_is_left_alone() {
        let mut wb = Workbook::new();
        let ws = wb.ensure_sheet("VAT Control");
        *ws = summary_sheet("VAT Control");
        ws.set(7, 2, CellValue::Number(99.0));
        finalize_summary_sheets(&mut wb);
        assert_eq!(wb.sheet("VAT Control").unwrap().number(7, 2), 99.0);
    }

    #[test]
    fn test_empty_sheet_is_deleted() {
        let mut wb = Workbook::new();
        let ws = wb.ensure_sheet("Ghost");
        ws.set(3, 0, text("Ghost"));
        let deleted = finalize_summary_sheets(&mut wb);
        assert_eq!(deleted, vec!["Ghost".to_string()]);
        assert!(!wb.contains("Ghost"));
    }

    #[test]
    fn test_system_sheets_are_untouched() {
        let mut wb = Workbook::new();
        wb.ensure_sheet("FAR").set(5, 0, text("Plant & Machinery"));
        wb.ensure_sheet("Mappings");
        let deleted = finalize_summary_sheets(&mut wb);
        assert!(deleted.is_empty());
        assert!(wb.contains("FAR"));
        assert!(wb.contains("Mappings"));
        assert!(wb.sheet("FAR").unwrap().is_blank(7, 2));
    }

    #[test]
    fn test_text_only_summary_marks_no_numeric_value() {
        let mut wb = Workbook::new();
        let ws = wb.ensure_sheet("Notes");
        ws.set(14, 0, text("Header"));
        ws.set(15, 0, text("only words"));
        let deleted = finalize_summary_sheets(&mut wb);
        assert!(deleted.is_empty());
        assert_eq!(wb.sheet("Notes").unwrap().text(7, 2), "No numeric summary value");
    }
}
