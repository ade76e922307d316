//! Merge newly observed asset purchases into the parsed FAR tables.
//!
//! The transactions sheet groups rows into blocks headed by an account
//! name; blocks whose name matches an asset-category table are candidate
//! sources. Rows already present in the table (same purchase date, details
//! and value) are skipped, so re-running over an unchanged sheet merges
//! nothing.

use std::collections::{HashMap, HashSet};

use crate::layout;
use crate::models::{AssetRow, AssetTable};
use crate::sheet::Sheet;

/// Extract new purchase rows per category and append them. Returns the
/// number of rows merged across all tables.
pub fn merge_new_transactions(
    trans: &Sheet,
    tables: &mut [AssetTable],
    notes: &mut Vec<String>,
) -> usize {
    let max_row = trans.max_row();

    // Column positions from the header row, with fixed fallbacks.
    let mut header_map: HashMap<String, u16> = HashMap::new();
    for col in 0..=trans.max_col() {
        let header = trans.text(layout::TRANS_HEADER_ROW, col).trim().to_lowercase();
        if !header.is_empty() {
            header_map.entry(header).or_insert(col);
        }
    }
    let date_col = *header_map
        .get("purchase date")
        .unwrap_or(&layout::TRANS_LABEL_COL);
    let details_col = *header_map
        .get("details")
        .unwrap_or(&layout::TRANS_DETAILS_FALLBACK_COL);

    let mut merged_total = 0;
    let mut row = layout::TRANS_HEADER_ROW + 1;
    while row <= max_row {
        let label = trans.text(row, layout::TRANS_LABEL_COL).trim().to_string();
        if label.is_empty() || label.to_lowercase() == "total" {
            row += 1;
            continue;
        }
        let Some(table) = tables.iter_mut().find(|t| t.name == label) else {
            row += 1;
            continue;
        };

        // Collect the block under this category header.
        let mut block_end = row + 1;
        let mut candidates = Vec::new();
        while block_end <= max_row {
            let first = trans.text(block_end, layout::TRANS_LABEL_COL).trim().to_string();
            if first.to_lowercase().starts_with("total") {
                break;
            }
            if !is_balance_sentinel(&first) {
                let details = trans.text(block_end, details_col);
                if !is_balance_sentinel(details.trim()) {
                    candidates.push(AssetRow::new(
                        trans.date(block_end, date_col),
                        trans.text(block_end, date_col),
                        details,
                        trans.number(block_end, layout::TRANS_COST_COL),
                        0.0,
                    ));
                }
            }
            block_end += 1;
        }

        let mut keys: HashSet<String> = table.rows.iter().map(AssetRow::merge_key).collect();
        let mut merged_here = 0;
        for candidate in candidates {
            if keys.insert(candidate.merge_key()) {
                table.rows.push(candidate);
                merged_here += 1;
            }
        }
        if merged_here > 0 {
            notes.push(format!(
                "Appending {merged_here} new transaction row(s) to table '{}'",
                table.name
            ));
        }
        merged_total += merged_here;
        row = block_end + 1;
    }
    merged_total
}

fn is_balance_sentinel(label: &str) -> bool {
    let lower = label.to_lowercase();
    lower == "opening balance" || lower == "closing balance"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::CellValue;
    use chrono::NaiveDate;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn trans_sheet() -> Sheet {
        let mut sheet = Sheet::new("Account Transactions");
        sheet.set(4, 0, text("Date"));
        sheet.set(4, 2, text("Details"));
        sheet.set(6, 0, text("Plant & Machinery"));
        sheet.set(7, 0, text("Opening Balance"));
        sheet.set(8, 0, CellValue::Date(date(2024, 6, 10)));
        sheet.set(8, 2, text("Glass washer"));
        sheet.set(8, 7, CellValue::Number(1200.0));
        sheet.set(9, 0, CellValue::Date(date(2024, 7, 2)));
        sheet.set(9, 2, text("Fryer"));
        sheet.set(9, 7, CellValue::Number(640.0));
        sheet.set(10, 0, text("Total Plant & Machinery"));
        sheet.set(12, 0, text("Sales"));
        sheet.set(13, 0, CellValue::Date(date(2024, 6, 1)));
        sheet.set(13, 2, text("Till takings"));
        sheet.set(13, 7, CellValue::Number(950.0));
        sheet.set(14, 0, text("Total Sales"));
        sheet
    }

    fn table(name: &str) -> AssetTable {
        AssetTable { name: name.to_string(), rate: Some(20.0), rows: Vec::new() }
    }

    #[test]
    fn test_merges_matching_block_only() {
        let mut tables = vec![table("Plant & Machinery")];
        let mut notes = Vec::new();
        let merged = merge_new_transactions(&trans_sheet(), &mut tables, &mut notes);
        assert_eq!(merged, 2);
        let rows = &tables[0].rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].details, "Glass washer");
        assert_eq!(rows[0].cost, 1200.0);
        assert_eq!(rows[0].purchase_date, Some(date(2024, 6, 10)));
        assert_eq!(rows[1].details, "Fryer");
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_balance_rows_are_excluded() {
        let mut tables = vec![table("Plant & Machinery")];
        let mut notes = Vec::new();
        merge_new_transactions(&trans_sheet(), &mut tables, &mut notes);
        assert!(tables[0]
            .rows
            .iter()
            .all(|r| r.details.to_lowercase() != "opening balance"));
    }

    #[test]
    fn test_second_pass_merges_nothing() {
        let trans = trans_sheet();
        let mut tables = vec![table("Plant & Machinery")];
        let mut notes = Vec::new();
        assert_eq!(merge_new_transactions(&trans, &mut tables, &mut notes), 2);
        assert_eq!(merge_new_transactions(&trans, &mut tables, &mut notes), 0);
        assert_eq!(tables[0].rows.len(), 2);
    }

    #[test]
    fn test_dedup_survives_cost_addition_split() {
        use crate::dates::HeaderDates;
        use crate::models::FiscalCalendar;

        let trans = trans_sheet();
        let mut tables = vec![table("Plant & Machinery")];
        let mut notes = Vec::new();
        merge_new_transactions(&trans, &mut tables, &mut notes);

        // Recalculating moves in-year purchases into the addition column;
        // the merge key must still match the raw transaction rows.
        let cal = FiscalCalendar::new(HeaderDates {
            year_end: date(2025, 3, 31),
            period_end: date(2024, 12, 31),
        });
        super::super::depreciation::recalculate(&mut tables[0], &cal);
        assert_eq!(tables[0].rows[0].cost, 0.0);
        assert_eq!(tables[0].rows[0].addition, 1200.0);

        assert_eq!(merge_new_transactions(&trans, &mut tables, &mut notes), 0);
    }

    #[test]
    fn test_duplicate_candidates_within_one_pass() {
        let mut sheet = trans_sheet();
        // Same purchase twice in the block.
        sheet.set(9, 0, CellValue::Date(date(2024, 6, 10)));
        sheet.set(9, 2, text("Glass washer"));
        sheet.set(9, 7, CellValue::Number(1200.0));
        let mut tables = vec![table("Plant & Machinery")];
        let mut notes = Vec::new();
        assert_eq!(merge_new_transactions(&sheet, &mut tables, &mut notes), 1);
    }

    #[test]
    fn test_unknown_block_is_ignored() {
        let mut tables = vec![table("Motor Vehicles")];
        let mut notes = Vec::new();
        assert_eq!(merge_new_transactions(&trans_sheet(), &mut tables, &mut notes), 0);
        assert!(tables[0].rows.is_empty());
    }

    #[test]
    fn test_missing_cost_column_defaults_to_zero() {
        let mut sheet = Sheet::new("Account Transactions");
        sheet.set(4, 0, text("Date"));
        sheet.set(6, 0, text("Plant & Machinery"));
        sheet.set(7, 0, CellValue::Date(date(2024, 5, 1)));
        sheet.set(7, 2, text("Shelving"));
        sheet.set(8, 0, text("Total"));
        let mut tables = vec![table("Plant & Machinery")];
        let mut notes = Vec::new();
        assert_eq!(merge_new_transactions(&sheet, &mut tables, &mut notes), 1);
        assert_eq!(tables[0].rows[0].cost, 0.0);
    }
}
