//! Scanner for the embedded asset-category tables on the FAR sheet.
//!
//! Each table is position-encoded: a name row, a "Depreciation rate: N%"
//! line, a header row, then data rows down to a "Total" terminator in the
//! second column. Tables follow each other separated by blank rows.

use regex::Regex;

use crate::layout;
use crate::models::{AssetRow, AssetTable};
use crate::sheet::Sheet;

pub fn parse_far_tables(far: &Sheet, warnings: &mut Vec<String>) -> Vec<AssetTable> {
    let rate_re = Regex::new(r"(?i)Depreciation rate\s*:\s*([\d.]+)%").unwrap();

    let mut tables = Vec::new();
    let max_row = far.max_row();
    let mut row = layout::FAR_FIRST_TABLE_ROW;

    while row <= max_row {
        let name = far.text(row, 0).trim().to_string();
        if name.is_empty() {
            row += 1;
            continue;
        }

        let rate_line = far.text(row + 1, 0);
        let rate = rate_re
            .captures(&rate_line)
            .and_then(|m| m[1].parse::<f64>().ok());
        if rate.is_none() {
            warnings.push(format!(
                "No depreciation rate line under table '{name}'; assuming 0%"
            ));
        }

        // Name row, rate row, header row, then data.
        let data_start = row + 3;
        let mut data_end = data_start;
        while data_end <= max_row && far.text(data_end, 1).trim().to_lowercase() != "total" {
            data_end += 1;
        }

        let mut rows = Vec::new();
        for r in data_start..data_end {
            let asset = AssetRow::new(
                far.date(r, 0),
                far.text(r, 0),
                far.text(r, 1),
                far.number(r, 2),
                far.number(r, 3),
            );
            // Blank spacer rows and units rows ("£"/"%" markers) carry no
            // asset data and are dropped, so re-parsing a rendered sheet
            // yields the same table.
            if is_empty_row(&asset) {
                continue;
            }
            rows.push(asset);
        }
        tables.push(AssetTable { name, rate, rows });

        // Skip past the terminator and any trailing blanks.
        row = data_end + 1;
        while row <= max_row && far.text(row, 0).trim().is_empty() {
            row += 1;
        }
    }
    tables
}

fn is_empty_row(row: &AssetRow) -> bool {
    let unit_text = |s: &str| matches!(s.trim(), "" | "£" | "%");
    unit_text(&row.purchase_raw)
        && unit_text(&row.details)
        && row.cost == 0.0
        && row.addition == 0.0
}
