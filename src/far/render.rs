//! Re-render the recalculated asset tables back into the FAR sheet.
//!
//! The sheet body below the metadata rows is cleared and every table is
//! written out sequentially: title, rate line, headers, units, data rows,
//! totals. Total Depreciation and WDV stay live in the output as native
//! formulas; the totals row sums each numeric column over the data range.

use crate::fmt::{cell_ref, MONEY_FORMAT, PERCENT_FORMAT};
use crate::layout;
use crate::models::{AssetTable, ColumnRole, FiscalCalendar, MonthCell};
use crate::settings::Settings;
use crate::sheet::{CellStyle, CellValue, Sheet};

pub fn render_far_sheet(
    far: &mut Sheet,
    tables: &[AssetTable],
    cal: &FiscalCalendar,
    settings: &Settings,
) {
    far.clear_below(layout::FAR_FIRST_TABLE_ROW);
    let mut cursor = layout::FAR_FIRST_TABLE_ROW;
    for table in tables {
        cursor = render_table(far, table, cal, settings, cursor);
    }
}

/// Column roles for one rendered table, in sheet order.
fn column_roles(cal: &FiscalCalendar) -> Vec<ColumnRole> {
    let mut roles: Vec<ColumnRole> = ColumnRole::STATIC.to_vec();
    roles.extend(std::iter::repeat(ColumnRole::FiscalMonth).take(cal.months.len()));
    roles.push(ColumnRole::TotalDep);
    roles.push(ColumnRole::Wdv);
    roles
}

fn render_table(
    far: &mut Sheet,
    table: &AssetTable,
    cal: &FiscalCalendar,
    settings: &Settings,
    start: u32,
) -> u32 {
    let roles = column_roles(cal);
    let month_labels = cal.month_labels();
    let as_at = cal.as_at_label();

    let headers: Vec<String> = {
        let mut h: Vec<String> = ColumnRole::STATIC.iter().map(|r| r.header().to_string()).collect();
        h.extend(month_labels.iter().cloned());
        h.push(format!("Total Depreciation (as at {as_at})"));
        h.push(format!("WDV (as at {as_at})"));
        h
    };

    let bold = CellStyle { bold: true, ..CellStyle::default() };

    // Title and rate line.
    far.set_styled(start, 0, CellValue::Text(table.name.clone()), bold.clone());
    let rate_line = match table.rate {
        Some(r) => format!("Depreciation rate: {r:.0}%"),
        None => "Depreciation rate: ".to_string(),
    };
    far.set(start + 1, 0, CellValue::Text(rate_line));

    // Header and units rows.
    let header_row = start + 2;
    for (col, header) in headers.iter().enumerate() {
        far.set_styled(header_row, col as u16, CellValue::Text(header.clone()), bold.clone());
    }
    let units_row = start + 3;
    for (col, role) in roles.iter().enumerate() {
        let unit = role.unit();
        if !unit.is_empty() {
            far.set(units_row, col as u16, CellValue::Text(unit.to_string()));
        }
    }

    // Data rows.
    let data_start = start + 4;
    let money = CellStyle { num_format: Some(MONEY_FORMAT.to_string()), ..CellStyle::default() };
    let date_style = CellStyle {
        num_format: Some(settings.date_format.clone()),
        ..CellStyle::default()
    };
    let (acc_col, total_cost_col, total_dep_col, wdv_col) = derived_columns(&roles);
    let month_cols: Vec<u16> = roles
        .iter()
        .enumerate()
        .filter(|(_, r)| **r == ColumnRole::FiscalMonth)
        .map(|(i, _)| i as u16)
        .collect();

    for (i, row) in table.rows.iter().enumerate() {
        let r = data_start + i as u32;
        match row.purchase_date {
            Some(d) => far.set_styled(r, 0, CellValue::Date(d), date_style.clone()),
            None => far.set(r, 0, CellValue::Text(row.purchase_raw.clone())),
        }
        far.set(r, 1, CellValue::Text(row.details.clone()));
        far.set_styled(r, 2, CellValue::Number(row.cost), money.clone());
        far.set_styled(r, 3, CellValue::Number(row.addition), money.clone());
        far.set_styled(r, 4, CellValue::Number(row.total_cost), money.clone());
        far.set_styled(
            r,
            5,
            CellValue::Number(table.rate_or_zero() / 100.0),
            CellStyle { num_format: Some(PERCENT_FORMAT.to_string()), ..CellStyle::default() },
        );
        far.set_styled(r, acc_col, CellValue::Number(row.accumulated), money.clone());

        for (cell, col) in row.monthly.iter().zip(&month_cols) {
            if let MonthCell::Value(v) = cell {
                far.set_styled(r, *col, CellValue::Number(*v), money.clone());
            }
        }

        // Total Depreciation = prior accumulation + the month cells.
        let mut refs = vec![cell_ref(r, acc_col)];
        refs.extend(month_cols.iter().map(|c| cell_ref(r, *c)));
        far.set_styled(
            r,
            total_dep_col,
            CellValue::Formula(format!("=SUM({})", refs.join(","))),
            money.clone(),
        );
        far.set_styled(
            r,
            wdv_col,
            CellValue::Formula(format!(
                "={}-{}",
                cell_ref(r, total_cost_col),
                cell_ref(r, total_dep_col)
            )),
            money.clone(),
        );
    }

    // Totals row.
    let totals_row = data_start + table.rows.len() as u32;
    let bold_money = CellStyle {
        bold: true,
        num_format: Some(MONEY_FORMAT.to_string()),
        ..CellStyle::default()
    };
    for (col, role) in roles.iter().enumerate() {
        let col = col as u16;
        match role {
            ColumnRole::PurchaseDate | ColumnRole::Rate => {}
            ColumnRole::Details => {
                far.set_styled(totals_row, col, CellValue::Text("Total".to_string()), bold.clone());
            }
            _ => {
                let value = if table.rows.is_empty() {
                    CellValue::Number(0.0)
                } else {
                    CellValue::Formula(format!(
                        "=SUM({}:{})",
                        cell_ref(data_start, col),
                        cell_ref(totals_row - 1, col)
                    ))
                };
                far.set_styled(totals_row, col, value, bold_money.clone());
            }
        }
    }

    autosize_columns(far, &headers, header_row, totals_row);

    totals_row + 1 + layout::FAR_TABLE_GAP
}

fn derived_columns(roles: &[ColumnRole]) -> (u16, u16, u16, u16) {
    let find = |want: ColumnRole| {
        roles.iter().position(|r| *r == want).unwrap_or(0) as u16
    };
    (
        find(ColumnRole::AccumulatedDep),
        find(ColumnRole::TotalCost),
        find(ColumnRole::TotalDep),
        find(ColumnRole::Wdv),
    )
}

/// Fit each column to its longest rendered string between the header row
/// and the totals row. Cosmetic only.
fn autosize_columns(far: &mut Sheet, headers: &[String], header_row: u32, totals_row: u32) {
    for (col, header) in headers.iter().enumerate() {
        let col = col as u16;
        let mut longest = header.len();
        for row in header_row..=totals_row {
            let len = far.text(row, col).len();
            if len > longest {
                longest = len;
            }
        }
        far.set_col_width(col, (longest + 2) as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::HeaderDates;
    use crate::far::depreciation::recalculate;
    use crate::models::AssetRow;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> FiscalCalendar {
        FiscalCalendar::new(HeaderDates {
            year_end: date(2025, 3, 31),
            period_end: date(2024, 12, 31),
        })
    }

    fn sample_table() -> AssetTable {
        let mut table = AssetTable {
            name: "Plant & Machinery".to_string(),
            rate: Some(20.0),
            rows: vec![
                AssetRow::new(
                    Some(date(2022, 5, 1)),
                    "2022-05-01".to_string(),
                    "Glass washer".to_string(),
                    1200.0,
                    0.0,
                ),
                AssetRow::new(
                    Some(date(2024, 6, 10)),
                    "2024-06-10".to_string(),
                    "Fryer".to_string(),
                    640.0,
                    0.0,
                ),
            ],
        };
        recalculate(&mut table, &calendar());
        table
    }

    fn rendered() -> Sheet {
        let mut far = Sheet::new("FAR");
        far.set(1, 0, CellValue::Text("Year End - 31 March 2025".to_string()));
        far.set(5, 0, CellValue::Text("stale body".to_string()));
        render_far_sheet(
            &mut far,
            &[sample_table()],
            &calendar(),
            &Settings::default(),
        );
        far
    }

    #[test]
    fn test_block_structure() {
        let far = rendered();
        assert_eq!(far.text(5, 0), "Plant & Machinery");
        assert_eq!(far.text(6, 0), "Depreciation rate: 20%");
        assert_eq!(far.text(7, 0), "Purchase Date");
        assert_eq!(far.text(7, 6), "Accumulated Depreciation");
        // 7 static + 12 months, then the two derived headers.
        assert_eq!(far.text(7, 19), "Total Depreciation (as at Dec-2024)");
        assert_eq!(far.text(7, 20), "WDV (as at Dec-2024)");
        // Units row.
        assert_eq!(far.text(8, 2), "£");
        assert_eq!(far.text(8, 5), "%");
        assert!(far.is_blank(8, 0));
        // Metadata above the body is untouched.
        assert_eq!(far.text(1, 0), "Year End - 31 March 2025");
    }

    #[test]
    fn test_month_headers_in_order() {
        let far = rendered();
        assert_eq!(far.text(7, 7), "Dep Apr-24");
        assert_eq!(far.text(7, 18), "Dep Mar-25");
    }

    #[test]
    fn test_data_row_formulas() {
        let far = rendered();
        // First data row is sheet row 10 (index 9).
        assert_eq!(
            far.value(9, 19),
            &CellValue::Formula(
                "=SUM(G10,H10,I10,J10,K10,L10,M10,N10,O10,P10,Q10,R10,S10)".to_string()
            )
        );
        assert_eq!(far.value(9, 20), &CellValue::Formula("=E10-T10".to_string()));
    }

    #[test]
    fn test_blank_cells_after_management_period() {
        let far = rendered();
        // Management period Dec-2024: Jan/Feb/Mar columns (17..19) stay blank.
        assert!(matches!(far.value(9, 7), CellValue::Number(_)));
        assert!(far.is_blank(9, 16));
        assert!(far.is_blank(9, 17));
        assert!(far.is_blank(9, 18));
    }

    #[test]
    fn test_totals_row() {
        let far = rendered();
        // Two data rows at 9..=10, totals at 11.
        assert_eq!(far.text(11, 1), "Total");
        assert!(far.is_blank(11, 0));
        assert!(far.is_blank(11, 5));
        assert_eq!(far.value(11, 2), &CellValue::Formula("=SUM(C10:C11)".to_string()));
        assert_eq!(far.value(11, 20), &CellValue::Formula("=SUM(U10:U11)".to_string()));
    }

    #[test]
    fn test_cursor_advances_past_gap() {
        let mut far = Sheet::new("FAR");
        let tables = vec![sample_table(), sample_table()];
        render_far_sheet(&mut far, &tables, &calendar(), &Settings::default());
        // First block: rows 5..=11, gap of 2, second title at 14.
        assert_eq!(far.text(14, 0), "Plant & Machinery");
    }

    #[test]
    fn test_empty_table_renders_header_and_zero_totals() {
        let mut far = Sheet::new("FAR");
        let table = AssetTable {
            name: "Goodwill".to_string(),
            rate: None,
            rows: Vec::new(),
        };
        render_far_sheet(&mut far, &[table], &calendar(), &Settings::default());
        assert_eq!(far.text(5, 0), "Goodwill");
        assert_eq!(far.text(6, 0), "Depreciation rate: ");
        assert_eq!(far.text(7, 0), "Purchase Date");
        // Totals directly under the units row, literal zeros.
        assert_eq!(far.text(9, 1), "Total");
        assert_eq!(far.value(9, 2), &CellValue::Number(0.0));
    }

    #[test]
    fn test_unparseable_date_round_trips_as_text() {
        let mut table = AssetTable {
            name: "Motor Vehicles".to_string(),
            rate: Some(25.0),
            rows: vec![AssetRow::new(
                None,
                "mid 2022".to_string(),
                "Van".to_string(),
                9000.0,
                0.0,
            )],
        };
        recalculate(&mut table, &calendar());
        let mut far = Sheet::new("FAR");
        render_far_sheet(&mut far, &[table], &calendar(), &Settings::default());
        assert_eq!(far.value(9, 0), &CellValue::Text("mid 2022".to_string()));
        // Every month cell blank for the dateless row.
        for col in 7..=18 {
            assert!(far.is_blank(9, col));
        }
    }
}
