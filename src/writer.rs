//! Serialize the in-memory workbook to an .xlsx file.
//!
//! One-way export: values, formulas, the minimal styling the output
//! contract carries (bold, number formats, highlight fills) and column
//! widths. Dates are written as serial numbers with a date format so the
//! spreadsheet shows them natively.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, Workbook as XlsxWorkbook};

use crate::error::{MaprepError, Result};
use crate::sheet::{date_to_serial, CellStyle, CellValue, Workbook};

pub fn write_workbook(wb: &Workbook, path: &Path) -> Result<()> {
    let mut out = XlsxWorkbook::new();
    for sheet in wb.sheets() {
        let worksheet = out.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(|e| MaprepError::WorkbookWrite(e.to_string()))?;
        worksheet.set_screen_gridlines(false);

        for ((row, col), cell) in sheet.cells() {
            let format = build_format(&cell.style, &cell.value);
            let result = match &cell.value {
                CellValue::Empty => {
                    if cell.style == CellStyle::default() {
                        continue;
                    }
                    worksheet.write_blank(*row, *col, &format)
                }
                CellValue::Text(s) => worksheet.write_string_with_format(*row, *col, s, &format),
                CellValue::Number(n) => {
                    worksheet.write_number_with_format(*row, *col, *n, &format)
                }
                CellValue::Date(d) => {
                    worksheet.write_number_with_format(*row, *col, date_to_serial(*d), &format)
                }
                CellValue::Formula(f) => {
                    let formula = f.strip_prefix('=').unwrap_or(f);
                    worksheet.write_formula_with_format(*row, *col, formula, &format)
                }
            };
            result.map_err(|e| {
                MaprepError::WorkbookWrite(format!(
                    "cell ({row}, {col}) on '{}': {e}",
                    sheet.name
                ))
            })?;
        }

        for (col, width) in sheet.col_widths() {
            worksheet
                .set_column_width(col, width)
                .map_err(|e| MaprepError::WorkbookWrite(e.to_string()))?;
        }
    }
    out.save(path)
        .map_err(|e| MaprepError::WorkbookWrite(e.to_string()))?;
    Ok(())
}

fn build_format(style: &CellStyle, value: &CellValue) -> Format {
    let mut format = Format::new();
    if style.bold {
        format = format.set_bold();
    }
    if style.highlight {
        format = format.set_background_color(Color::Yellow);
    }
    match &style.num_format {
        Some(num) => format = format.set_num_format(num),
        // Bare date cells still need a date format to display as dates.
        None => {
            if matches!(value, CellValue::Date(_)) {
                format = format.set_num_format("dd-mm-yyyy");
            }
        }
    }
    format
}
