//! Split the transactions sheet into per-account summary sheets.
//!
//! Each account block (a non-blank label following a blank row) gets its
//! own sheet carrying the standard four-line header and the Date / Details
//! / Amount summary skeleton that the FormatN builders fill in later.
//! Fixed-asset accounts stay on the FAR and are not split out.

use crate::dates::HeaderDates;
use crate::fmt::SUMMARY_MONEY_FORMAT;
use crate::layout;
use crate::settings::Settings;
use crate::sheet::{CellStyle, CellValue, Workbook};

pub fn split_account_sheets(wb: &mut Workbook, dates: HeaderDates, settings: &Settings) {
    let Some(trans) = wb.sheet(layout::TRANSACTIONS_SHEET) else {
        return;
    };

    let client = trans.text(layout::TRANS_CLIENT_CELL.0, layout::TRANS_CLIENT_CELL.1);
    let mut accounts = Vec::new();
    let max_row = trans.max_row();
    for row in 0..max_row {
        if trans.is_blank(row, layout::TRANS_LABEL_COL)
            && !trans.is_blank(row + 1, layout::TRANS_LABEL_COL)
        {
            let name = trans.text(row + 1, layout::TRANS_LABEL_COL);
            if !layout::is_fixed_asset_account(name.trim()) {
                accounts.push(name);
            }
        }
    }

    for account in accounts {
        write_account_skeleton(wb, &client, &account, dates, settings);
    }
}

fn write_account_skeleton(
    wb: &mut Workbook,
    client: &str,
    account: &str,
    dates: HeaderDates,
    settings: &Settings,
) {
    let name = sanitize_sheet_name(account);
    let ws = wb.ensure_sheet(&name);
    let bold = CellStyle { bold: true, ..CellStyle::default() };

    ws.set_styled(0, 0, CellValue::Text(client.to_string()), bold.clone());
    ws.set_styled(
        1,
        0,
        CellValue::Text(format!("Year End - {}", dates.year_end.format("%d %B %Y"))),
        bold.clone(),
    );
    ws.set_styled(
        2,
        0,
        CellValue::Text(format!(
            "Management Accounts : {}",
            dates.period_end.format("%b'%y")
        )),
        bold.clone(),
    );
    let (ar, ac) = layout::ACCOUNT_NAME_CELL;
    ws.set_styled(ar, ac, CellValue::Text(account.to_string()), bold.clone());

    let header_row = layout::SKELETON_HEADER_ROW;
    ws.set_styled(header_row, 0, CellValue::Text("Date".to_string()), bold.clone());
    ws.set_styled(header_row, 1, CellValue::Text("Details".to_string()), bold.clone());
    ws.set_styled(header_row, 2, CellValue::Text("Amount £".to_string()), bold.clone());

    let (pr, pc) = layout::PERIOD_DATE_CELL;
    ws.set_styled(
        pr,
        pc,
        CellValue::Date(dates.period_end),
        CellStyle { num_format: Some(settings.date_format.clone()), ..CellStyle::default() },
    );
    ws.set(pr, pc + 1, CellValue::Text(account.to_string()));

    let total_row = layout::SKELETON_TOTAL_ROW;
    ws.set_styled(total_row, 0, CellValue::Text("Total".to_string()), bold.clone());
    ws.set_styled(
        total_row,
        2,
        CellValue::Formula("=C8".to_string()),
        CellStyle {
            bold: true,
            num_format: Some(SUMMARY_MONEY_FORMAT.to_string()),
            ..CellStyle::default()
        },
    );
}

/// Replace characters the spreadsheet format forbids in sheet names and
/// clamp to the 31-character limit.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '?' | '*' | '[' | ']' => '_',
            other => other,
        })
        .collect();
    cleaned.chars().take(layout::SHEET_NAME_MAX).collect()
}
