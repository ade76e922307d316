//! Per-account summary builders driven by the Mappings sheet.
//!
//! Each mapping row names an account and one of ten fixed summary recipes.
//! Every recipe reads the account's block from the transactions sheet and
//! writes its table into the per-account sheet starting at row 15. Missing
//! accounts are skipped with a diagnostic; the sheet-deletion pass removes
//! their empty sheets later.

use chrono::NaiveDate;

use crate::fmt::{MONEY_FORMAT, SUMMARY_MONEY_FORMAT, TAX_PERCENT_FORMAT};
use crate::layout;
use crate::settings::Settings;
use crate::sheet::{CellStyle, CellValue, Sheet, Workbook};

pub fn apply_mappings(wb: &mut Workbook, settings: &Settings, warnings: &mut Vec<String>) {
    let Some(mappings_sheet) = wb.sheet(layout::MAPPINGS_SHEET) else {
        return;
    };
    let mut mappings = Vec::new();
    for row in 1..=mappings_sheet.max_row() {
        let account = mappings_sheet.text(row, 0).trim().to_string();
        let format = mappings_sheet.text(row, 1).trim().to_string();
        if !account.is_empty() && !format.is_empty() {
            mappings.push((account, format));
        }
    }

    // The builders read the transactions/P&L sheets while writing their
    // target sheet, so work from snapshots.
    let Some(trans) = wb.sheet(layout::TRANSACTIONS_SHEET).cloned() else {
        return;
    };
    let pl = wb.sheet(layout::PL_SHEET).cloned();

    for (account, format) in mappings {
        let Some(target) = find_target_sheet(wb, &account) else {
            warnings.push(format!("No account sheet found for mapping '{account}'"));
            continue;
        };
        let ws = wb.sheet_mut(&target).unwrap();
        match format.to_lowercase().as_str() {
            "format1" => format1(ws, &trans, &account, warnings),
            "format2" => format2(ws, &trans, &account, warnings),
            "format3" => format3(ws, &trans, &account, warnings),
            "format4" => format4(ws, &trans, &account, warnings),
            "format5" => format5(ws, &trans, pl.as_ref(), &account, settings, warnings),
            "format6" => format6(ws, &trans, &account, warnings),
            "format7" => format7(ws, &trans, &account, warnings),
            "format8" => format8(ws, &trans, &account, warnings),
            "format9" => format9(ws, &trans, &account, warnings),
            "format10" => format10(ws, &trans, &account, warnings),
            other => warnings.push(format!("Unknown format '{other}' for '{account}'")),
        }
    }
}

fn find_target_sheet(wb: &Workbook, account: &str) -> Option<String> {
    wb.sheets()
        .iter()
        .filter(|s| {
            s.name != layout::MAPPINGS_SHEET
                && s.name != layout::TRANSACTIONS_SHEET
                && s.name != layout::PL_SHEET
        })
        .find(|s| {
            s.text(layout::ACCOUNT_NAME_CELL.0, layout::ACCOUNT_NAME_CELL.1).trim() == account
        })
        .map(|s| s.name.clone())
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

fn find_account_row(trans: &Sheet, account: &str) -> Option<u32> {
    (0..=trans.max_row()).find(|r| trans.text(*r, layout::TRANS_LABEL_COL).trim() == account)
}

/// Opening balance from the row under the account header: debit − credit
/// (or reversed for accounts carried the other way around).
fn opening_balance(trans: &Sheet, account_row: u32, debit_minus_credit: bool) -> f64 {
    let row = account_row + 1;
    let debit = trans.number(row, layout::TRANS_DEBIT_COL);
    let credit = trans.number(row, layout::TRANS_CREDIT_COL);
    if debit_minus_credit {
        debit - credit
    } else {
        credit - debit
    }
}

/// Month grouping key from a transaction's date cell: "Jun 2024" (short) or
/// "June 2024" (long). Unparseable non-blank cells key on their first seven
/// characters; blank cells key on the empty string.
fn month_key(trans: &Sheet, row: u32, long: bool) -> String {
    if let Some(d) = trans.date(row, layout::TRANS_LABEL_COL) {
        return if long {
            d.format("%B %Y").to_string()
        } else {
            d.format("%b %Y").to_string()
        };
    }
    let raw = trans.text(row, layout::TRANS_LABEL_COL);
    raw.chars().take(7).collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn bold() -> CellStyle {
    CellStyle { bold: true, ..CellStyle::default() }
}

/// Write a bold header row at the summary start; returns the first data row.
fn write_headers(ws: &mut Sheet, headers: &[&str]) -> u32 {
    for (col, header) in headers.iter().enumerate() {
        ws.set_styled(
            layout::SUMMARY_START_ROW,
            col as u16,
            CellValue::Text(header.to_string()),
            bold(),
        );
    }
    layout::SUMMARY_START_ROW + 1
}

/// Insertion-ordered month buckets; the render order is first-seen order.
struct MonthTally<V> {
    entries: Vec<(String, V)>,
}

impl<V: Default> MonthTally<V> {
    fn new() -> Self {
        MonthTally { entries: Vec::new() }
    }

    fn entry(&mut self, key: &str) -> &mut V {
        if let Some(idx) = self.entries.iter().position(|(k, _)| k == key) {
            return &mut self.entries[idx].1;
        }
        self.entries.push((key.to_string(), V::default()));
        &mut self.entries.last_mut().unwrap().1
    }
}

fn skip_missing(warnings: &mut Vec<String>, format: &str, account: &str) {
    warnings.push(format!("Account not found for {format}: {account}"));
}

// ---------------------------------------------------------------------------
// Format1 — monthly movement matrix by sub-account
// ---------------------------------------------------------------------------

fn format1(ws: &mut Sheet, trans: &Sheet, account: &str, warnings: &mut Vec<String>) {
    let Some(account_row) = find_account_row(trans, account) else {
        skip_missing(warnings, "Format1", account);
        return;
    };
    let opening = opening_balance(trans, account_row, true);

    let mut by_account: Vec<(String, MonthTally<f64>)> = Vec::new();
    let mut months = Vec::new();
    for row in account_row + 2..=trans.max_row() {
        let label = trans.text(row, layout::TRANS_LABEL_COL);
        if label == "Total" || label == "Closing Balance" {
            break;
        }
        let key = month_key(trans, row, false);
        if key.is_empty() {
            continue;
        }
        if !months.contains(&key) {
            months.push(key.clone());
        }
        let sub = sub_account_name(trans, row);
        let idx = match by_account.iter().position(|(name, _)| *name == sub) {
            Some(i) => i,
            None => {
                by_account.push((sub, MonthTally::new()));
                by_account.len() - 1
            }
        };
        let movement = trans.number(row, layout::TRANS_DEBIT_COL)
            - trans.number(row, layout::TRANS_CREDIT_COL);
        *by_account[idx].1.entry(&key) += movement;
    }
    months.sort_by_key(|m| month_sort_key(m));

    let mut headers: Vec<&str> = vec!["Account Name", "Opening Balance"];
    headers.extend(months.iter().map(String::as_str));
    headers.push("Closing Balance");
    let mut row = write_headers(ws, &headers);

    for (name, tally) in &by_account {
        ws.set(row, 0, CellValue::Text(name.clone()));
        for (i, month) in months.iter().enumerate() {
            let value = tally
                .entries
                .iter()
                .find(|(k, _)| k == month)
                .map(|(_, v)| *v)
                .unwrap_or(0.0);
            ws.set(row, 2 + i as u16, CellValue::Number(value));
        }
        row += 1;
    }

    ws.set_styled(row, 0, CellValue::Text("Total".to_string()), bold());
    ws.set_styled(row, 1, CellValue::Number(opening), bold());
    let mut closing = opening;
    for (i, month) in months.iter().enumerate() {
        let total: f64 = by_account
            .iter()
            .flat_map(|(_, t)| t.entries.iter())
            .filter(|(k, _)| k == month)
            .map(|(_, v)| *v)
            .sum();
        ws.set_styled(row, 2 + i as u16, CellValue::Number(total), bold());
        closing += total;
    }
    ws.set_styled(
        row,
        2 + months.len() as u16,
        CellValue::Number(round2(closing)),
        bold(),
    );
}

fn sub_account_name(trans: &Sheet, row: u32) -> String {
    let raw = trans.text(row, layout::TRANS_SUBACCOUNT_COL);
    if raw.chars().count() >= layout::SUBACCOUNT_PREFIX_LEN + 1 {
        raw.chars().skip(layout::SUBACCOUNT_PREFIX_LEN).collect()
    } else {
        raw
    }
}

/// Chronological months first, unparseable keys after, alphabetically.
fn month_sort_key(key: &str) -> (u8, String) {
    match NaiveDate::parse_from_str(&format!("1 {key}"), "%d %b %Y") {
        Ok(d) => (0, d.format("%Y-%m").to_string()),
        Err(_) => (1, key.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Format2 — verbatim transaction listing with closing balance
// ---------------------------------------------------------------------------

/// Transaction columns copied through to the listing, in order.
const LISTING_COLS: [u16; 6] = [0, 1, 4, 6, 7, 8];

fn format2(ws: &mut Sheet, trans: &Sheet, account: &str, warnings: &mut Vec<String>) {
    let Some(account_row) = find_account_row(trans, account) else {
        skip_missing(warnings, "Format2", account);
        return;
    };

    // Headers carried over from the transactions sheet.
    for (i, col) in LISTING_COLS.iter().enumerate() {
        ws.set_styled(
            layout::SUMMARY_START_ROW,
            i as u16,
            trans.value(layout::TRANS_HEADER_ROW, *col).clone(),
            bold(),
        );
    }

    let mut row = layout::SUMMARY_START_ROW + 1;
    let mut sum_credit = 0.0;
    let mut sum_debit = 0.0;
    for source in account_row + 1..=trans.max_row() {
        let label = trans.text(source, layout::TRANS_LABEL_COL);
        if label.starts_with("Total") || label.starts_with("Closing Balance") {
            break;
        }
        for (i, col) in LISTING_COLS.iter().enumerate() {
            let value = trans.value(source, *col).clone();
            if i == 0 {
                ws.set_styled(
                    row,
                    0,
                    value,
                    CellStyle { num_format: Some("dd-mm-yyyy".to_string()), ..CellStyle::default() },
                );
            } else {
                ws.set(row, i as u16, value);
            }
        }
        sum_credit += trans.number(source, layout::TRANS_CREDIT_COL);
        sum_debit += trans.number(source, layout::TRANS_DEBIT_COL);
        row += 1;
    }

    let closing = round2(sum_debit - sum_credit);
    let closing_row = row + 1;
    ws.set_styled(closing_row, 0, CellValue::Text("Closing Balance".to_string()), bold());
    if closing > 0.0 {
        ws.set_styled(closing_row, 4, CellValue::Number(closing), bold());
    } else {
        ws.set_styled(closing_row, 5, CellValue::Number(closing.abs()), bold());
    }

    let (sr, sc) = layout::SUMMARY_VALUE_CELL;
    ws.set(sr, sc, CellValue::Number(round2(closing.abs())));

    let total_row = closing_row + 1;
    ws.set_styled(total_row, 0, CellValue::Text("Total".to_string()), bold());
    ws.set_styled(
        total_row,
        4,
        CellValue::Number(round2(sum_credit + closing.max(0.0))),
        bold(),
    );
    ws.set_styled(
        total_row,
        5,
        CellValue::Number(round2(sum_debit - closing.min(0.0))),
        bold(),
    );
}

// ---------------------------------------------------------------------------
// Format3 — reconciliation against an external statement
// ---------------------------------------------------------------------------

fn format3(ws: &mut Sheet, trans: &Sheet, account: &str, warnings: &mut Vec<String>) {
    let (pr, pc) = layout::PERIOD_DATE_CELL;
    let Some(period_end) = ws.date(pr, pc) else {
        warnings.push(format!("Invalid period date for Format3: {account}"));
        return;
    };
    let Some(account_row) = find_account_row(trans, account) else {
        skip_missing(warnings, "Format3", account);
        return;
    };

    let mut closing = opening_balance(trans, account_row, true);
    for row in account_row + 2..=trans.max_row() {
        let label = trans.text(row, layout::TRANS_LABEL_COL);
        if label.contains("Total") || label.contains("Closing Balance") {
            break;
        }
        closing += trans.number(row, layout::TRANS_DEBIT_COL)
            - trans.number(row, layout::TRANS_CREDIT_COL);
    }
    let closing = round2(closing);

    let row = write_headers(ws, &["Date", "Particular", "£"]);
    ws.set(row, 0, CellValue::Date(period_end));
    ws.set(row, 1, CellValue::Text("Balance as per statement".to_string()));
    ws.set(row + 1, 0, CellValue::Date(period_end));
    ws.set(row + 1, 1, CellValue::Text("Balance as per Xero".to_string()));
    ws.set(row + 1, 2, CellValue::Number(closing));
}

// ---------------------------------------------------------------------------
// Format4 — PAYE control: liability vs HMRC/NEST payments
// ---------------------------------------------------------------------------

#[derive(Default)]
struct LiabilityPayment {
    liability: f64,
    payment: f64,
}

fn format4(ws: &mut Sheet, trans: &Sheet, account: &str, warnings: &mut Vec<String>) {
    let Some(account_row) = find_account_row(trans, account) else {
        skip_missing(warnings, "Format4", account);
        return;
    };
    let opening = trans.number(account_row + 1, layout::TRANS_DEBIT_COL);

    let mut tally: MonthTally<LiabilityPayment> = MonthTally::new();
    for row in account_row + 2..=trans.max_row() {
        let label = trans.text(row, layout::TRANS_LABEL_COL);
        if label.is_empty() || label == "Total PAYE" || label == "Closing Balance" {
            break;
        }
        let debit = trans.number(row, layout::TRANS_DEBIT_COL);
        let credit = trans.number(row, layout::TRANS_CREDIT_COL);
        let key = month_key(trans, row, true);
        let contact = trans.text(row, layout::TRANS_CONTACT_COL).to_uppercase();
        let description = trans.text(row, layout::TRANS_DESC_COL).to_uppercase();
        let is_hmrc_nest = ["HMRC", "NEST"]
            .iter()
            .any(|needle| contact.contains(needle) || description.contains(needle));

        let bucket = tally.entry(&key);
        if is_hmrc_nest {
            bucket.payment += credit;
        } else {
            bucket.liability += debit;
        }
        if trans.text(row, layout::TRANS_TYPE_COL).to_uppercase() == "MANUAL JOURNAL" {
            bucket.liability -= credit;
        }
    }

    let mut row = write_headers(ws, &["Month", "Liability", "Payment", "Outstanding"]);
    ws.set(row, 0, CellValue::Text("Opening Balance".to_string()));
    ws.set(row, 1, CellValue::Number(opening));
    ws.set(row, 3, CellValue::Number(opening));
    row += 1;

    let mut total_outstanding = opening;
    for (month, bucket) in &tally.entries {
        let outstanding = bucket.liability - bucket.payment;
        ws.set(row, 0, CellValue::Text(month.clone()));
        ws.set(row, 1, CellValue::Number(bucket.liability));
        ws.set(row, 2, CellValue::Number(bucket.payment));
        ws.set(row, 3, CellValue::Number(outstanding));
        total_outstanding += outstanding;
        row += 1;
    }
    ws.set(row, 0, CellValue::Text("Outstanding Total".to_string()));
    ws.set(row, 3, CellValue::Number(total_outstanding));
}

// ---------------------------------------------------------------------------
// Format5 — VAT/tax control with the corporation-tax table
// ---------------------------------------------------------------------------

fn format5(
    ws: &mut Sheet,
    trans: &Sheet,
    pl: Option<&Sheet>,
    account: &str,
    settings: &Settings,
    warnings: &mut Vec<String>,
) {
    let Some(account_row) = find_account_row(trans, account) else {
        skip_missing(warnings, "Format5", account);
        return;
    };
    let opening = trans.number(account_row + 1, layout::TRANS_DEBIT_COL);

    let mut tally: MonthTally<LiabilityPayment> = MonthTally::new();
    for row in account_row + 2..=trans.max_row() {
        let label = trans.text(row, layout::TRANS_LABEL_COL);
        if label.is_empty() || label == "Closing Balance" || label.contains("Total") {
            break;
        }
        let debit = trans.number(row, layout::TRANS_DEBIT_COL);
        let credit = trans.number(row, layout::TRANS_CREDIT_COL);
        let key = month_key(trans, row, true);
        let contact = trans.text(row, layout::TRANS_CONTACT_COL).to_uppercase();

        let bucket = tally.entry(&key);
        if contact != "HMRC" {
            bucket.liability += debit;
        } else {
            bucket.payment += credit - debit;
        }
        if trans.text(row, layout::TRANS_TYPE_COL).to_uppercase() == "MANUAL JOURNAL" {
            bucket.liability -= credit;
        }
    }

    let mut row = write_headers(ws, &["Month", "Liability", "Payment", "Outstanding", "Payment Date"]);
    ws.set(row, 0, CellValue::Text("Opening Balance".to_string()));
    ws.set(row, 1, CellValue::Number(opening));
    row += 1;

    let mut total_liability = opening;
    let mut total_payment = 0.0;
    for (month, bucket) in &tally.entries {
        let outstanding = (bucket.liability - bucket.payment).max(0.0);
        ws.set(row, 0, CellValue::Text(month.clone()));
        ws.set(row, 1, CellValue::Number(bucket.liability));
        ws.set(row, 2, CellValue::Number(bucket.payment));
        ws.set(row, 3, CellValue::Number(outstanding));
        total_liability += bucket.liability;
        total_payment += bucket.payment;
        row += 1;
    }
    let total_outstanding = total_liability - total_payment;
    ws.set(row, 0, CellValue::Text("Balance".to_string()));
    ws.set(row, 1, CellValue::Number(total_liability));
    ws.set(row, 2, CellValue::Number(total_payment));
    ws.set(row, 3, CellValue::Number(total_outstanding));

    let (sr, sc) = layout::SUMMARY_VALUE_CELL;
    ws.set_styled(
        sr,
        sc,
        CellValue::Number(total_outstanding),
        CellStyle { num_format: Some(MONEY_FORMAT.to_string()), ..CellStyle::default() },
    );

    if let Some(pl) = pl {
        write_tax_table(ws, pl, settings);
    }
}

/// Corporation-tax computation in columns I-K, fed from the P&L sheet.
fn write_tax_table(ws: &mut Sheet, pl: &Sheet, settings: &Settings) {
    let mut profit = 0.0;
    let mut profit_ytd = 0.0;
    let mut depreciation = 0.0;
    let mut depreciation_ytd = 0.0;
    for row in 0..=pl.max_row() {
        let label = pl.text(row, 0);
        if label.is_empty() {
            continue;
        }
        if label.contains("Profit after Taxation") || label.contains("Corporation Tax Expense") {
            profit += pl.number(row, 1);
            profit_ytd += pl.number(row, 2);
        } else if label.contains("Depreciation") {
            depreciation += pl.number(row, 1);
            depreciation_ytd += pl.number(row, 2);
        }
    }
    let net = profit + depreciation;
    let net_ytd = profit_ytd + depreciation_ytd;
    let ct = settings.ct_charge(net);
    let ct_ytd = settings.ct_charge(net_ytd);

    let (pr, pc) = layout::PERIOD_DATE_CELL;
    let month_label = match ws.date(pr, pc) {
        Some(d) => d.format("%b'%y").to_string(),
        None => ws.text(pr, pc),
    };

    let money = CellStyle { num_format: Some(SUMMARY_MONEY_FORMAT.to_string()), ..CellStyle::default() };
    let percent = CellStyle {
        bold: true,
        num_format: Some(TAX_PERCENT_FORMAT.to_string()),
        ..CellStyle::default()
    };

    let rows: Vec<(&str, Option<CellValue>, Option<CellValue>, &CellStyle)> = vec![
        ("", Some(CellValue::Text(month_label)), Some(CellValue::Text("YTD".to_string())), &money),
        ("Net profit before tax", Some(CellValue::Number(profit)), Some(CellValue::Number(profit_ytd)), &money),
        ("", None, None, &money),
        ("Depreciation", Some(CellValue::Number(depreciation)), Some(CellValue::Number(depreciation_ytd)), &money),
        ("", None, None, &money),
        ("Net profit", Some(CellValue::Number(net)), Some(CellValue::Number(net_ytd)), &money),
        ("", None, None, &money),
        (
            "Corporation Tax rate",
            Some(CellValue::Number(settings.small_profits_rate)),
            Some(CellValue::Number(settings.small_profits_rate)),
            &percent,
        ),
        ("", None, None, &money),
        ("CT charge", Some(CellValue::Number(ct)), Some(CellValue::Number(ct_ytd)), &money),
        ("", None, None, &money),
        ("Total CT", Some(CellValue::Number(ct)), Some(CellValue::Number(ct_ytd)), &money),
    ];

    for (i, (label, monthly, ytd, style)) in rows.into_iter().enumerate() {
        let row = layout::SUMMARY_START_ROW + i as u32;
        let header = i == 0;
        let label_style = if header { bold() } else { CellStyle::default() };
        if !label.is_empty() {
            ws.set_styled(row, 8, CellValue::Text(label.to_string()), label_style);
        }
        for (offset, value) in [(9u16, monthly), (10u16, ytd)] {
            if let Some(value) = value {
                let style = if header { bold() } else { style.clone() };
                ws.set_styled(row, offset, value, style);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Format6 — liability vs payment difference table
// ---------------------------------------------------------------------------

fn format6(ws: &mut Sheet, trans: &Sheet, account: &str, warnings: &mut Vec<String>) {
    let Some(account_row) = find_account_row(trans, account) else {
        skip_missing(warnings, "Format6", account);
        return;
    };
    let opening = trans.number(account_row + 1, layout::TRANS_DEBIT_COL);

    let mut tally: MonthTally<LiabilityPayment> = MonthTally::new();
    for row in account_row + 2..=trans.max_row() {
        let label = trans.text(row, layout::TRANS_LABEL_COL);
        if label.is_empty() || label == "Closing Balance" || label.contains("Total") {
            break;
        }
        let key = month_key(trans, row, true);
        let bucket = tally.entry(&key);
        if trans.text(row, layout::TRANS_CONTACT_COL).to_uppercase() != "HMRC" {
            bucket.liability += trans.number(row, layout::TRANS_DEBIT_COL);
        }
        bucket.payment += trans.number(row, layout::TRANS_CREDIT_COL);
    }

    let mut row = write_headers(ws, &["Description", "Liability", "Payment", "Difference"]);
    ws.set(row, 0, CellValue::Text("Opening Balance".to_string()));
    ws.set(row, 1, CellValue::Number(opening));
    ws.set(row, 3, CellValue::Number(opening));
    row += 1;

    let mut total_liability = opening;
    let mut total_payment = 0.0;
    for (month, bucket) in &tally.entries {
        ws.set(row, 0, CellValue::Text(month.clone()));
        ws.set(row, 1, CellValue::Number(bucket.liability));
        ws.set(row, 2, CellValue::Number(bucket.payment));
        ws.set(row, 3, CellValue::Number(bucket.liability - bucket.payment));
        total_liability += bucket.liability;
        total_payment += bucket.payment;
        row += 1;
    }
    ws.set(row, 0, CellValue::Text("Balance".to_string()));
    ws.set(row, 1, CellValue::Number(total_liability));
    ws.set(row, 2, CellValue::Number(total_payment));
    ws.set(row, 3, CellValue::Number(total_liability - total_payment));
}

// ---------------------------------------------------------------------------
// Format7 — manual-journal liability vs spend-money payments
// ---------------------------------------------------------------------------

fn format7(ws: &mut Sheet, trans: &Sheet, account: &str, warnings: &mut Vec<String>) {
    let Some(account_row) = find_account_row(trans, account) else {
        skip_missing(warnings, "Format7", account);
        return;
    };
    let opening = trans.number(account_row + 1, layout::TRANS_DEBIT_COL);

    let mut tally: MonthTally<LiabilityPayment> = MonthTally::new();
    for row in account_row + 2..=trans.max_row() {
        let label = trans.text(row, layout::TRANS_LABEL_COL);
        if label.is_empty() || label == "Closing Balance" || label.starts_with("Total") {
            break;
        }
        let key = month_key(trans, row, true);
        let bucket = tally.entry(&key);
        match trans.text(row, layout::TRANS_TYPE_COL).as_str() {
            "Manual Journal" => {
                bucket.liability += trans.number(row, layout::TRANS_DEBIT_COL)
                    - trans.number(row, layout::TRANS_CREDIT_COL);
            }
            "Spend Money" => {
                bucket.payment += trans.number(row, layout::TRANS_CREDIT_COL);
            }
            _ => {}
        }
    }

    let mut row = write_headers(ws, &["Month", "Liability", "Payment", "Outstanding"]);
    ws.set(row, 0, CellValue::Text("Opening Balance".to_string()));
    ws.set(row, 1, CellValue::Number(opening));
    ws.set(row, 3, CellValue::Number(opening));
    row += 1;

    let mut total_outstanding = opening;
    for (month, bucket) in &tally.entries {
        let outstanding = bucket.liability - bucket.payment;
        ws.set(row, 0, CellValue::Text(month.clone()));
        ws.set(row, 1, CellValue::Number(bucket.liability));
        ws.set(row, 2, CellValue::Number(bucket.payment));
        if outstanding != 0.0 {
            ws.set(row, 3, CellValue::Number(outstanding));
        }
        total_outstanding += outstanding;
        row += 1;
    }
    ws.set(row, 0, CellValue::Text("Outstanding Total".to_string()));
    ws.set(row, 3, CellValue::Number(total_outstanding));
}

// ---------------------------------------------------------------------------
// Format8 — bank summary with running balances
// ---------------------------------------------------------------------------

#[derive(Default)]
struct BankMonth {
    receipts: f64,
    payments: f64,
    pdq_deposits: f64,
}

fn format8(ws: &mut Sheet, trans: &Sheet, account: &str, warnings: &mut Vec<String>) {
    let Some(account_row) = find_account_row(trans, account) else {
        skip_missing(warnings, "Format8", account);
        return;
    };
    let opening = trans.number(account_row + 1, layout::TRANS_CREDIT_COL);

    let mut tally: MonthTally<BankMonth> = MonthTally::new();
    for row in account_row + 2..=trans.max_row() {
        let label = trans.text(row, layout::TRANS_LABEL_COL);
        if label.is_empty() || label == "Total PAYE" || label == "Closing Balance" {
            break;
        }
        let credit = trans.number(row, layout::TRANS_CREDIT_COL);
        let debit = trans.number(row, layout::TRANS_DEBIT_COL);
        let key = month_key(trans, row, true);
        let bucket = tally.entry(&key);
        match trans.text(row, layout::TRANS_TYPE_COL).to_uppercase().as_str() {
            "RECEIVE MONEY" => bucket.receipts += credit,
            "SPEND MONEY" | "PAYABLE PAYMENT" | "PAYABLE OVERPAYMENT" => bucket.payments += debit,
            "BANK TRANSFER" => bucket.pdq_deposits += debit - credit,
            _ => {}
        }
    }

    let mut row = write_headers(
        ws,
        &["Month", "Op Bal", "Receipts", "Payments", "PDQ / Deposits", "Clo Bal"],
    );
    ws.set(row, 0, CellValue::Text("Opening Balance".to_string()));
    ws.set(row, 1, CellValue::Number(opening));
    row += 1;

    let mut op_balance = opening;
    for (month, bucket) in &tally.entries {
        let closing = op_balance + bucket.receipts - bucket.payments - bucket.pdq_deposits;
        ws.set(row, 0, CellValue::Text(month.clone()));
        ws.set(row, 1, CellValue::Number(op_balance));
        ws.set(row, 2, CellValue::Number(bucket.receipts));
        ws.set(row, 3, CellValue::Number(bucket.payments));
        ws.set(row, 4, CellValue::Number(bucket.pdq_deposits));
        ws.set(row, 5, CellValue::Number(closing));
        op_balance = closing;
        row += 1;
    }
}

// ---------------------------------------------------------------------------
// Format9 / Format10 — control-account reconciliations
// ---------------------------------------------------------------------------

fn format9(ws: &mut Sheet, trans: &Sheet, account: &str, warnings: &mut Vec<String>) {
    let (pr, pc) = layout::PERIOD_DATE_CELL;
    let Some(period_end) = ws.date(pr, pc) else {
        warnings.push(format!("Invalid period date for Format9: {account}"));
        return;
    };
    let Some(account_row) = find_account_row(trans, account) else {
        skip_missing(warnings, "Format9", account);
        return;
    };

    let mut closing = opening_balance(trans, account_row, false);
    for row in account_row + 2..=trans.max_row() {
        let label = trans.text(row, layout::TRANS_LABEL_COL);
        if label.contains("Total") || label.contains("Closing Balance") {
            break;
        }
        closing += trans.number(row, layout::TRANS_CREDIT_COL)
            - trans.number(row, layout::TRANS_DEBIT_COL);
    }
    let closing = round2(closing);

    let date_style = CellStyle { num_format: Some("dd-mm-yyyy".to_string()), ..CellStyle::default() };
    let row = write_headers(ws, &["Date", "Details", "Amount £"]);
    ws.set_styled(row, 0, CellValue::Date(period_end), date_style.clone());
    ws.set(row, 1, CellValue::Text("Balance as per statement".to_string()));
    // One spacer row between the two balances.
    ws.set_styled(row + 2, 0, CellValue::Date(period_end), date_style);
    ws.set(row + 2, 1, CellValue::Text("Balance per Control account".to_string()));
    ws.set_styled(
        row + 2,
        2,
        CellValue::Number(closing),
        CellStyle { num_format: Some("#,##0.00".to_string()), ..CellStyle::default() },
    );
}

fn format10(ws: &mut Sheet, trans: &Sheet, account: &str, warnings: &mut Vec<String>) {
    let (pr, pc) = layout::PERIOD_DATE_CELL;
    let Some(period_end) = ws.date(pr, pc) else {
        warnings.push(format!("Invalid period date for Format10: {account}"));
        return;
    };
    let Some(account_row) = find_account_row(trans, account) else {
        skip_missing(warnings, "Format10", account);
        return;
    };

    let mut closing = opening_balance(trans, account_row, true);
    for row in account_row + 2..=trans.max_row() {
        let label = trans.text(row, layout::TRANS_LABEL_COL);
        if label.contains("Total") || label.contains("Closing Balance") {
            break;
        }
        closing += trans.number(row, layout::TRANS_DEBIT_COL)
            - trans.number(row, layout::TRANS_CREDIT_COL);
    }
    let closing = round2(closing);

    ws.set_styled(
        layout::RECONCILIATION_TITLE_ROW,
        0,
        CellValue::Text("Reconciliation".to_string()),
        bold(),
    );

    let date_style = CellStyle { num_format: Some("dd-mm-yyyy".to_string()), ..CellStyle::default() };
    let amount_style = CellStyle { num_format: Some("#,##0.00".to_string()), ..CellStyle::default() };
    let row = write_headers(ws, &["Date", "£", "Particular"]);
    ws.set_styled(row, 0, CellValue::Date(period_end), date_style.clone());
    ws.set(row, 2, CellValue::Text("Balance as per ".to_string()));
    ws.set_styled(row + 1, 0, CellValue::Date(period_end), date_style.clone());
    ws.set_styled(row + 1, 1, CellValue::Number(closing), amount_style.clone());
    ws.set(row + 1, 2, CellValue::Text("Balance as per ".to_string()));
    ws.set_styled(row + 2, 0, CellValue::Date(period_end), date_style);
    ws.set_styled(
        row + 2,
        1,
        CellValue::Formula(format!("=B{}-B{}", row + 1, row + 2)),
        amount_style,
    );
    ws.set(row + 2, 2, CellValue::Text("Difference".to_string()));
}
