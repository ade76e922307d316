//! Write a small sample client workbook so the pipeline can be exercised
//! without real books: a FAR sheet with three asset categories, a
//! transactions sheet with summary and fixed-asset blocks, mappings for
//! six of the summary formats, and a P&L for the tax table.

use std::path::Path;

use chrono::NaiveDate;
use colored::Colorize;

use crate::error::Result;
use crate::sheet::{CellValue, Sheet, Workbook};
use crate::writer;

const CLIENT_NAME: &str = "The Crown Inn (Demo) Ltd";

struct DemoAsset {
    purchased: (i32, u32, u32),
    details: &'static str,
    cost: f64,
}

struct DemoTable {
    name: &'static str,
    rate: u32,
    assets: &'static [DemoAsset],
}

const FAR_TABLES: &[DemoTable] = &[
    DemoTable {
        name: "Plant & Machinery",
        rate: 20,
        assets: &[
            DemoAsset { purchased: (2022, 5, 1), details: "Commercial dishwasher", cost: 2400.0 },
            DemoAsset { purchased: (2023, 9, 15), details: "Twin-basket fryer", cost: 950.0 },
        ],
    },
    DemoTable {
        name: "Furniture & Fixtures",
        rate: 15,
        assets: &[
            DemoAsset { purchased: (2021, 11, 20), details: "Dining tables and chairs", cost: 5200.0 },
            DemoAsset { purchased: (2024, 6, 10), details: "Lounge sofas", cost: 1800.0 },
        ],
    },
    DemoTable {
        name: "Freehold Property",
        rate: 0,
        assets: &[DemoAsset { purchased: (2019, 3, 1), details: "Freehold purchase", cost: 250_000.0 }],
    },
];

struct DemoTxn {
    date: (i32, u32, u32),
    source: &'static str,
    contact: &'static str,
    details: &'static str,
    credit: f64,
    debit: f64,
    sub_account: &'static str,
}

const fn txn(
    date: (i32, u32, u32),
    source: &'static str,
    contact: &'static str,
    details: &'static str,
    credit: f64,
    debit: f64,
    sub_account: &'static str,
) -> DemoTxn {
    DemoTxn { date, source, contact, details, credit, debit, sub_account }
}

struct DemoBlock {
    account: &'static str,
    opening_credit: f64,
    opening_debit: f64,
    total_label: &'static str,
    txns: &'static [DemoTxn],
}

const BLOCKS: &[DemoBlock] = &[
    DemoBlock {
        account: "Sales",
        opening_credit: 0.0,
        opening_debit: 0.0,
        total_label: "Closing Balance",
        txns: &[
            txn((2024, 4, 30), "Receive Money", "Till", "April wet sales", 0.0, 18_250.0, "200-100Wet sales"),
            txn((2024, 4, 30), "Receive Money", "Till", "April dry sales", 0.0, 9_900.0, "200-200Dry sales"),
            txn((2024, 5, 31), "Receive Money", "Till", "May wet sales", 0.0, 21_400.0, "200-100Wet sales"),
            txn((2024, 5, 31), "Receive Money", "Till", "May dry sales", 0.0, 11_050.0, "200-200Dry sales"),
            txn((2024, 6, 30), "Receive Money", "Till", "June wet sales", 0.0, 24_800.0, "200-100Wet sales"),
        ],
    },
    DemoBlock {
        account: "Bank Account",
        opening_credit: 12_500.0,
        opening_debit: 0.0,
        total_label: "Closing Balance",
        txns: &[
            txn((2024, 4, 5), "Receive Money", "Till", "Weekly takings", 4_200.0, 0.0, ""),
            txn((2024, 4, 18), "Spend Money", "Brewery Co", "Stock order", 0.0, 2_650.0, ""),
            txn((2024, 5, 6), "Receive Money", "Till", "Weekly takings", 5_100.0, 0.0, ""),
            txn((2024, 5, 20), "Bank Transfer", "Savings", "Transfer to deposit", 1_000.0, 2_000.0, ""),
        ],
    },
    DemoBlock {
        account: "VAT Control",
        opening_credit: 0.0,
        opening_debit: 3_150.0,
        total_label: "Total VAT Control",
        txns: &[
            txn((2024, 4, 30), "Manual Journal", "", "VAT on April sales", 0.0, 4_690.0, ""),
            txn((2024, 5, 7), "Spend Money", "HMRC", "Quarterly VAT payment", 3_150.0, 0.0, ""),
            txn((2024, 5, 31), "Manual Journal", "", "VAT on May sales", 0.0, 5_410.0, ""),
        ],
    },
    DemoBlock {
        account: "PAYE Control",
        opening_credit: 0.0,
        opening_debit: 1_820.0,
        total_label: "Total PAYE",
        txns: &[
            txn((2024, 4, 28), "Payroll", "", "April payroll deductions", 0.0, 1_905.0, ""),
            txn((2024, 5, 19), "Spend Money", "HMRC", "PAYE remittance", 1_820.0, 0.0, ""),
            txn((2024, 5, 28), "Payroll", "", "May payroll deductions", 0.0, 1_940.0, ""),
        ],
    },
    DemoBlock {
        account: "Trade Debtors",
        opening_credit: 0.0,
        opening_debit: 640.0,
        total_label: "Total Trade Debtors",
        txns: &[
            txn((2024, 4, 12), "Receivable Invoice", "Function booking", "Wedding deposit due", 0.0, 450.0, ""),
            txn((2024, 5, 2), "Receive Money", "Function booking", "Wedding deposit paid", 450.0, 0.0, ""),
        ],
    },
    DemoBlock {
        account: "Directors Loan Account",
        opening_credit: 2_000.0,
        opening_debit: 0.0,
        total_label: "Total Directors Loan Account",
        txns: &[
            txn((2024, 4, 2), "Spend Money", "Director", "Personal expense repaid", 0.0, 350.0, ""),
            txn((2024, 6, 14), "Receive Money", "Director", "Loan top-up", 1_200.0, 0.0, ""),
        ],
    },
    DemoBlock {
        account: "Plant & Machinery",
        opening_credit: 0.0,
        opening_debit: 0.0,
        total_label: "Total Plant & Machinery",
        txns: &[
            // Already on the FAR: exercises the de-duplication path.
            txn((2023, 9, 15), "Payable Invoice", "CaterSupply", "Twin-basket fryer", 950.0, 0.0, ""),
            // Genuinely new purchase merged into the register.
            txn((2024, 7, 2), "Payable Invoice", "CaterSupply", "Pizza oven", 3_200.0, 0.0, ""),
        ],
    },
];

const MAPPINGS: &[(&str, &str)] = &[
    ("Sales", "Format1"),
    ("Trade Debtors", "Format2"),
    ("Directors Loan Account", "Format3"),
    ("PAYE Control", "Format4"),
    ("VAT Control", "Format5"),
    ("Bank Account", "Format8"),
];

pub fn run(output: Option<String>) -> Result<()> {
    let path = output.unwrap_or_else(|| "maprep-demo.xlsx".to_string());
    let wb = build_demo_workbook();
    writer::write_workbook(&wb, Path::new(&path))?;
    println!("{} {path}", "Demo workbook written to".green());
    println!("Try: maprep process {path}");
    Ok(())
}

pub fn build_demo_workbook() -> Workbook {
    let mut wb = Workbook::new();
    build_far_sheet(wb.ensure_sheet("FAR"));
    build_transactions_sheet(wb.ensure_sheet("Account Transactions"));
    build_mappings_sheet(wb.ensure_sheet("Mappings"));
    build_pl_sheet(wb.ensure_sheet("P&L"));
    wb
}

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn demo_date(ymd: (i32, u32, u32)) -> CellValue {
    CellValue::Date(NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap())
}

fn build_far_sheet(ws: &mut Sheet) {
    ws.set(0, 0, text(CLIENT_NAME));
    ws.set(0, 2, text("Management Accounts QDec'24"));
    ws.set(1, 0, text("Year End - 31 March 2025"));

    let mut row = 5;
    for table in FAR_TABLES {
        ws.set(row, 0, text(table.name));
        ws.set(row + 1, 0, text(&format!("Depreciation rate: {}%", table.rate)));
        for (col, header) in [
            "Purchase Date",
            "Details",
            "Cost",
            "Addition",
            "Total Cost",
            "Depreciation Rate",
            "Accumulated Depreciation",
        ]
        .iter()
        .enumerate()
        {
            ws.set(row + 2, col as u16, text(header));
        }
        let mut data_row = row + 3;
        for asset in table.assets {
            ws.set(data_row, 0, demo_date(asset.purchased));
            ws.set(data_row, 1, text(asset.details));
            ws.set(data_row, 2, CellValue::Number(asset.cost));
            data_row += 1;
        }
        ws.set(data_row, 1, text("Total"));
        row = data_row + 3;
    }
}

fn build_transactions_sheet(ws: &mut Sheet) {
    ws.set(0, 0, text("Account Transactions"));
    ws.set(1, 0, text(CLIENT_NAME));
    ws.set(2, 0, text("1 April 2024 to 31 December 2024"));
    ws.set(3, 0, text("All amounts in GBP"));

    for (col, header) in [
        (0u16, "Date"),
        (1, "Source"),
        (2, "Contact"),
        (3, "Reference"),
        (4, "Details"),
        (7, "Credit"),
        (8, "Debit"),
    ] {
        ws.set(4, col, text(header));
    }

    let mut row = 6;
    for block in BLOCKS {
        ws.set(row, 0, text(block.account));
        ws.set(row + 1, 0, text("Opening Balance"));
        if block.opening_credit != 0.0 {
            ws.set(row + 1, 7, CellValue::Number(block.opening_credit));
        }
        if block.opening_debit != 0.0 {
            ws.set(row + 1, 8, CellValue::Number(block.opening_debit));
        }
        let mut txn_row = row + 2;
        for t in block.txns {
            ws.set(txn_row, 0, demo_date(t.date));
            ws.set(txn_row, 1, text(t.source));
            if !t.contact.is_empty() {
                ws.set(txn_row, 2, text(t.contact));
            }
            ws.set(txn_row, 4, text(t.details));
            if t.credit != 0.0 {
                ws.set(txn_row, 7, CellValue::Number(t.credit));
            }
            if t.debit != 0.0 {
                ws.set(txn_row, 8, CellValue::Number(t.debit));
            }
            if !t.sub_account.is_empty() {
                ws.set(txn_row, 17, text(t.sub_account));
            }
            txn_row += 1;
        }
        ws.set(txn_row, 0, text(block.total_label));
        // One blank row between blocks.
        row = txn_row + 2;
    }
}

fn build_mappings_sheet(ws: &mut Sheet) {
    ws.set(0, 0, text("Account"));
    ws.set(0, 1, text("Format"));
    for (i, (account, format)) in MAPPINGS.iter().enumerate() {
        ws.set(1 + i as u32, 0, text(account));
        ws.set(1 + i as u32, 1, text(format));
    }
}

fn build_pl_sheet(ws: &mut Sheet) {
    let rows: &[(&str, f64, f64)] = &[
        ("Turnover", 24_800.0, 85_400.0),
        ("Cost of sales", -9_100.0, -31_600.0),
        ("Gross profit", 15_700.0, 53_800.0),
        ("Depreciation", 800.0, 7_200.0),
        ("Profit after Taxation", 4_200.0, 31_000.0),
    ];
    ws.set(0, 0, text(CLIENT_NAME));
    for (i, (label, month, ytd)) in rows.iter().enumerate() {
        let row = 2 + i as u32;
        ws.set(row, 0, text(label));
        ws.set(row, 1, CellValue::Number(*month));
        ws.set(row, 2, CellValue::Number(*ytd));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline;
    use crate::settings::Settings;

    #[test]
    fn test_demo_workbook_has_required_sheets() {
        let wb = build_demo_workbook();
        for name in ["FAR", "Account Transactions", "Mappings", "P&L"] {
            assert!(wb.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_demo_workbook_processes_cleanly() {
        let mut wb = build_demo_workbook();
        let report = pipeline::process_workbook(&mut wb, &Settings::default()).unwrap();
        assert_eq!(report.tables, 3);
        // Only the pizza oven is new; the fryer deduplicates.
        assert_eq!(report.rows_merged, 1);
        // Every mapped account got its summary sheet.
        for (account, _) in MAPPINGS {
            assert!(wb.contains(account), "missing sheet for {account}");
        }
    }

    #[test]
    fn test_demo_processing_is_idempotent_for_merges() {
        let mut wb = build_demo_workbook();
        let first = pipeline::process_workbook(&mut wb, &Settings::default()).unwrap();
        assert_eq!(first.rows_merged, 1);
        let second = pipeline::process_workbook(&mut wb, &Settings::default()).unwrap();
        assert_eq!(second.rows_merged, 0);
    }
}
