//! The workbook layout contract.
//!
//! Client workbooks pin data to fixed rows and columns; every such position
//! is named here and nowhere else. All coordinates are zero-based to match
//! the in-memory grid, so Excel row 15 is `14` and column H is `7`.

pub const FAR_SHEET: &str = "FAR";
pub const TRANSACTIONS_SHEET: &str = "Account Transactions";
pub const MAPPINGS_SHEET: &str = "Mappings";
pub const PL_SHEET: &str = "P&L";

/// Rows at the top of the FAR sheet scanned for the year-end and
/// management-accounts header dates.
pub const FAR_METADATA_ROWS: u32 = 5;

/// First row that can hold an asset-category table name (Excel row 6).
pub const FAR_FIRST_TABLE_ROW: u32 = 5;

/// Blank rows left between rendered FAR tables.
pub const FAR_TABLE_GAP: u32 = 2;

/// Column header row of the transactions sheet (Excel row 5).
pub const TRANS_HEADER_ROW: u32 = 4;

/// Client name cell on the transactions sheet (A2).
pub const TRANS_CLIENT_CELL: (u32, u16) = (1, 0);

/// Account label / transaction date column (A).
pub const TRANS_LABEL_COL: u16 = 0;
/// Transaction type column (B).
pub const TRANS_TYPE_COL: u16 = 1;
/// Contact column (C).
pub const TRANS_CONTACT_COL: u16 = 2;
/// Free-text description column (E).
pub const TRANS_DESC_COL: u16 = 4;
/// Credit amount column (H).
pub const TRANS_CREDIT_COL: u16 = 7;
/// Debit amount column (I).
pub const TRANS_DEBIT_COL: u16 = 8;
/// Asset purchase cost column for fixed-asset blocks (H).
pub const TRANS_COST_COL: u16 = 7;
/// Fallback details column when the header row names none (C).
pub const TRANS_DETAILS_FALLBACK_COL: u16 = 2;
/// Sub-account reference column (R), values prefixed with an account code.
pub const TRANS_SUBACCOUNT_COL: u16 = 17;
/// Length of the account-code prefix stripped from sub-account references.
pub const SUBACCOUNT_PREFIX_LEN: usize = 7;

/// Account name cell on a per-account sheet (A4).
pub const ACCOUNT_NAME_CELL: (u32, u16) = (3, 0);
/// Date / Details / Amount header row of the summary skeleton (Excel row 6).
pub const SKELETON_HEADER_ROW: u32 = 5;
/// Total row of the summary skeleton (Excel row 10).
pub const SKELETON_TOTAL_ROW: u32 = 9;
/// Period-end date cell on a per-account sheet (A8).
pub const PERIOD_DATE_CELL: (u32, u16) = (7, 0);
/// Summary value cell on a per-account sheet (C8).
pub const SUMMARY_VALUE_CELL: (u32, u16) = (7, 2);
/// First row of the per-account summary table (Excel row 15).
pub const SUMMARY_START_ROW: u32 = 14;
/// Reconciliation title row used by Format10 (Excel row 13).
pub const RECONCILIATION_TITLE_ROW: u32 = 12;

/// Spreadsheet sheet-name length limit.
pub const SHEET_NAME_MAX: usize = 31;

/// Accounts that belong to the Fixed Asset Register and must not be split
/// into per-account summary sheets.
pub const FIXED_ASSET_ACCOUNTS: &[&str] = &[
    "Freehold Property",
    "Leasehold Property",
    "Leasehold Property Depreciation",
    "Plant & Machinery",
    "Plant & Machinery Depreciation",
    "Bar & Kitchen Equipment",
    "Bar & Kitchen Equipment Depreciation",
    "Furniture & Fixtures",
    "Furniture & Fixtures Depreciation",
    "Motor Vehicles",
    "Motor Vehicles Depreciation",
    "Property Improvements",
    "Property Improvements Depreciation",
    "Refurbishment",
    "Refurbishment Depreciation",
    "Goodwill",
    "Goodwill Amortisation",
    "Historical Adjustment",
];

/// Sheets that never receive the per-account summary post-pass.
pub const SYSTEM_SHEETS: &[&str] = &[
    "Account Transactions",
    "P&L",
    "Corporation Tax",
    "Mappings",
    "FAR",
];

pub fn is_system_sheet(name: &str) -> bool {
    SYSTEM_SHEETS.contains(&name)
}

pub fn is_fixed_asset_account(name: &str) -> bool {
    FIXED_ASSET_ACCOUNTS.contains(&name)
}
