use chrono::{Datelike, Duration, NaiveDate};

use crate::dates::{add_months, month_end, HeaderDates};

/// Fiscal-year bounds and the management cutoff for one run, plus the
/// derived fiscal-month sequence shared by every asset table.
#[derive(Debug, Clone)]
pub struct FiscalCalendar {
    pub fy_start: NaiveDate,
    pub fy_end: NaiveDate,
    /// Month-end through which depreciation is projected.
    pub mgmt_end: NaiveDate,
    /// First-of-month for each fiscal month, in chronological order.
    pub months: Vec<NaiveDate>,
}

impl FiscalCalendar {
    pub fn new(dates: HeaderDates) -> Self {
        let fy_end = dates.year_end;
        // start = year_end - 1 year + 1 day (Feb 29 year-ends clamp to Feb 28)
        let year_back = fy_end
            .with_year(fy_end.year() - 1)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(fy_end.year() - 1, 2, 28).unwrap());
        let fy_start = year_back + Duration::days(1);
        let mut months = Vec::new();
        let mut cur = fy_start.with_day(1).unwrap();
        while cur <= fy_end {
            months.push(cur);
            cur = add_months(cur, 1);
        }
        FiscalCalendar {
            fy_start,
            fy_end,
            mgmt_end: month_end(dates.period_end),
            months,
        }
    }

    /// Column labels for the fiscal months: "Dep Apr-24".
    pub fn month_labels(&self) -> Vec<String> {
        self.months
            .iter()
            .map(|m| format!("Dep {}", m.format("%b-%y")))
            .collect()
    }

    /// "Mar-2025" suffix text for the derived column headers.
    pub fn as_at_label(&self) -> String {
        self.mgmt_end.format("%b-%Y").to_string()
    }
}

/// One month's depreciation cell: a known value, or blank for months past
/// the management cutoff (and for rows with unparseable purchase dates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonthCell {
    Blank,
    Value(f64),
}

impl MonthCell {
    pub fn numeric(&self) -> f64 {
        match self {
            MonthCell::Blank => 0.0,
            MonthCell::Value(v) => *v,
        }
    }
}

/// One purchase/addition record in an asset-category table.
#[derive(Debug, Clone)]
pub struct AssetRow {
    pub purchase_date: Option<NaiveDate>,
    /// Original cell text, kept for unparseable dates so they render back
    /// unchanged and key consistently.
    pub purchase_raw: String,
    pub details: String,
    pub cost: f64,
    pub addition: f64,
    pub total_cost: f64,
    /// Depreciation accumulated before the fiscal year opened.
    pub accumulated: f64,
    /// One cell per fiscal month, aligned with `FiscalCalendar::months`.
    pub monthly: Vec<MonthCell>,
    pub total_depreciation: f64,
    pub wdv: f64,
}

impl AssetRow {
    pub fn new(
        purchase_date: Option<NaiveDate>,
        purchase_raw: String,
        details: String,
        cost: f64,
        addition: f64,
    ) -> Self {
        AssetRow {
            purchase_date,
            purchase_raw,
            details,
            cost,
            addition,
            total_cost: 0.0,
            accumulated: 0.0,
            monthly: Vec::new(),
            total_depreciation: 0.0,
            wdv: 0.0,
        }
    }

    /// De-duplication key: purchase date (ISO when parseable, raw text
    /// otherwise), details, and the row's original value. Cost and addition
    /// are summed so the key survives the engine's cost/addition split and
    /// stays stable across repeat runs over rendered output.
    pub fn merge_key(&self) -> String {
        let date_part = match self.purchase_date {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => self.purchase_raw.clone(),
        };
        format!(
            "{}|{}|{}",
            date_part,
            self.details,
            num_key(self.cost + self.addition)
        )
    }
}

fn num_key(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// One embedded FAR table: a named asset category with its declared
/// depreciation rate and purchase rows.
#[derive(Debug, Clone)]
pub struct AssetTable {
    pub name: String,
    /// Percentage as written, e.g. 20.0; `None` when the rate line was
    /// missing or malformed.
    pub rate: Option<f64>,
    pub rows: Vec<AssetRow>,
}

impl AssetTable {
    pub fn rate_or_zero(&self) -> f64 {
        self.rate.unwrap_or(0.0)
    }
}

/// Role of a rendered FAR column, resolved once at layout time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnRole {
    PurchaseDate,
    Details,
    Cost,
    Addition,
    TotalCost,
    Rate,
    AccumulatedDep,
    FiscalMonth,
    TotalDep,
    Wdv,
}

impl ColumnRole {
    /// The seven static columns of every asset table, in order.
    pub const STATIC: [ColumnRole; 7] = [
        ColumnRole::PurchaseDate,
        ColumnRole::Details,
        ColumnRole::Cost,
        ColumnRole::Addition,
        ColumnRole::TotalCost,
        ColumnRole::Rate,
        ColumnRole::AccumulatedDep,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            ColumnRole::PurchaseDate => "Purchase Date",
            ColumnRole::Details => "Details",
            ColumnRole::Cost => "Cost",
            ColumnRole::Addition => "Addition",
            ColumnRole::TotalCost => "Total Cost",
            ColumnRole::Rate => "Depreciation Rate",
            ColumnRole::AccumulatedDep => "Accumulated Depreciation",
            ColumnRole::FiscalMonth => "",
            ColumnRole::TotalDep => "Total Depreciation",
            ColumnRole::Wdv => "WDV",
        }
    }

    /// Units-row text under each header.
    pub fn unit(&self) -> &'static str {
        match self {
            ColumnRole::PurchaseDate | ColumnRole::Details => "",
            ColumnRole::Rate => "%",
            _ => "£",
        }
    }

}
