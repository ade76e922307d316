//! Straight-line depreciation recalculation for one asset table.
//!
//! Pure in-memory computation: no I/O, no ordering effects between rows.
//! All date gating works on whole months; the management cutoff bounds how
//! far into the fiscal year the schedule is projected.

use chrono::NaiveDate;

use crate::dates::{add_months, month_end, months_inclusive};
use crate::models::{AssetRow, AssetTable, FiscalCalendar, MonthCell};

/// Populate every derived field of every row in `table`.
pub fn recalculate(table: &mut AssetTable, cal: &FiscalCalendar) {
    let rate = table.rate_or_zero();
    for row in table.rows.iter_mut() {
        // In-year purchases count as additions; older ones are
        // brought-forward cost.
        let original = row.cost + row.addition;
        let in_year = row
            .purchase_date
            .map(|d| d >= cal.fy_start && d <= cal.fy_end)
            .unwrap_or(false);
        if in_year {
            row.addition = original;
            row.cost = 0.0;
        } else {
            row.cost = original;
            row.addition = 0.0;
        }
        row.total_cost = row.cost + row.addition;

        let monthly_dep = if row.total_cost != 0.0 && rate != 0.0 {
            row.total_cost * rate / 100.0 / 12.0
        } else {
            0.0
        };

        row.accumulated = accumulated_before_fy(row.purchase_date, row.total_cost, monthly_dep, cal);

        row.monthly = monthly_schedule(row, monthly_dep, cal);

        let in_year_dep: f64 = row.monthly.iter().map(MonthCell::numeric).sum();
        row.total_depreciation = row.accumulated + in_year_dep;
        row.wdv = row.total_cost - row.total_depreciation;
    }
}

/// Depreciation charged in the months before the fiscal year opened,
/// capped so it never exceeds the asset's total cost. Fully amortized
/// assets get exactly `total_cost` to avoid rounding drift.
fn accumulated_before_fy(
    purchase: Option<NaiveDate>,
    total_cost: f64,
    monthly_dep: f64,
    cal: &FiscalCalendar,
) -> f64 {
    let last_fy_month = add_months(cal.fy_start, -1);
    let purchased_before = match purchase {
        Some(d) => d <= last_fy_month,
        None => false,
    };
    if !purchased_before || monthly_dep <= 0.0 {
        return 0.0;
    }
    let months_since = months_inclusive(purchase.unwrap(), last_fy_month);
    let months_to_full = (total_cost / monthly_dep).floor() as i64;
    if months_since >= months_to_full {
        return total_cost;
    }
    monthly_dep * months_since as f64
}

fn monthly_schedule(row: &AssetRow, monthly_dep: f64, cal: &FiscalCalendar) -> Vec<MonthCell> {
    let Some(purchase) = row.purchase_date else {
        return vec![MonthCell::Blank; cal.months.len()];
    };

    let mut cells = Vec::with_capacity(cal.months.len());
    let mut cumulative = row.accumulated;
    for &month in &cal.months {
        if month > cal.mgmt_end {
            // Beyond the management cutoff: not yet reached, not zero.
            cells.push(MonthCell::Blank);
        } else if purchase <= month_end(month) {
            if cumulative < row.total_cost {
                let dep = monthly_dep.min(row.total_cost - cumulative);
                cumulative += dep;
                cells.push(MonthCell::Value(dep));
            } else {
                cells.push(MonthCell::Value(0.0));
            }
        } else {
            // Within the window but before purchase: known to be zero.
            cells.push(MonthCell::Value(0.0));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::HeaderDates;
    use crate::models::AssetRow;
    use chrono::NaiveDate;

    const TOL: f64 = 1e-6;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// FY Apr 2023 - Mar 2024, management period March 2024.
    fn calendar() -> FiscalCalendar {
        FiscalCalendar::new(HeaderDates {
            year_end: date(2024, 3, 31),
            period_end: date(2024, 3, 31),
        })
    }

    /// Same fiscal year, but only projected through December 2023.
    fn calendar_cut_december() -> FiscalCalendar {
        FiscalCalendar::new(HeaderDates {
            year_end: date(2024, 3, 31),
            period_end: date(2023, 12, 31),
        })
    }

    fn row(purchase: Option<NaiveDate>, cost: f64) -> AssetRow {
        let raw = purchase.map(|d| d.to_string()).unwrap_or_else(|| "???".to_string());
        AssetRow::new(purchase, raw, "asset".to_string(), cost, 0.0)
    }

    fn table(rate: Option<f64>, rows: Vec<AssetRow>) -> AssetTable {
        AssetTable { name: "Plant & Machinery".to_string(), rate, rows }
    }

    #[test]
    fn test_prior_year_accumulation_scenario() {
        // rate 20%, cost 1200, purchased 12 months before the fiscal year:
        // 1200 * 0.20 / 12 * 12 = 240 accumulated.
        let mut t = table(Some(20.0), vec![row(Some(date(2022, 4, 15)), 1200.0)]);
        recalculate(&mut t, &calendar());
        let r = &t.rows[0];
        assert!((r.accumulated - 240.0).abs() < TOL);
        assert_eq!(r.cost, 1200.0);
        assert_eq!(r.addition, 0.0);
    }

    #[test]
    fn test_zero_rate_never_depreciates() {
        let mut t = table(Some(0.0), vec![row(Some(date(2020, 1, 1)), 5000.0)]);
        recalculate(&mut t, &calendar());
        let r = &t.rows[0];
        assert_eq!(r.accumulated, 0.0);
        assert_eq!(r.total_depreciation, 0.0);
        assert_eq!(r.wdv, 5000.0);
        assert!(r.monthly.iter().all(|c| *c == MonthCell::Value(0.0)));
    }

    #[test]
    fn test_missing_rate_behaves_as_zero() {
        let mut t = table(None, vec![row(Some(date(2020, 1, 1)), 5000.0)]);
        recalculate(&mut t, &calendar());
        assert_eq!(t.rows[0].wdv, 5000.0);
    }

    #[test]
    fn test_purchase_on_fy_start_is_all_addition() {
        let mut t = table(Some(20.0), vec![row(Some(date(2023, 4, 1)), 900.0)]);
        recalculate(&mut t, &calendar());
        let r = &t.rows[0];
        assert_eq!(r.cost, 0.0);
        assert_eq!(r.addition, 900.0);
        assert_eq!(r.total_cost, 900.0);
        assert_eq!(r.accumulated, 0.0);
    }

    #[test]
    fn test_mid_year_purchase_zero_before_blank_never() {
        // Purchased Feb 2024, management period March 2024: depreciation in
        // Feb and Mar only; earlier fiscal months are explicit zeros.
        let mut t = table(Some(20.0), vec![row(Some(date(2024, 2, 10)), 1200.0)]);
        recalculate(&mut t, &calendar());
        let r = &t.rows[0];
        let monthly = 1200.0 * 0.20 / 12.0;
        for cell in &r.monthly[..10] {
            assert_eq!(*cell, MonthCell::Value(0.0));
        }
        assert!((r.monthly[10].numeric() - monthly).abs() < TOL);
        assert!((r.monthly[11].numeric() - monthly).abs() < TOL);
        assert!((r.total_depreciation - 2.0 * monthly).abs() < TOL);
    }

    #[test]
    fn test_months_after_management_period_are_blank() {
        let mut t = table(Some(20.0), vec![row(Some(date(2022, 1, 1)), 1200.0)]);
        recalculate(&mut t, &calendar_cut_december());
        let r = &t.rows[0];
        // Apr..Dec are values, Jan..Mar of 2024 are blank.
        for cell in &r.monthly[..9] {
            assert!(matches!(cell, MonthCell::Value(_)));
        }
        for cell in &r.monthly[9..] {
            assert_eq!(*cell, MonthCell::Blank);
        }
    }

    #[test]
    fn test_unparseable_date_renders_all_blank() {
        let mut t = table(Some(20.0), vec![row(None, 1200.0)]);
        recalculate(&mut t, &calendar());
        let r = &t.rows[0];
        assert!(r.monthly.iter().all(|c| *c == MonthCell::Blank));
        assert_eq!(r.accumulated, 0.0);
        assert_eq!(r.total_depreciation, 0.0);
        // Unparseable dates are out-of-year: value stays in cost.
        assert_eq!(r.cost, 1200.0);
    }

    #[test]
    fn test_depreciation_never_exceeds_total_cost() {
        // 60% a year on an old asset: fully amortized before the FY opens.
        let mut t = table(Some(60.0), vec![row(Some(date(2020, 1, 1)), 1000.0)]);
        recalculate(&mut t, &calendar());
        let r = &t.rows[0];
        assert!((r.accumulated - 1000.0).abs() < TOL);
        assert!(r.total_depreciation <= r.total_cost + TOL);
        assert!((r.wdv).abs() < TOL);
        assert!(r.monthly.iter().all(|c| *c == MonthCell::Value(0.0)));
    }

    #[test]
    fn test_final_month_absorbs_remainder() {
        // 50%/yr purchased 22 months before FY start: 22 of 24 months used.
        let mut t = table(Some(50.0), vec![row(Some(date(2021, 6, 1)), 1200.0)]);
        recalculate(&mut t, &calendar());
        let r = &t.rows[0];
        let monthly = 1200.0 * 0.50 / 12.0; // 50.0
        assert!((r.accumulated - 22.0 * monthly).abs() < TOL);
        // Two months of headroom left: Apr and May 2023 charge, then zeros.
        assert!((r.monthly[0].numeric() - monthly).abs() < TOL);
        assert!((r.monthly[1].numeric() - monthly).abs() < TOL);
        assert_eq!(r.monthly[2], MonthCell::Value(0.0));
        assert!((r.total_depreciation - 1200.0).abs() < TOL);
        assert!(r.wdv.abs() < TOL);
    }

    #[test]
    fn test_partial_final_allocation() {
        // Cost 1000 at 45%/yr, purchased 26 months before FY start:
        // floor(1000/37.5) = 26 months to amortize, and 26 months have
        // elapsed, so the accumulated figure snaps to exactly 1000.
        let mut t = table(Some(45.0), vec![row(Some(date(2021, 2, 1)), 1000.0)]);
        recalculate(&mut t, &calendar());
        let r = &t.rows[0];
        assert!((r.accumulated - 1000.0).abs() < TOL);
        assert_eq!(r.monthly[0], MonthCell::Value(0.0));
        assert!((r.total_depreciation - 1000.0).abs() < TOL);
    }

    #[test]
    fn test_invariant_across_rates_and_dates() {
        let cal = calendar();
        for rate in [0.0, 5.0, 12.5, 20.0, 33.0, 50.0, 100.0, 250.0] {
            for purchase in [
                date(2018, 1, 1),
                date(2022, 11, 30),
                date(2023, 3, 1),
                date(2023, 4, 1),
                date(2023, 9, 15),
                date(2024, 3, 31),
            ] {
                let mut t = table(Some(rate), vec![row(Some(purchase), 1234.56)]);
                recalculate(&mut t, &cal);
                let r = &t.rows[0];
                assert!(
                    r.total_depreciation <= r.total_cost + TOL,
                    "rate {rate} purchase {purchase}: {} > {}",
                    r.total_depreciation,
                    r.total_cost
                );
                assert!(r.wdv >= -TOL);
            }
        }
    }
}
