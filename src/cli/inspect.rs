use std::path::Path;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Table};

use crate::error::Result;
use crate::far;
use crate::fmt::money;
use crate::models::{AssetTable, FiscalCalendar, MonthCell};
use crate::pipeline;
use crate::sheet::Workbook;

pub fn run(file: &str, csv_dir: Option<String>) -> Result<()> {
    let wb = Workbook::load(Path::new(file))?;
    let dates = pipeline::header_dates(&wb)?;
    let cal = FiscalCalendar::new(dates);

    let mut warnings = Vec::new();
    let tables = far::recalculated_tables(&wb, &cal, &mut warnings)?;

    for warning in &warnings {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
    println!(
        "Fiscal year {} to {}, management period to {}.\n",
        cal.fy_start, cal.fy_end, cal.mgmt_end
    );
    for table in &tables {
        print_table(table);
    }
    if tables.is_empty() {
        println!("No asset tables found on the FAR sheet.");
    }

    if let Some(dir) = csv_dir {
        std::fs::create_dir_all(&dir)?;
        for table in &tables {
            let path = Path::new(&dir).join(csv_file_name(&table.name));
            write_csv(table, &cal, &path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn print_table(table: &AssetTable) {
    println!(
        "{} — depreciation rate {:.0}%",
        table.name.bold(),
        table.rate_or_zero()
    );
    let mut out = Table::new();
    out.load_preset(UTF8_FULL);
    out.set_header(vec![
        "Purchase Date",
        "Details",
        "Cost",
        "Addition",
        "Total Cost",
        "Acc. Dep",
        "Total Dep",
        "WDV",
    ]);
    for row in &table.rows {
        let date = match row.purchase_date {
            Some(d) => d.format("%d-%m-%Y").to_string(),
            None => row.purchase_raw.clone(),
        };
        out.add_row(vec![
            Cell::new(date),
            Cell::new(&row.details),
            Cell::new(money(row.cost)),
            Cell::new(money(row.addition)),
            Cell::new(money(row.total_cost)),
            Cell::new(money(row.accumulated)),
            Cell::new(money(row.total_depreciation)),
            Cell::new(money(row.wdv)),
        ]);
    }
    let total_wdv: f64 = table.rows.iter().map(|r| r.wdv).sum();
    let total_cost: f64 = table.rows.iter().map(|r| r.total_cost).sum();
    println!("{out}");
    println!(
        "  {} rows, total cost {}, total WDV {}\n",
        table.rows.len(),
        money(total_cost),
        money(total_wdv)
    );
}

fn csv_file_name(table_name: &str) -> String {
    let safe: String = table_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.csv", safe.trim_matches('_').to_lowercase())
}

/// Full table dump including the per-month schedule.
fn write_csv(table: &AssetTable, cal: &FiscalCalendar, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec![
        "Purchase Date".to_string(),
        "Details".to_string(),
        "Cost".to_string(),
        "Addition".to_string(),
        "Total Cost".to_string(),
        "Depreciation Rate".to_string(),
        "Accumulated Depreciation".to_string(),
    ];
    header.extend(cal.month_labels());
    header.push("Total Depreciation".to_string());
    header.push("WDV".to_string());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![
            row.purchase_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| row.purchase_raw.clone()),
            row.details.clone(),
            format!("{:.2}", row.cost),
            format!("{:.2}", row.addition),
            format!("{:.2}", row.total_cost),
            format!("{:.0}", table.rate_or_zero()),
            format!("{:.2}", row.accumulated),
        ];
        for cell in &row.monthly {
            record.push(match cell {
                MonthCell::Blank => String::new(),
                MonthCell::Value(v) => format!("{v:.2}"),
            });
        }
        record.push(format!("{:.2}", row.total_depreciation));
        record.push(format!("{:.2}", row.wdv));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
