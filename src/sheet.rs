//! In-memory workbook aggregate.
//!
//! One `Workbook` is loaded per run (cached cell values only, no formula
//! evaluation), mutated in place by each pipeline stage, and serialized once
//! at the end. Cells live in a sparse grid keyed by zero-based coordinates.

use std::collections::BTreeMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;

use crate::dates::parse_loose_date;
use crate::error::{MaprepError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Formula(String),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// The slice of cell styling the output contract actually needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub bold: bool,
    pub num_format: Option<String>,
    pub highlight: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    cells: BTreeMap<(u32, u16), Cell>,
    col_widths: BTreeMap<u16, f64>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            cells: BTreeMap::new(),
            col_widths: BTreeMap::new(),
        }
    }

    pub fn value(&self, row: u32, col: u16) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(&(row, col)).map_or(&EMPTY, |c| &c.value)
    }

    pub fn is_blank(&self, row: u32, col: u16) -> bool {
        self.value(row, col).is_blank()
    }

    /// Cell content as display text; empty string for blank cells.
    pub fn text(&self, row: u32, col: u16) -> String {
        match self.value(row, col) {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Formula(f) => f.clone(),
        }
    }

    /// Numeric value of a cell; non-numeric content coerces to 0 so corrupt
    /// or blank cells contribute nothing to sums.
    pub fn number(&self, row: u32, col: u16) -> f64 {
        match self.value(row, col) {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().replace(',', "").parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Date value of a cell, if the content is or parses as one.
    pub fn date(&self, row: u32, col: u16) -> Option<NaiveDate> {
        match self.value(row, col) {
            CellValue::Date(d) => Some(*d),
            CellValue::Number(n) if *n >= 1.0 => Some(serial_to_date(*n)),
            CellValue::Text(s) => parse_loose_date(s),
            _ => None,
        }
    }

    pub fn set(&mut self, row: u32, col: u16, value: CellValue) {
        self.cells.entry((row, col)).or_default().value = value;
    }

    pub fn set_styled(&mut self, row: u32, col: u16, value: CellValue, style: CellStyle) {
        let cell = self.cells.entry((row, col)).or_default();
        cell.value = value;
        cell.style = style;
    }

    pub fn style_mut(&mut self, row: u32, col: u16) -> &mut CellStyle {
        &mut self.cells.entry((row, col)).or_default().style
    }

    /// Last row index holding any cell (0 for an empty sheet).
    pub fn max_row(&self) -> u32 {
        self.cells.keys().map(|(r, _)| *r).max().unwrap_or(0)
    }

    /// Last column index holding any cell (0 for an empty sheet).
    pub fn max_col(&self) -> u16 {
        self.cells.keys().map(|(_, c)| *c).max().unwrap_or(0)
    }

    /// Remove every cell at `row` or below.
    pub fn clear_below(&mut self, row: u32) {
        self.cells.retain(|(r, _), _| *r < row);
    }

    pub fn set_col_width(&mut self, col: u16, width: f64) {
        self.col_widths.insert(col, width);
    }

    pub fn col_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.col_widths.iter().map(|(c, w)| (*c, *w))
    }

    pub fn cells(&self) -> impl Iterator<Item = (&(u32, u16), &Cell)> {
        self.cells.iter()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Workbook { sheets: Vec::new() }
    }

    /// Load every sheet of a spreadsheet file (cached values only).
    pub fn load(path: &Path) -> Result<Workbook> {
        let mut source = open_workbook_auto(path)
            .map_err(|e| MaprepError::WorkbookRead(e.to_string()))?;
        let names: Vec<String> = source.sheet_names().to_vec();
        let mut wb = Workbook::new();
        for name in names {
            let mut sheet = Sheet::new(&name);
            if let Ok(range) = source.worksheet_range(&name) {
                if let Some((r0, c0)) = range.start() {
                    for (r, row) in range.rows().enumerate() {
                        for (c, data) in row.iter().enumerate() {
                            if let Some(value) = convert_cell(data) {
                                sheet.set(r0 + r as u32, (c0 as usize + c) as u16, value);
                            }
                        }
                    }
                }
            }
            wb.sheets.push(sheet);
        }
        Ok(wb)
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sheet(name).is_some()
    }

    /// Existing sheet by name, or a fresh one appended at the end.
    pub fn ensure_sheet(&mut self, name: &str) -> &mut Sheet {
        if let Some(idx) = self.sheets.iter().position(|s| s.name == name) {
            return &mut self.sheets[idx];
        }
        self.sheets.push(Sheet::new(name));
        self.sheets.last_mut().unwrap()
    }

    pub fn remove_sheet(&mut self, name: &str) {
        self.sheets.retain(|s| s.name != name);
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }
}

/// Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug).
pub fn serial_to_date(serial: f64) -> NaiveDate {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    base + chrono::Duration::days(serial as i64)
}

/// Days since the Excel epoch for a calendar date.
pub fn date_to_serial(date: NaiveDate) -> f64 {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    (date - base).num_days() as f64
}

fn convert_cell(data: &Data) -> Option<CellValue> {
    match data {
        Data::Empty => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Number(if *b { 1.0 } else { 0.0 })),
        Data::DateTime(f) if f.as_f64() >= 1.0 => Some(CellValue::Date(serial_to_date(f.as_f64()))),
        Data::DateTime(f) => Some(CellValue::Number(f.as_f64())),
        Data::DateTimeIso(s) => match parse_loose_date(s) {
            Some(d) => Some(CellValue::Date(d)),
            None => Some(CellValue::Text(s.clone())),
        },
        Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(_) => None,
    }
}
