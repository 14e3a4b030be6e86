//! Testing utilities for the sheetlens workspace
//!
//! Sheet builders and the canonical scenario workbooks.

#![allow(missing_docs)]

use sheetlens_formula::record_for;
use sheetlens_model::{CellLocation, FormulaRecord, SheetSnapshot};

/// Fluent builder for a harvested sheet
#[derive(Debug, Clone)]
pub struct SheetBuilder {
    name: String,
    rows: u32,
    cols: u32,
    formulas: Vec<FormulaRecord>,
    sampled: bool,
}

impl SheetBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: 10,
            cols: 5,
            formulas: Vec::new(),
            sampled: false,
        }
    }

    pub fn size(mut self, rows: u32, cols: u32) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn sampled(mut self) -> Self {
        self.sampled = true;
        self
    }

    /// Place a formula at the next free cell in row-major order
    pub fn formula(self, raw: &str) -> Self {
        let index = self.formulas.len() as u32;
        let cols = self.cols.max(1);
        self.formula_at(index / cols, index % cols, raw)
    }

    pub fn formula_at(mut self, row: u32, col: u32, raw: &str) -> Self {
        let record = record_for(raw, CellLocation::new(row, col))
            .unwrap_or_else(|| panic!("not a formula: {raw}"));
        self.formulas.push(record);
        self
    }

    /// Place `count` copies of the same formula
    pub fn repeat(mut self, raw: &str, count: usize) -> Self {
        for _ in 0..count {
            self = self.formula(raw);
        }
        self
    }

    pub fn build(self) -> SheetSnapshot {
        SheetSnapshot::new(self.name, self.rows, self.cols, self.formulas).with_sampled(self.sampled)
    }
}

/// Sheet with no formulas
pub fn data_sheet(name: &str) -> SheetSnapshot {
    SheetBuilder::new(name).build()
}

/// "Orders" with a SUM and a VLOOKUP into "Products"
pub fn orders_and_products() -> Vec<SheetSnapshot> {
    vec![
        SheetBuilder::new("Orders")
            .size(3, 2)
            .formula_at(1, 1, "=SUM(A1:A10)")
            .formula_at(2, 1, "=VLOOKUP(A1,'Products'!A:C,2,FALSE)")
            .build(),
        SheetBuilder::new("Products").size(3, 3).build(),
    ]
}

/// Ten sheets, "Config" referenced by three of them through plain formulas
pub fn config_master_workbook() -> Vec<SheetSnapshot> {
    let mut sheets = vec![
        data_sheet("Config"),
        SheetBuilder::new("Sales").formula("=Config!B2*A2").build(),
        SheetBuilder::new("Costs").formula("=A2+Config!B3").build(),
        SheetBuilder::new("Tax").formula("=SUM(Config!B1:B5)").build(),
    ];
    for i in 1..=6 {
        sheets.push(data_sheet(&format!("Extra{i}")));
    }
    sheets
}

/// 25 x 5 sheet holding 40 formulas
pub fn dense_calculation_sheet() -> SheetSnapshot {
    SheetBuilder::new("Calc")
        .size(25, 5)
        .repeat("=A1*B1", 40)
        .build()
}

/// Sheets that never reference each other
pub fn independent_sheets() -> Vec<SheetSnapshot> {
    vec![
        SheetBuilder::new("Inputs").formula("=SUM(A1:A5)").build(),
        data_sheet("Notes"),
        SheetBuilder::new("Dates").formula("=TODAY()").build(),
    ]
}

/// Hub-and-spoke workbook carrying master, lookup and aggregation roles
pub fn integrated_workbook() -> Vec<SheetSnapshot> {
    vec![
        data_sheet("Products"),
        SheetBuilder::new("Orders")
            .repeat("=VLOOKUP(A2,Products!A:C,2,FALSE)", 4)
            .build(),
        SheetBuilder::new("Summary")
            .repeat("=SUM(Orders!D2:D99)", 6)
            .formula("=INDEX(Products!A:A,2)")
            .build(),
    ]
}
