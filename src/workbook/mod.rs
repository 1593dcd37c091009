//! Positional extraction of the loss workbook tabs.
//!
//! Every consumed tab shares one layout: development-interval headers on row 5,
//! twelve underwriting years from row 6 in column A, gross written premium in
//! column B, loss incurred ratios in C:N and booked figures in P:S.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use tracing::{debug, info};

use crate::error::{EtlError, Result};
use crate::models::{BookedFigures, DevelopmentMonthGrid, SheetBlock, YearRecord};

/// Zero-based cell offsets of the sheet layout
pub mod layout {
    pub const HEADER_ROW: u32 = 4;
    pub const FIRST_DATA_ROW: u32 = 5;
    pub const BLOCK_ROWS: u32 = 12;

    pub const YEAR_COL: u32 = 0;
    pub const GROSS_WRITTEN_PREMIUM_COL: u32 = 1;

    pub const GRID_FIRST_COL: u32 = 2;
    pub const GRID_COLS: u32 = 12;

    pub const BOOKED_FIRST_COL: u32 = 15;
    pub const EARNED_PREMIUM_COL: u32 = BOOKED_FIRST_COL;
    pub const PAID_LOSSES_COL: u32 = BOOKED_FIRST_COL + 1;
    pub const CASE_RESERVES_COL: u32 = BOOKED_FIRST_COL + 2;
    pub const IBNR_COL: u32 = BOOKED_FIRST_COL + 3;
}

/// Reads fixed cell ranges out of named worksheets
pub struct SpreadsheetReader {
    path: String,
    workbook: Xlsx<BufReader<File>>,
}

impl SpreadsheetReader {
    /// Open an `.xlsx` workbook
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let workbook: Xlsx<_> = open_workbook(path)?;
        info!("Opened workbook {}", path.display());

        Ok(Self {
            path: path.display().to_string(),
            workbook,
        })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// Extract the years, loss ratio grid and booked block of one tab
    pub fn read_sheet(&mut self, sheet_name: &str) -> Result<SheetBlock> {
        if !self.sheet_names().iter().any(|name| name == sheet_name) {
            return Err(EtlError::MissingSheet(sheet_name.to_string()));
        }

        let range = self.workbook.worksheet_range(sheet_name)?;
        let block = read_block(sheet_name, &range)?;

        debug!(
            "Read {} years and {} development intervals from {}:{}",
            block.years.len(),
            block.grid.development_months.len(),
            self.path,
            sheet_name
        );
        Ok(block)
    }
}

/// Extract a `SheetBlock` from an already loaded worksheet range.
///
/// Cells are addressed by absolute position, so a range that does not start at
/// A1 is read the same way as one that does.
pub fn read_block(sheet_name: &str, range: &Range<Data>) -> Result<SheetBlock> {
    use layout::*;

    let data_rows = FIRST_DATA_ROW..FIRST_DATA_ROW + BLOCK_ROWS;

    let years = data_rows
        .clone()
        .map(|row| read_year(sheet_name, range, row))
        .collect::<Result<Vec<_>>>()?;

    // Only the width of the header matters: intervals become 12, 24, ... months
    let header_width = (GRID_FIRST_COL..GRID_FIRST_COL + GRID_COLS)
        .filter(|col| cell(range, HEADER_ROW, *col).is_some())
        .count();
    debug!(
        "Sheet {} has {} populated interval headers",
        sheet_name, header_width
    );

    let ratios = data_rows
        .clone()
        .map(|row| {
            (GRID_FIRST_COL..GRID_FIRST_COL + GRID_COLS)
                .map(|col| number(range, row, col))
                .collect()
        })
        .collect();

    let gross_written_premium = data_rows
        .clone()
        .map(|row| number(range, row, GROSS_WRITTEN_PREMIUM_COL))
        .collect();

    let booked = data_rows
        .map(|row| BookedFigures {
            earned_premium: number(range, row, EARNED_PREMIUM_COL),
            paid_losses: number(range, row, PAID_LOSSES_COL),
            case_reserves: number(range, row, CASE_RESERVES_COL),
            ibnr: number(range, row, IBNR_COL),
        })
        .collect();

    Ok(SheetBlock {
        sheet_name: sheet_name.to_string(),
        years,
        grid: DevelopmentMonthGrid::new(ratios, GRID_COLS as usize),
        gross_written_premium,
        booked,
    })
}

fn read_year(sheet_name: &str, range: &Range<Data>, row: u32) -> Result<YearRecord> {
    let col = layout::YEAR_COL;
    match number(range, row, col) {
        Some(value) if value.fract() == 0.0 => Ok(YearRecord::new(value as i32)),
        _ => Err(EtlError::Layout {
            sheet: sheet_name.to_string(),
            row: row + 1,
            col: col + 1,
            message: format!("expected a year, found {:?}", cell(range, row, col)),
        }),
    }
}

/// Non-empty cell at an absolute position
fn cell(range: &Range<Data>, row: u32, col: u32) -> Option<&Data> {
    match range.get_value((row, col)) {
        None | Some(Data::Empty) => None,
        Some(Data::String(s)) if s.trim().is_empty() => None,
        Some(value) => Some(value),
    }
}

/// Numeric value of a cell; empty, error and non-numeric cells read as missing
pub fn number(range: &Range<Data>, row: u32, col: u32) -> Option<f64> {
    match cell(range, row, col)? {
        Data::Float(value) => Some(*value),
        Data::Int(value) => Some(*value as f64),
        Data::String(text) => text.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}
