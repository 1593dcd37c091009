//! Builds loss workbooks with the same layout as the production file

use std::path::Path;

use anyhow::Result;
use rust_xlsxwriter::{Workbook, Worksheet};

pub const HEADER_ROW: u32 = 4;
pub const FIRST_DATA_ROW: u32 = 5;
pub const FIRST_YEAR: i32 = 2010;

/// Loss incurred ratio written at grid position (row, col) of sheet `sheet_index`
pub fn ratio_at(sheet_index: usize, row: usize, col: usize) -> f64 {
    sheet_index as f64 + row as f64 / 100.0 + col as f64 / 1000.0
}

pub fn earned_premium_at(row: usize) -> f64 {
    900.0 + row as f64 * 50.0
}

/// Paid losses, case reserves, IBNR for a data row
pub fn booked_losses_at(row: usize) -> (f64, f64, f64) {
    (0.3 + row as f64 / 100.0, 0.1, 0.05)
}

pub fn gross_written_premium_at(row: usize) -> f64 {
    1000.0 + row as f64 * 100.0
}

/// Write a workbook with one loss tab per name
pub fn write_loss_workbook(path: &Path, sheet_names: &[&str]) -> Result<()> {
    let mut workbook = Workbook::new();
    for (index, name) in sheet_names.iter().enumerate() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name)?;
        write_loss_sheet(worksheet, index)?;
    }
    workbook.save(path)?;
    Ok(())
}

fn write_loss_sheet(ws: &mut Worksheet, sheet_index: usize) -> Result<()> {
    ws.write_string(0, 0, "Company XYZ")?;
    ws.write_string(1, 0, "Loss incurred ratios by development year")?;

    ws.write_string(HEADER_ROW, 0, "Year")?;
    ws.write_string(HEADER_ROW, 1, "GWP")?;
    for col in 0..12u16 {
        ws.write_number(HEADER_ROW, 2 + col, col as f64 + 1.0)?;
    }
    ws.write_string(HEADER_ROW, 15, "Earned Premium")?;
    ws.write_string(HEADER_ROW, 16, "Paid")?;
    ws.write_string(HEADER_ROW, 17, "Case")?;
    ws.write_string(HEADER_ROW, 18, "IBNR")?;

    for row in 0..12usize {
        let r = FIRST_DATA_ROW + row as u32;
        ws.write_number(r, 0, FIRST_YEAR + row as i32)?;
        ws.write_number(r, 1, gross_written_premium_at(row))?;
        for col in 0..12usize {
            ws.write_number(r, 2 + col as u16, ratio_at(sheet_index, row, col))?;
        }
        let (paid, case, ibnr) = booked_losses_at(row);
        ws.write_number(r, 15, earned_premium_at(row))?;
        ws.write_number(r, 16, paid)?;
        ws.write_number(r, 17, case)?;
        ws.write_number(r, 18, ibnr)?;
    }
    Ok(())
}
