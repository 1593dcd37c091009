use tracing::debug;

use crate::error::{EtlError, Result};
use crate::models::{BookedFigures, BookedRow, RunStamp, YearRecord};

/// Paid losses + case reserves + IBNR.
///
/// Despite the column name this is a monetary amount, not a ratio. Missing if any
/// operand is missing.
pub fn ultimate_loss_ratio(figures: &BookedFigures) -> Option<f64> {
    Some(figures.paid_losses? + figures.case_reserves? + figures.ibnr?)
}

/// Join the year/premium columns with the booked block, row by row.
///
/// The join is positional: row `i` of every input belongs to year `i`.
pub fn assemble_booked(
    line_of_business: &str,
    years: &[YearRecord],
    gross_written_premium: &[Option<f64>],
    booked: &[BookedFigures],
    stamp: &RunStamp,
) -> Result<Vec<BookedRow>> {
    check_length(line_of_business, years.len(), gross_written_premium.len())?;
    check_length(line_of_business, years.len(), booked.len())?;

    let rows: Vec<BookedRow> = years
        .iter()
        .zip(gross_written_premium)
        .zip(booked)
        .map(|((year, gwp), figures)| BookedRow {
            year: year.year,
            gross_written_premium: *gwp,
            earned_premium: figures.earned_premium,
            paid_losses: figures.paid_losses,
            case_reserves: figures.case_reserves,
            ibnr: figures.ibnr,
            ultimate_loss_ratio: ultimate_loss_ratio(figures),
            line_of_business: line_of_business.to_string(),
            created_date: stamp.created_date.clone(),
            created_by: stamp.created_by.clone(),
        })
        .collect();

    debug!("Assembled {} booked rows for {}", rows.len(), line_of_business);
    Ok(rows)
}

fn check_length(context: &str, left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(EtlError::ShapeMismatch {
            context: context.to_string(),
            left,
            right,
        });
    }
    Ok(())
}
