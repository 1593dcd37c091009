use tracing::debug;

use crate::models::{DevelopmentMonthGrid, LossStatRow, RowTags, YearRecord};

/// Convert a year × development-month grid into long-format rows.
///
/// Rows are emitted column-major: all years for 12 months, then all years for
/// 24 months, and so on. A grid cell with no value yields a row with no ratio.
pub fn melt_loss_ratios(
    years: &[YearRecord],
    grid: &DevelopmentMonthGrid,
    tags: &RowTags,
) -> Vec<LossStatRow> {
    let mut rows = Vec::with_capacity(years.len() * grid.development_months.len());

    for (column, month) in grid.development_months.iter().enumerate() {
        for (year_index, year) in years.iter().enumerate() {
            rows.push(LossStatRow {
                year: year.year,
                development_month: *month,
                loss_incurred_ratio: grid.ratio(year_index, column),
                line_of_business: tags.line_of_business.clone(),
                currency: tags.currency.clone(),
                company_name: tags.company_name.clone(),
                created_date: tags.stamp.created_date.clone(),
                created_by: tags.stamp.created_by.clone(),
            });
        }
    }

    debug!(
        "Melted {} loss ratio rows for {}",
        rows.len(),
        tags.line_of_business
    );
    rows
}
