//! Booked-loss chart: stacked paid/case/IBNR columns per year with earned
//! premium overlaid on a secondary axis.

use std::path::Path;

use rust_xlsxwriter::{
    Chart, ChartFormat, ChartLegendPosition, ChartLine, ChartMarker, ChartMarkerType,
    ChartSolidFill, ChartType, Format, Workbook, Worksheet,
};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::SheetBlock;

/// Tick spacing of the earned premium axis
pub const SECONDARY_AXIS_STEP: f64 = 200.0;

const DATA_SHEET: &str = "Booked";

mod cols {
    pub const YEAR: u16 = 0;
    pub const EARNED_PREMIUM: u16 = 1;
    pub const PAID_LOSSES: u16 = 2;
    pub const CASE_RESERVES: u16 = 3;
    pub const IBNR: u16 = 4;
}

const STACKED_SERIES: [(u16, &str); 3] = [
    (cols::PAID_LOSSES, "#0000FF"),
    (cols::CASE_RESERVES, "#90EE90"),
    (cols::IBNR, "#006400"),
];

/// Scale of the secondary (earned premium) axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    pub min: f64,
    pub max: f64,
    pub major_unit: f64,
}

/// Axis running from 0 to the next multiple of 200 strictly above `max_premium`
pub fn secondary_axis_scale(max_premium: f64) -> AxisScale {
    let max = max_premium + (SECONDARY_AXIS_STEP - max_premium % SECONDARY_AXIS_STEP);
    AxisScale {
        min: 0.0,
        max,
        major_unit: SECONDARY_AXIS_STEP,
    }
}

/// Tick positions 0, 200, ... up to but excluding `max_premium + 200`
pub fn secondary_axis_ticks(max_premium: f64) -> Vec<f64> {
    let upper = max_premium + SECONDARY_AXIS_STEP;
    (0..)
        .map(|i| i as f64 * SECONDARY_AXIS_STEP)
        .take_while(|tick| *tick < upper)
        .collect()
}

/// Write the booked block of a sheet and its combo chart to an `.xlsx` file
pub fn render_booked_chart(block: &SheetBlock, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let rows = block.years.len().min(block.booked.len()) as u32;

    let max_premium = block
        .booked
        .iter()
        .filter_map(|b| b.earned_premium)
        .fold(0.0_f64, f64::max);
    let scale = secondary_axis_scale(max_premium);
    debug!(
        "Earned premium axis ticks: {:?}",
        secondary_axis_ticks(max_premium)
    );

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(DATA_SHEET)?;
    write_data(worksheet, block)?;

    let title = format!("{} booked losses and earned premium", block.sheet_name);
    let mut chart = Chart::new(ChartType::ColumnStacked);
    chart.title().set_name(title.as_str());

    for (col, color) in STACKED_SERIES {
        chart
            .add_series()
            .set_name((DATA_SHEET, 0, col))
            .set_categories((DATA_SHEET, 1, cols::YEAR, rows, cols::YEAR))
            .set_values((DATA_SHEET, 1, col, rows, col))
            .set_format(ChartFormat::new().set_solid_fill(ChartSolidFill::new().set_color(color)));
    }
    chart.x_axis().set_name("Year");
    chart.y_axis().set_num_format("0%");
    chart.legend().set_position(ChartLegendPosition::Bottom);

    let mut line = Chart::new(ChartType::Line);
    line.add_series()
        .set_name("Earned Premium")
        .set_categories((DATA_SHEET, 1, cols::YEAR, rows, cols::YEAR))
        .set_values((DATA_SHEET, 1, cols::EARNED_PREMIUM, rows, cols::EARNED_PREMIUM))
        .set_format(ChartFormat::new().set_line(ChartLine::new().set_color("#ADD8E6").set_width(1.0)))
        .set_marker(ChartMarker::new().set_type(ChartMarkerType::Star))
        .set_secondary_axis(true);
    chart.combine(&line);

    // y2 properties are read from the primary chart
    chart
        .y2_axis()
        .set_name("Earned Premium")
        .set_min(scale.min)
        .set_max(scale.max)
        .set_major_unit(scale.major_unit);

    worksheet.insert_chart(1, cols::IBNR + 2, &chart)?;

    workbook.save(path)?;
    info!(
        "Saved booked chart for {} to {} (secondary axis 0..{})",
        block.sheet_name,
        path.display(),
        scale.max
    );
    Ok(())
}

fn write_data(worksheet: &mut Worksheet, block: &SheetBlock) -> Result<()> {
    let header = Format::new().set_bold();
    worksheet.write_string_with_format(0, cols::YEAR, "Year", &header)?;
    worksheet.write_string_with_format(0, cols::EARNED_PREMIUM, "EarnedPremium", &header)?;
    worksheet.write_string_with_format(0, cols::PAID_LOSSES, "PaidLosses", &header)?;
    worksheet.write_string_with_format(0, cols::CASE_RESERVES, "CaseReserves", &header)?;
    worksheet.write_string_with_format(0, cols::IBNR, "IBNR", &header)?;

    for (i, (year, figures)) in block.years.iter().zip(&block.booked).enumerate() {
        let row = i as u32 + 1;
        worksheet.write_number(row, cols::YEAR, year.year)?;
        let values = [
            (cols::EARNED_PREMIUM, figures.earned_premium),
            (cols::PAID_LOSSES, figures.paid_losses),
            (cols::CASE_RESERVES, figures.case_reserves),
            (cols::IBNR, figures.ibnr),
        ];
        for (col, value) in values {
            if let Some(value) = value {
                worksheet.write_number(row, col, value)?;
            }
        }
    }
    Ok(())
}
