use std::path::Path;

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use tracing::{info, warn};

use crate::api::RateMap;
use crate::error::Result;
use crate::models::{ExchangeRateRow, BASE_CURRENCY, SPOT_RATE, TARGET_CURRENCIES};

const HEADERS: [&str; 6] = [
    "Rate Type",
    "Date",
    "Currency_From",
    "Currency_From_Value",
    "Currency_To",
    "Currency_To_Value",
];

/// One spot-rate row per target currency, in target-list order.
///
/// Currencies absent from `rates` are skipped with a warning.
pub fn build_rate_rows(rates: &RateMap, date: NaiveDate) -> Vec<ExchangeRateRow> {
    TARGET_CURRENCIES
        .iter()
        .filter_map(|code| match rates.get(*code) {
            Some(rate) => Some(ExchangeRateRow {
                rate_type: SPOT_RATE.to_string(),
                date,
                currency_from: BASE_CURRENCY.to_string(),
                currency_from_value: 1,
                currency_to: code.to_string(),
                currency_to_value: *rate,
            }),
            None => {
                warn!("No rate for {}, skipping", code);
                None
            }
        })
        .collect()
}

/// Write the rate table as a single sheet, replacing any existing file
pub fn write_rate_table(rows: &[ExchangeRateRow], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    for (col, name) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, rate) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string(row, 0, &rate.rate_type)?;
        worksheet.write_string(row, 1, rate.date.format("%Y-%m-%d").to_string())?;
        worksheet.write_string(row, 2, &rate.currency_from)?;
        worksheet.write_number(row, 3, rate.currency_from_value)?;
        worksheet.write_string(row, 4, &rate.currency_to)?;
        worksheet.write_number(row, 5, rate.currency_to_value)?;
    }

    workbook.save(path)?;
    info!("Saved the exchange rates to the file: {}", path.display());
    Ok(())
}
