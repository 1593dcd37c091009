//! The two end-to-end runs: workbook → fact tables (+ chart), and
//! exchange-rate API → rate table.
//!
//! A failing step is logged and the run moves on to the next step; nothing is
//! retried and the caller always gets a summary back.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::api::RateProvider;
use crate::chart::render_booked_chart;
use crate::database::DatabaseManager;
use crate::error::Result;
use crate::export::{preview, write_csv_file};
use crate::models::{BookedRow, Config, LossStatRow, RowTags, RunStamp, SheetBlock};
use crate::rate_table::{build_rate_rows, write_rate_table};
use crate::transform::{assemble_booked, melt_loss_ratios};
use crate::workbook::SpreadsheetReader;

const PREVIEW_ROWS: usize = 10;

/// A worksheet block together with the audit stamp taken when it was read
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    pub block: SheetBlock,
    pub stamp: RunStamp,
}

/// Outcome of a loss-data run
#[derive(Debug, Default)]
pub struct LossRunSummary {
    pub sheets_read: usize,
    pub loss_rows_loaded: usize,
    pub booked_rows_loaded: usize,
    pub chart_path: Option<PathBuf>,
    pub failed_steps: Vec<String>,
}

impl LossRunSummary {
    fn record<T>(&mut self, step: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Step '{}' failed: {}", step, e);
                self.failed_steps.push(step.to_string());
                None
            }
        }
    }
}

/// Per-run overrides layered on top of the config file
#[derive(Debug, Clone, Default)]
pub struct LossRunOptions {
    pub csv_dir: Option<PathBuf>,
}

/// Read every configured sheet, load both fact tables and render the chart.
///
/// `factdata` receives the booked rows of every sheet read, not just the first.
/// When no sheet could be read the previous contents of both tables are kept.
pub async fn run_loss_pipeline(config: &Config, options: &LossRunOptions) -> LossRunSummary {
    let mut summary = LossRunSummary::default();
    info!("Starting loss data load from {}", config.workbook_path);

    let database = summary.record("connect", DatabaseManager::connect(&config.db_url).await);

    let sheets = match summary.record(
        "open workbook",
        SpreadsheetReader::open(&config.workbook_path),
    ) {
        Some(mut reader) => read_sheets(&mut reader, config, &mut summary),
        None => Vec::new(),
    };
    summary.sheets_read = sheets.len();

    let loss_rows = melt_sheets(&sheets, config);
    log_preview("loss statistics", &loss_rows);

    let booked_rows = assemble_sheets(&sheets, &mut summary);
    log_preview("booked data", &booked_rows);

    if sheets.is_empty() {
        warn!("No sheets were read, keeping the existing fact tables");
    } else if let Some(database) = &database {
        if let Some(count) = summary.record(
            "load factstatistical",
            database.replace_loss_statistics(&loss_rows).await,
        ) {
            summary.loss_rows_loaded = count;
            info!("Finished loading factstatistical data to the database.");
        }
        if let Some(count) = summary.record(
            "load factdata",
            database.replace_booked_data(&booked_rows).await,
        ) {
            summary.booked_rows_loaded = count;
            info!("Finished loading factdata data to the database.");
        }
    } else {
        warn!("No database connection, skipping table loads");
    }

    match config.chart_sheet() {
        Some(chart_sheet) => match sheets.iter().find(|s| s.block.sheet_name == chart_sheet) {
            Some(sheet) => {
                let path = PathBuf::from(&config.chart_output);
                if summary
                    .record("render chart", render_booked_chart(&sheet.block, &path))
                    .is_some()
                {
                    summary.chart_path = Some(path);
                }
            }
            None => warn!("Chart sheet {} was not read, skipping chart", chart_sheet),
        },
        None => warn!("No chart sheet configured"),
    }

    if let Some(dir) = &options.csv_dir {
        let result = export_tables(dir, &loss_rows, &booked_rows);
        summary.record("export csv", result);
    }

    if let Some(database) = &database {
        database.close().await;
    }

    info!(
        "Loss data run finished: {} sheets, {} statistical rows, {} booked rows, {} failed steps",
        summary.sheets_read,
        summary.loss_rows_loaded,
        summary.booked_rows_loaded,
        summary.failed_steps.len()
    );
    summary
}

fn read_sheets(
    reader: &mut SpreadsheetReader,
    config: &Config,
    summary: &mut LossRunSummary,
) -> Vec<LoadedSheet> {
    config
        .sheets
        .iter()
        .filter_map(|name| {
            let block = summary.record(&format!("read sheet {}", name), reader.read_sheet(name))?;
            Some(LoadedSheet {
                block,
                stamp: RunStamp::now(&config.created_by),
            })
        })
        .collect()
}

/// Melt every sheet's grid and concatenate in sheet order
pub fn melt_sheets(sheets: &[LoadedSheet], config: &Config) -> Vec<LossStatRow> {
    sheets
        .iter()
        .flat_map(|sheet| {
            let tags = RowTags {
                line_of_business: sheet.block.sheet_name.clone(),
                currency: config.currency.clone(),
                company_name: config.company_name.clone(),
                stamp: sheet.stamp.clone(),
            };
            melt_loss_ratios(&sheet.block.years, &sheet.block.grid, &tags)
        })
        .collect()
}

fn assemble_sheets(sheets: &[LoadedSheet], summary: &mut LossRunSummary) -> Vec<BookedRow> {
    let mut rows = Vec::new();
    for sheet in sheets {
        let block = &sheet.block;
        let assembled = assemble_booked(
            &block.sheet_name,
            &block.years,
            &block.gross_written_premium,
            &block.booked,
            &sheet.stamp,
        );
        if let Some(sheet_rows) = summary.record(&format!("assemble {}", block.sheet_name), assembled)
        {
            rows.extend(sheet_rows);
        }
    }
    rows
}

fn export_tables(dir: &Path, loss_rows: &[LossStatRow], booked_rows: &[BookedRow]) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    write_csv_file(dir.join("factstatistical.csv"), loss_rows)?;
    write_csv_file(dir.join("factdata.csv"), booked_rows)?;
    Ok(())
}

fn log_preview<T: serde::Serialize>(label: &str, rows: &[T]) {
    info!("Combined {}: {} rows", label, rows.len());
    match preview(rows, PREVIEW_ROWS) {
        Ok(text) => debug!("{} preview:\n{}", label, text),
        Err(e) => debug!("Could not render {} preview: {}", label, e),
    }
}

/// Fetch spot rates and write the rate table; `None` when no rates were available
/// or the file could not be written.
pub async fn run_exchange_rate_pipeline<P: RateProvider + ?Sized>(
    provider: &P,
    output: &Path,
    date: NaiveDate,
) -> Option<usize> {
    let Some(rates) = provider.fetch_exchange_rates().await else {
        warn!("No exchange rates found");
        return None;
    };

    let rows = build_rate_rows(&rates, date);
    match write_rate_table(&rows, output) {
        Ok(()) => {
            info!("Finished generating the exchange rate table.");
            Some(rows.len())
        }
        Err(e) => {
            error!("Error writing exchange rate table: {}", e);
            None
        }
    }
}
