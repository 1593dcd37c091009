use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub mod config;
pub use config::Config;

/// Currency tagged onto every melted loss-ratio row
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Base currency of the exchange-rate table
pub const BASE_CURRENCY: &str = "USD";

/// Currencies kept from the exchange-rate API response, in output order
pub const TARGET_CURRENCIES: [&str; 10] = [
    "AUD", "CAD", "CHF", "CNY", "EUR", "GBP", "HKD", "JPY", "NZD", "USD",
];

pub const SPOT_RATE: &str = "Spot rate";

/// Underwriting year from column A of a worksheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
}

impl YearRecord {
    pub fn new(year: i32) -> Self {
        Self { year }
    }
}

/// Loss incurred ratios by year (rows) and development interval (columns)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DevelopmentMonthGrid {
    pub development_months: Vec<u32>,
    pub ratios: Vec<Vec<Option<f64>>>,
}

impl DevelopmentMonthGrid {
    /// Build a grid whose development months are 12, 24, ... one per column.
    pub fn new(ratios: Vec<Vec<Option<f64>>>, columns: usize) -> Self {
        let development_months = (0..columns).map(development_month).collect();
        Self {
            development_months,
            ratios,
        }
    }

    pub fn ratio(&self, year_index: usize, column: usize) -> Option<f64> {
        self.ratios
            .get(year_index)
            .and_then(|row| row.get(column))
            .copied()
            .flatten()
    }

    /// Ordered (development month, ratio) pairs for one year row
    pub fn row_pairs(&self, year_index: usize) -> Vec<(u32, Option<f64>)> {
        self.development_months
            .iter()
            .enumerate()
            .map(|(column, month)| (*month, self.ratio(year_index, column)))
            .collect()
    }
}

/// Development month for a zero-based interval column
pub fn development_month(column: usize) -> u32 {
    (column as u32 + 1) * 12
}

/// One row of the booked block (columns P:S)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BookedFigures {
    pub earned_premium: Option<f64>,
    pub paid_losses: Option<f64>,
    pub case_reserves: Option<f64>,
    pub ibnr: Option<f64>,
}

/// Everything read from one worksheet tab
#[derive(Debug, Clone, PartialEq)]
pub struct SheetBlock {
    pub sheet_name: String,
    pub years: Vec<YearRecord>,
    pub grid: DevelopmentMonthGrid,
    pub gross_written_premium: Vec<Option<f64>>,
    pub booked: Vec<BookedFigures>,
}

/// Audit columns stamped when a sheet is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp {
    pub created_date: String,
    pub created_by: String,
}

impl RunStamp {
    pub fn now(created_by: &str) -> Self {
        Self {
            created_date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            created_by: created_by.to_string(),
        }
    }
}

/// Constant columns applied to every melted row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTags {
    pub line_of_business: String,
    pub currency: String,
    pub company_name: String,
    pub stamp: RunStamp,
}

/// Row of the `factstatistical` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossStatRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "DevelopmentMonth")]
    pub development_month: u32,
    #[serde(rename = "LossIncurredRatio")]
    pub loss_incurred_ratio: Option<f64>,
    #[serde(rename = "LineOfBusiness")]
    pub line_of_business: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "CompanyName")]
    pub company_name: String,
    #[serde(rename = "DWCreatedDate")]
    pub created_date: String,
    #[serde(rename = "DWCreatedBy")]
    pub created_by: String,
}

/// Row of the `factdata` table.
///
/// `ultimate_loss_ratio` keeps its historical name but holds the monetary sum
/// paid losses + case reserves + IBNR; it is not divided by premium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "GrossWrittenPremium")]
    pub gross_written_premium: Option<f64>,
    #[serde(rename = "EarnedPremium")]
    pub earned_premium: Option<f64>,
    #[serde(rename = "PaidLosses")]
    pub paid_losses: Option<f64>,
    #[serde(rename = "CaseReserves")]
    pub case_reserves: Option<f64>,
    #[serde(rename = "IBNR")]
    pub ibnr: Option<f64>,
    #[serde(rename = "UltimateLossRatio")]
    pub ultimate_loss_ratio: Option<f64>,
    #[serde(rename = "LineOfBusiness")]
    pub line_of_business: String,
    #[serde(rename = "DWCreatedDate")]
    pub created_date: String,
    #[serde(rename = "DWCreatedBy")]
    pub created_by: String,
}

/// Row of the exchange-rate output sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateRow {
    #[serde(rename = "Rate Type")]
    pub rate_type: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Currency_From")]
    pub currency_from: String,
    #[serde(rename = "Currency_From_Value")]
    pub currency_from_value: u32,
    #[serde(rename = "Currency_To")]
    pub currency_to: String,
    #[serde(rename = "Currency_To_Value")]
    pub currency_to_value: f64,
}
