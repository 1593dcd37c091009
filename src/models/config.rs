use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{EtlError, Result};

/// Configuration for the application, read from a local JSON file.
///
/// `db_url` and `api_key` are required; everything else falls back to the
/// layout of the 2021 loss workbook and the public exchange-rate API.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_url: String,
    pub api_key: String,
    #[serde(default = "default_workbook_path")]
    pub workbook_path: String,
    #[serde(default = "default_sheets")]
    pub sheets: Vec<String>,
    #[serde(default)]
    pub chart_sheet: Option<String>,
    #[serde(default = "default_chart_output")]
    pub chart_output: String,
    #[serde(default = "default_company_name")]
    pub company_name: String,
    #[serde(default = "default_created_by")]
    pub created_by: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_rates_endpoint")]
    pub rates_endpoint: String,
    #[serde(default = "default_rates_output")]
    pub rates_output: String,
}

fn default_workbook_path() -> String {
    "Howden_CompanyXYZ_2021_Data.xlsx".to_string()
}

fn default_sheets() -> Vec<String> {
    vec!["GL-np".to_string(), "MA-np".to_string()]
}

fn default_chart_output() -> String {
    "booked_chart.xlsx".to_string()
}

fn default_company_name() -> String {
    "Howden Company".to_string()
}

fn default_created_by() -> String {
    "actuarial-etl".to_string()
}

fn default_currency() -> String {
    crate::models::DEFAULT_CURRENCY.to_string()
}

fn default_rates_endpoint() -> String {
    "https://v6.exchangerate-api.com/v6".to_string()
}

fn default_rates_output() -> String {
    "exchange_rate_table.xlsx".to_string()
}

impl Config {
    /// Load configuration from a JSON file, then apply `ETL_DB_URL` / `ETL_API_KEY`
    /// from the environment (or a `.env` file) when set.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_json(&content)?;
        config.apply_overrides(
            std::env::var("ETL_DB_URL").ok(),
            std::env::var("ETL_API_KEY").ok(),
        );

        info!("Configuration loaded from {}", path.display());
        debug!(
            "Workbook {} with sheets {:?}",
            config.workbook_path, config.sheets
        );
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| EtlError::Config(format!("invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, db_url: Option<String>, api_key: Option<String>) {
        if let Some(db_url) = db_url.filter(|v| !v.is_empty()) {
            self.db_url = db_url;
        }
        if let Some(api_key) = api_key.filter(|v| !v.is_empty()) {
            self.api_key = api_key;
        }
    }

    /// Sheet used for the booked-data chart; the first configured sheet by default
    pub fn chart_sheet(&self) -> Option<&str> {
        self.chart_sheet
            .as_deref()
            .or_else(|| self.sheets.first().map(String::as_str))
    }

    fn validate(&self) -> Result<()> {
        if self.db_url.trim().is_empty() {
            return Err(EtlError::Config("db_url must not be empty".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(EtlError::Config("api_key must not be empty".to_string()));
        }
        Ok(())
    }
}
