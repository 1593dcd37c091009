//! Common test utilities and helpers

pub mod database;
pub mod workbook;

use actuarial_etl::models::Config;

/// Config pointing every file at `dir`
pub fn test_config(dir: &std::path::Path, sheets: &[&str]) -> Config {
    let json = serde_json::json!({
        "db_url": format!("sqlite:{}", dir.join("etl.db").display()),
        "api_key": "test-key",
        "workbook_path": dir.join("losses.xlsx").display().to_string(),
        "sheets": sheets,
        "chart_output": dir.join("chart.xlsx").display().to_string(),
        "rates_output": dir.join("rates.xlsx").display().to_string(),
        "created_by": "integration-test",
    });
    Config::from_json(&json.to_string()).expect("Failed to build test config")
}

/// Logging utilities for tests
pub mod logging {
    use std::sync::Once;
    use tracing::{debug, info};

    static INIT: Once = Once::new();

    /// Initialize test logging
    pub fn init_test_logging() {
        INIT.call_once(|| {
            // Another test harness may already have installed a subscriber
            let _ = tracing::subscriber::set_global_default(
                tracing_subscriber::fmt()
                    .with_env_filter("actuarial_etl=debug,main=debug")
                    .with_test_writer()
                    .finish(),
            );
        });
    }

    /// Log test step
    pub fn log_test_step(step: &str) {
        info!("🧪 Test Step: {}", step);
    }

    /// Log test data
    pub fn log_test_data<T: std::fmt::Debug>(label: &str, data: &T) {
        debug!("📊 {}: {:?}", label, data);
    }
}
