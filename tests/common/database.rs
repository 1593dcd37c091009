//! Test database utilities using the DatabaseManager

use std::path::Path;

use actuarial_etl::database::DatabaseManager;
use anyhow::Result;

/// Open (creating if needed) a SQLite database inside `dir`
pub async fn init_test_database(dir: &Path) -> Result<DatabaseManager> {
    let url = format!("sqlite:{}", dir.join("etl.db").display());
    Ok(DatabaseManager::connect(&url).await?)
}
