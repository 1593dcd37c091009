use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::{debug, error, info};

use crate::error::Result;
use crate::models::{BookedRow, LossStatRow};

/// Destination tables, each fully replaced on every load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactTable {
    LossStatistics,
    BookedData,
}

impl FactTable {
    pub fn name(&self) -> &'static str {
        match self {
            FactTable::LossStatistics => "factstatistical",
            FactTable::BookedData => "factdata",
        }
    }
}

const CREATE_LOSS_STATISTICS: &str = r#"
    CREATE TABLE factstatistical (
        "Year" INTEGER NOT NULL,
        "DevelopmentMonth" INTEGER NOT NULL,
        "LossIncurredRatio" REAL,
        "LineOfBusiness" TEXT NOT NULL,
        "Currency" TEXT NOT NULL,
        "CompanyName" TEXT NOT NULL,
        "DWCreatedDate" TEXT NOT NULL,
        "DWCreatedBy" TEXT NOT NULL
    )
"#;

const CREATE_BOOKED_DATA: &str = r#"
    CREATE TABLE factdata (
        "Year" INTEGER NOT NULL,
        "GrossWrittenPremium" REAL,
        "EarnedPremium" REAL,
        "PaidLosses" REAL,
        "CaseReserves" REAL,
        "IBNR" REAL,
        "UltimateLossRatio" REAL,
        "LineOfBusiness" TEXT NOT NULL,
        "DWCreatedDate" TEXT NOT NULL,
        "DWCreatedBy" TEXT NOT NULL
    )
"#;

/// Relational sink for the loss tables.
///
/// Each load drops and recreates its table inside one transaction, so loading
/// the same rows twice leaves the same table state.
#[derive(Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// Connect to a SQLite database, creating the file if missing
    pub async fn connect(database_url: &str) -> Result<Self> {
        // Ensure the connection string is properly formatted for SQLite
        let connection_string = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite:{}", database_url)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        info!("Connected to the database: {}", connection_string);
        Ok(Self { pool })
    }

    /// Execute a single statement, returning the number of affected rows
    pub async fn execute_statement(&self, statement: &str) -> Result<u64> {
        let result = sqlx::query(statement).execute(&self.pool).await?;
        debug!("Executed the statement: {}", statement.trim());
        Ok(result.rows_affected())
    }

    /// Replace `factstatistical` with the given rows
    pub async fn replace_loss_statistics(&self, rows: &[LossStatRow]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS factstatistical")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_LOSS_STATISTICS).execute(&mut *tx).await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO factstatistical (
                    "Year", "DevelopmentMonth", "LossIncurredRatio", "LineOfBusiness",
                    "Currency", "CompanyName", "DWCreatedDate", "DWCreatedBy"
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(row.year)
            .bind(row.development_month as i64)
            .bind(row.loss_incurred_ratio)
            .bind(&row.line_of_business)
            .bind(&row.currency)
            .bind(&row.company_name)
            .bind(&row.created_date)
            .bind(&row.created_by)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Loaded {} rows into {}", rows.len(), FactTable::LossStatistics.name());
        Ok(rows.len())
    }

    /// Replace `factdata` with the given rows
    pub async fn replace_booked_data(&self, rows: &[BookedRow]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS factdata")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_BOOKED_DATA).execute(&mut *tx).await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO factdata (
                    "Year", "GrossWrittenPremium", "EarnedPremium", "PaidLosses",
                    "CaseReserves", "IBNR", "UltimateLossRatio", "LineOfBusiness",
                    "DWCreatedDate", "DWCreatedBy"
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(row.year)
            .bind(row.gross_written_premium)
            .bind(row.earned_premium)
            .bind(row.paid_losses)
            .bind(row.case_reserves)
            .bind(row.ibnr)
            .bind(row.ultimate_loss_ratio)
            .bind(&row.line_of_business)
            .bind(&row.created_date)
            .bind(&row.created_by)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Loaded {} rows into {}", rows.len(), FactTable::BookedData.name());
        Ok(rows.len())
    }

    /// Number of rows in one of the fact tables
    pub async fn row_count(&self, table: FactTable) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table.name()))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn fetch_loss_statistics(&self) -> Result<Vec<LossStatRow>> {
        let rows = sqlx::query(
            r#"
            SELECT "Year", "DevelopmentMonth", "LossIncurredRatio", "LineOfBusiness",
                   "Currency", "CompanyName", "DWCreatedDate", "DWCreatedBy"
            FROM factstatistical
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LossStatRow {
                year: r.get::<i32, _>("Year"),
                development_month: r.get::<i64, _>("DevelopmentMonth") as u32,
                loss_incurred_ratio: r.get::<Option<f64>, _>("LossIncurredRatio"),
                line_of_business: r.get::<String, _>("LineOfBusiness"),
                currency: r.get::<String, _>("Currency"),
                company_name: r.get::<String, _>("CompanyName"),
                created_date: r.get::<String, _>("DWCreatedDate"),
                created_by: r.get::<String, _>("DWCreatedBy"),
            })
            .collect())
    }

    pub async fn fetch_booked_data(&self) -> Result<Vec<BookedRow>> {
        let rows = sqlx::query(
            r#"
            SELECT "Year", "GrossWrittenPremium", "EarnedPremium", "PaidLosses",
                   "CaseReserves", "IBNR", "UltimateLossRatio", "LineOfBusiness",
                   "DWCreatedDate", "DWCreatedBy"
            FROM factdata
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| BookedRow {
                year: r.get::<i32, _>("Year"),
                gross_written_premium: r.get::<Option<f64>, _>("GrossWrittenPremium"),
                earned_premium: r.get::<Option<f64>, _>("EarnedPremium"),
                paid_losses: r.get::<Option<f64>, _>("PaidLosses"),
                case_reserves: r.get::<Option<f64>, _>("CaseReserves"),
                ibnr: r.get::<Option<f64>, _>("IBNR"),
                ultimate_loss_ratio: r.get::<Option<f64>, _>("UltimateLossRatio"),
                line_of_business: r.get::<String, _>("LineOfBusiness"),
                created_date: r.get::<String, _>("DWCreatedDate"),
                created_by: r.get::<String, _>("DWCreatedBy"),
            })
            .collect())
    }

    /// Close the pool; errors are logged rather than returned
    pub async fn close(&self) {
        self.pool.close().await;
        if self.pool.is_closed() {
            info!("Closed the connection to the database.");
        } else {
            error!("Error closing the connection to the database");
        }
    }
}
