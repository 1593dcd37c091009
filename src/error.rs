use thiserror::Error;

/// Errors raised by the extraction, load and export steps.
///
/// Pipelines log these at the step boundary and move on; nothing here is retried.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("Worksheet '{0}' not found in workbook")]
    MissingSheet(String),

    #[error("Unexpected layout in sheet '{sheet}' at row {row}, column {col}: {message}")]
    Layout {
        sheet: String,
        row: u32,
        col: u32,
        message: String,
    },

    #[error("Cannot join columns of different lengths in '{context}': {left} vs {right}")]
    ShapeMismatch {
        context: String,
        left: usize,
        right: usize,
    },

    #[error("Failed to write spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EtlError>;
