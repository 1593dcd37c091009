pub mod api;
pub mod chart;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod rate_table;
pub mod transform;
pub mod workbook;

pub use error::{EtlError, Result};
