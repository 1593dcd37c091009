use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;

/// Serialize rows as CSV with the table column names as the header
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_csv(file, rows)?;
    info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// First `limit` rows as CSV text, for log previews
pub fn preview<T: Serialize>(rows: &[T], limit: usize) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, &rows[..rows.len().min(limit)])?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
