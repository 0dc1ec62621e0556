use std::path::Path;

use chrono::Local;
use csv::Writer;
use tracing::info;

use crate::error::ExportError;
use crate::models::FlatRow;

/// `<prefix>_<YYYYmmdd_HHMMSS>.csv`
pub fn timestamped_filename(prefix: &str) -> String {
    format!("{}_{}.csv", prefix, Local::now().format("%Y%m%d_%H%M%S"))
}

pub fn write_csv(rows: &[FlatRow], path: &Path) -> Result<(), ExportError> {
    let mut writer = Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
