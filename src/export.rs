use std::{io::Write, path::Path};

use anyhow::Context;
use log::{info, warn};

use crate::EventRecord;

pub const CSV_HEADER: [&str; 4] = ["title", "location", "date", "time"];
const SAMPLE_ROWS: usize = 5;

/// Writes `records` as CSV in the order given. An empty slice still produces
/// the header row.
pub fn write_csv(path: &Path, records: &[EventRecord]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_records(file, records).with_context(|| format!("failed to write {}", path.display()))?;

    if records.is_empty() {
        warn!("No data to save, wrote header only to {}", path.display());
        return Ok(());
    }
    info!("Data saved to {}", path.display());
    for record in records.iter().take(SAMPLE_ROWS) {
        info!(
            "Sample data: {} | {} | {} | {}",
            record.title, record.location, record.date, record.time
        );
    }
    Ok(())
}

pub fn write_records<W: Write>(writer: W, records: &[EventRecord]) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
