use anyhow::{Context, Result};

use super::dataset::Dataset;
use super::model::{CellValue, Table};

pub const CSV_MIME: &str = "text/csv";

/// A ready-to-save CSV export of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvDownload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Serialise the table as UTF-8 CSV with a header row, in column order.
pub fn to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.columns().iter().map(|c| c.name.as_str()))
        .context("writing CSV header")?;

    for row in 0..table.num_rows() {
        writer
            .write_record(table.columns().iter().map(|c| csv_field(&c.values[row])))
            .with_context(|| format!("writing CSV row {row}"))?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV output: {}", e.error()))
}

/// Text of one cell as written to CSV.
///
/// Floats use the shortest round-trip form and always keep a decimal point
/// or exponent, so `5.0` reloads as a float rather than an integer.
fn csv_field(value: &CellValue) -> String {
    match value {
        CellValue::Integer(i) => i.to_string(),
        CellValue::Float(v) => format!("{v:?}"),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Text(s) => s.clone(),
        CellValue::Null => String::new(),
    }
}

/// Build the download payload for the dataset.
pub fn csv_download(dataset: &Dataset) -> Result<CsvDownload> {
    let bytes = to_csv(&dataset.table)?;
    Ok(CsvDownload {
        file_name: dataset.download_name(),
        mime: CSV_MIME,
        bytes,
    })
}
