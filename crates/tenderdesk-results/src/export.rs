//! Tabular export of prediction lists

use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tenderdesk_core::{Error, PredictionRecord, Result};
use tracing::info;

/// Column header of the CSV export. Downstream spreadsheets key on these
/// names, so they must not change.
pub const EXPORT_HEADER: [&str; 5] = ["案件ID", "案件名", "ランク", "勝率", "推奨度"];

/// One exported prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub tender_id: String,
    /// `project_name`, else `title`, else empty
    pub name: String,
    pub rank: String,
    /// Rounded percentage, e.g. `62%`
    pub win_rate: String,
    /// A=5 … E=1, unknown ranks 0
    pub score: u8,
}

impl ExportRow {
    pub fn from_record(record: &PredictionRecord) -> Self {
        Self {
            tender_id: record.tender_id.clone(),
            name: record.display_name().unwrap_or_default().to_string(),
            rank: record.rank.as_str().to_string(),
            win_rate: format!("{}%", win_rate_percent(record.win_probability)),
            score: record.rank.score(),
        }
    }

    fn fields(&self) -> [String; 5] {
        [
            self.tender_id.clone(),
            self.name.clone(),
            self.rank.clone(),
            self.win_rate.clone(),
            self.score.to_string(),
        ]
    }
}

/// `round(p × 100)`, halves rounded up
pub fn win_rate_percent(probability: f64) -> u32 {
    (probability * 100.0).round().max(0.0) as u32
}

/// Header row followed by one row per record, in input order
pub fn to_export_rows(records: &[PredictionRecord]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(EXPORT_HEADER.iter().map(|h| h.to_string()).collect());
    rows.extend(
        records
            .iter()
            .map(|record| ExportRow::from_record(record).fields().to_vec()),
    );
    rows
}

/// Render the export rows as CSV, quoting fields only where required
pub fn to_csv(records: &[PredictionRecord]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in to_export_rows(records) {
        writer
            .write_record(&row)
            .map_err(|e| Error::internal(format!("CSV write failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::internal(format!("CSV is not UTF-8: {}", e)))
}

/// Pretty-printed JSON array of export rows
pub fn to_json(records: &[PredictionRecord]) -> Result<String> {
    let rows: Vec<ExportRow> = records.iter().map(ExportRow::from_record).collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    /// Pretty-printed JSON array
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Render records in this format
    pub fn render(&self, records: &[PredictionRecord]) -> Result<String> {
        match self {
            Self::Csv => to_csv(records),
            Self::Json => to_json(records),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(Error::validation(format!(
                "unknown export format '{}' (expected csv or json)",
                other
            ))),
        }
    }
}

/// Default download name, e.g. `bulk_prediction_2024-05-01.csv`
pub fn export_file_name(date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "bulk_prediction_{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Write records to `output_path`, returning how many were exported
pub fn export_to_file(
    records: &[PredictionRecord],
    output_path: &Path,
    format: ExportFormat,
) -> Result<usize> {
    let content = format.render(records)?;

    let mut file = File::create(output_path)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;

    info!(
        path = %output_path.display(),
        count = records.len(),
        format = format.extension(),
        "exported predictions"
    );
    Ok(records.len())
}
