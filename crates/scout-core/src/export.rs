//! Download encodings for collected job records.

use std::fmt;
use std::str::FromStr;

use rust_xlsxwriter::{Format, Workbook};

use crate::error::AppError;
use crate::models::JobRecord;

pub const COLUMNS: [&str; 4] = ["Title", "Company", "Location", "Link"];
pub const SHEET_NAME: &str = "Jobs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
    Json,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "indeed-jobs.csv",
            ExportFormat::Excel => "indeed-jobs.xlsx",
            ExportFormat::Json => "indeed-jobs.json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Json => "application/json",
        }
    }

    pub fn render(self, records: &[JobRecord]) -> Result<Vec<u8>, AppError> {
        match self {
            ExportFormat::Csv => to_csv(records),
            ExportFormat::Excel => to_xlsx(records),
            ExportFormat::Json => to_json(records),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
            ExportFormat::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            other => Err(AppError::ValidationError(format!(
                "Unknown export format '{other}': expected csv, excel or json"
            ))),
        }
    }
}

/// Header row plus one row per record. Fields are quoted as needed.
pub fn to_csv(records: &[JobRecord]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(COLUMNS).map_err(csv_error)?;
    for record in records {
        writer.write_record(record.fields()).map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::ExportError(format!("CSV flush failed: {e}")))
}

/// Single worksheet named `Jobs` with a bold header row.
pub fn to_xlsx(records: &[JobRecord]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(xlsx_error)?;

    for (col, name) in (0u16..).zip(COLUMNS) {
        sheet
            .write_string_with_format(0, col, name, &header)
            .map_err(xlsx_error)?;
    }
    for (row, record) in (1u32..).zip(records) {
        for (col, value) in (0u16..).zip(record.fields()) {
            sheet.write_string(row, col, value).map_err(xlsx_error)?;
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

/// Pretty-printed array; non-ASCII text is written as-is.
pub fn to_json(records: &[JobRecord]) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec_pretty(records)
        .map_err(|e| AppError::ExportError(format!("JSON encoding failed: {e}")))
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::ExportError(format!("CSV encoding failed: {e}"))
}

fn xlsx_error(e: rust_xlsxwriter::XlsxError) -> AppError {
    AppError::ExportError(format!("XLSX encoding failed: {e}"))
}
