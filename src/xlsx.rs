//! Spreadsheet I/O at the edges of the engine.
//!
//! Reading turns any workbook calamine understands into a [`RawWorkbook`] of cell
//! strings; writing lays the report tables out one per sheet behind a summary sheet.
//! Beyond a bold header row no styling is applied.

use crate::error::{AnalyticsError, Result};
use crate::raw::{RawSheet, RawWorkbook};
use crate::report::{AnalysisResult, Cell};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::NaiveDate;
use log::debug;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

fn workbook_error(e: impl std::fmt::Display) -> AnalyticsError {
    AnalyticsError::WorkbookError(e.to_string())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
    }
}

/// Rows of a used range, padded so row and column positions match the sheet.
fn range_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![String::new(); col_offset];
        cells.extend(row.iter().map(cell_text));
        rows.push(cells);
    }
    rows
}

fn collect_sheets<RS: Read + Seek>(mut workbook: Sheets<RS>) -> Result<RawWorkbook> {
    let mut sheets = Vec::new();
    for name in workbook.sheet_names().to_vec() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| workbook_error(format!("Failed to read sheet '{}': {}", name, e)))?;
        sheets.push(RawSheet::new(name, range_rows(&range)));
    }
    debug!("Read workbook with {} sheets", sheets.len());
    Ok(RawWorkbook::new(sheets))
}

/// Opens an xlsx/xls/xlsb/ods file.
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<RawWorkbook> {
    let path = path.as_ref();
    let workbook = open_workbook_auto(path).map_err(|e| {
        workbook_error(format!("Failed to open '{}': {}", path.display(), e))
    })?;
    collect_sheets(workbook)
}

/// Reads an uploaded workbook held in memory.
pub fn read_workbook_from_bytes(bytes: Vec<u8>) -> Result<RawWorkbook> {
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(workbook_error)?;
    collect_sheets(workbook)
}

/// `Sales_Master_<date>.xlsx`
pub fn report_file_name(report_date: Option<NaiveDate>) -> String {
    match report_date {
        Some(date) => format!("Sales_Master_{}.xlsx", date.format("%Y-%m-%d")),
        None => "Sales_Master.xlsx".to_string(),
    }
}

fn build_workbook(result: &AnalysisResult) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let summary = workbook.add_worksheet();
    summary.set_name("Summary")?;
    for (idx, line) in result.summary.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        summary.write_string(idx as u32, 0, line)?;
    }

    for table in result.tables() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&table.name)?;

        for (col, name) in table.columns.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, name, &header)?;
        }

        for (idx, row) in table.rows.iter().enumerate() {
            let row_num = idx as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Text(text) => sheet.write_string(row_num, col, text)?,
                    Cell::Number(value) => sheet.write_number(row_num, col, *value)?,
                    Cell::Date(date) => {
                        sheet.write_string(row_num, col, date.format("%Y-%m-%d").to_string())?
                    }
                };
            }
        }
    }

    Ok(workbook)
}

/// Renders the summary and every report table as xlsx bytes.
pub fn render_report(result: &AnalysisResult) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(result).map_err(workbook_error)?;
    workbook.save_to_buffer().map_err(workbook_error)
}

pub fn write_report<P: AsRef<Path>>(result: &AnalysisResult, path: P) -> Result<()> {
    let mut workbook = build_workbook(result).map_err(workbook_error)?;
    workbook.save(path.as_ref()).map_err(workbook_error)
}
