use crate::error::{AnalyticsError, InputKind, Result};
use crate::raw::{RawSheet, RawWorkbook};
use log::debug;
use std::collections::HashSet;

/// Where a header row was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLocation {
    pub sheet: String,
    pub sheet_index: usize,
    pub header_row: usize,
}

/// Finds the first row whose trimmed cells contain every required column name.
///
/// Only the first `window` rows are considered. Matching is exact after trimming,
/// no case folding.
pub fn locate_header<S: AsRef<str>>(
    rows: &[Vec<S>],
    required: &[String],
    window: usize,
) -> Option<usize> {
    rows.iter().take(window).position(|row| {
        let cells: HashSet<&str> = row.iter().map(|cell| cell.as_ref().trim()).collect();
        required.iter().all(|name| cells.contains(name.as_str()))
    })
}

pub struct SchemaLocator<'a> {
    input: InputKind,
    required: &'a [String],
    window: usize,
    preferred_sheet: Option<&'a str>,
}

impl<'a> SchemaLocator<'a> {
    pub fn new(input: InputKind, required: &'a [String], window: usize) -> Self {
        Self {
            input,
            required,
            window,
            preferred_sheet: None,
        }
    }

    pub fn with_preferred_sheet(mut self, sheet: Option<&'a str>) -> Self {
        self.preferred_sheet = sheet;
        self
    }

    /// Scans the preferred sheet (if present) and then every sheet in declaration order,
    /// stopping at the first match. A workbook without sheets fails the same way as one
    /// without a matching header.
    pub fn locate(&self, workbook: &RawWorkbook) -> Result<HeaderLocation> {
        let mut scanned = Vec::new();

        for (sheet_index, sheet) in self.scan_order(workbook) {
            scanned.push(sheet.name.clone());

            if let Some(header_row) = locate_header(&sheet.rows, self.required, self.window) {
                debug!(
                    "Located {} header on sheet '{}' at row {}",
                    self.input, sheet.name, header_row
                );
                return Ok(HeaderLocation {
                    sheet: sheet.name.clone(),
                    sheet_index,
                    header_row,
                });
            }
        }

        Err(AnalyticsError::SchemaNotFound {
            input: self.input,
            required: self.required.to_vec(),
            scanned_sheets: scanned,
            window: self.window,
        })
    }

    fn scan_order<'w>(&self, workbook: &'w RawWorkbook) -> Vec<(usize, &'w RawSheet)> {
        let preferred = self
            .preferred_sheet
            .and_then(|name| workbook.sheets.iter().position(|s| s.name == name));

        let mut order = Vec::with_capacity(workbook.sheets.len());
        if let Some(idx) = preferred {
            order.push((idx, &workbook.sheets[idx]));
        }
        for (idx, sheet) in workbook.sheets.iter().enumerate() {
            if Some(idx) != preferred {
                order.push((idx, sheet));
            }
        }
        order
    }
}
