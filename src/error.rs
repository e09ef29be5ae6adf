use std::fmt;
use thiserror::Error;

/// Which of the two supported exports an error relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Transactions,
    Inventory,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Transactions => write!(f, "transactions"),
            InputKind::Inventory => write!(f, "inventory"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("No header containing {required:?} found in the first {window} rows of {input} sheets {scanned_sheets:?}")]
    SchemaNotFound {
        input: InputKind,
        required: Vec<String>,
        scanned_sheets: Vec<String>,
        window: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Workbook error: {0}")]
    WorkbookError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
