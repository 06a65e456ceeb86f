use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 單一欄位驗證失敗：哪一列、哪個欄位、為什麼
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub row: Option<usize>,
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            row: None,
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "value is required")
    }

    /// 由 Reader 補上 1-based 資料列號
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "row {}, field '{}': {}", row, self.field, self.reason),
            None => write!(f, "field '{}': {}", self.field, self.reason),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Schema error in {}: {message}", path.display())]
    Schema { path: PathBuf, message: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Malformed CSV in {} at row {row}: {source}", path.display())]
    Csv {
        path: PathBuf,
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("Total for {} exceeds the largest representable amount", path.display())]
    TotalOverflow { path: PathBuf },

    #[error("Output file {} already exists", path.display())]
    FileExists { path: PathBuf },

    #[error("Input file {} does not exist", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Output,
    System,
    Configuration,
}

impl ConversionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Schema { .. }
            | Self::Validation(_)
            | Self::Csv { .. }
            | Self::TotalOverflow { .. } => ErrorCategory::Input,
            Self::FileExists { .. } => ErrorCategory::Output,
            Self::InputNotFound { .. } | Self::FileRead { .. } | Self::FileWrite { .. } => {
                ErrorCategory::System
            }
            Self::Config { .. } => ErrorCategory::Configuration,
        }
    }

    /// CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input => 1,
            ErrorCategory::Output => 2,
            ErrorCategory::System => 3,
            ErrorCategory::Configuration => 4,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::Schema { .. } => {
                "Export the tow tickets again and make sure the header row contains every required column"
            }
            Self::Validation(_) | Self::Csv { .. } => {
                "Correct the reported row and field in the tow ticket file, then re-run"
            }
            Self::TotalOverflow { .. } => {
                "Check the fee amounts and glider hourly rates for implausibly large values"
            }
            Self::FileExists { .. } => "Pass --overwrite to replace the existing output file",
            Self::InputNotFound { .. } => "Check the path to the tow ticket CSV file",
            Self::FileRead { .. } | Self::FileWrite { .. } => {
                "Check file permissions and available disk space"
            }
            Self::Config { .. } => "Check the rates file and command-line options",
        }
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
