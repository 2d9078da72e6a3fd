use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a dataset load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data directory not found, created {}; place the word-frequency and industry files there and reload", dir.display())]
    DataDirMissing { dir: PathBuf },
    #[error("word-frequency file not found: {}", path.display())]
    PrimaryMissing { path: PathBuf },
    #[error("unsupported file extension '.{extension}' for {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },
    #[error("{} contains no worksheet or header row", path.display())]
    EmptySheet { path: PathBuf },
    #[error("{}, column {column}: unsupported column type {data_type}", path.display())]
    UnsupportedColumnType {
        path: PathBuf,
        column: String,
        data_type: String,
    },
    #[error("{} is missing required column {column}", path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("{}, row {row}, column {column}: expected {expected}, found '{value}'", path.display())]
    InvalidCell {
        path: PathBuf,
        row: usize,
        column: String,
        expected: &'static str,
        value: String,
    },
    #[error(transparent)]
    Spreadsheet(#[from] calamine::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LoadError {
    /// Name of the error category, shown next to the message.
    pub fn category(&self) -> &'static str {
        match self {
            LoadError::DataDirMissing { .. } => "DataDirMissing",
            LoadError::PrimaryMissing { .. } => "PrimaryMissing",
            LoadError::UnsupportedFormat { .. } => "UnsupportedFormat",
            LoadError::EmptySheet { .. } => "EmptySheet",
            LoadError::UnsupportedColumnType { .. } => "UnsupportedColumnType",
            LoadError::MissingColumn { .. } => "MissingColumn",
            LoadError::InvalidCell { .. } => "InvalidCell",
            LoadError::Spreadsheet(_) => "Spreadsheet",
            LoadError::Csv(_) => "Csv",
            LoadError::Parquet(_) => "Parquet",
            LoadError::Arrow(_) => "Arrow",
            LoadError::Io(_) => "Io",
        }
    }

    /// Missing directory or primary file: the caller shows an empty state
    /// rather than a failure.
    pub fn is_configuration_absence(&self) -> bool {
        matches!(
            self,
            LoadError::DataDirMissing { .. } | LoadError::PrimaryMissing { .. }
        )
    }
}
