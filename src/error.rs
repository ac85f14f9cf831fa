//! # Error Taxonomy
//!
//! Fatal errors raised by the engine. Data-quality problems are deliberately
//! not represented here: they are logged and the offending row is zero-scored
//! or excluded, never turned into a fabricated value.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal engine errors. The engine is deterministic and stateless, so there
/// is no retry path anywhere; every variant aborts the run before partial
/// output is written.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required column is absent from an input table.
    #[error("{table} table missing required column '{column}'")]
    Schema {
        table: &'static str,
        column: String,
    },

    /// A cell could not be parsed as its column's declared type.
    #[error("{table} table has an unparseable value in column '{column}'")]
    Parse {
        table: &'static str,
        column: String,
    },

    /// An input path does not exist.
    #[error("input table not found: {0}")]
    MissingFile(PathBuf),

    /// The file suffix is not a recognized table format.
    #[error("unsupported table format '{0}' (use .csv or .tsv)")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Configuration extraction failed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<figment::Error> for EngineError {
    fn from(e: figment::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
