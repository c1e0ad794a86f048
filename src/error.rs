//! Fatal error taxonomy for the pipeline.
//!
//! Per-row defects (unparseable numbers or timestamps) are never errors; they
//! are coerced to `None` at the parse site and logged. Everything in here
//! aborts the run before any output file is written.

use chrono::NaiveDateTime;
use std::path::PathBuf;
use thiserror::Error;

/// Underlying cause of an I/O-level failure (filesystem, decoding, CSV).
pub type IoCause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required source file does not exist.
    #[error("input file not found: {path}")]
    MissingInput { path: PathBuf },

    /// The file exists but could not be read or decoded as UTF-8.
    #[error("failed to read {path}: {source}")]
    UnexpectedIo {
        path: PathBuf,
        #[source]
        source: IoCause,
    },

    /// A column the pipeline depends on is absent from the repaired header.
    #[error("column {name:?} missing from {path}")]
    MissingColumn { path: PathBuf, name: String },

    /// Two weather rows normalized to the same hour under the `Fail` policy.
    #[error("duplicate weather timestamp {key} (use --on-duplicate first to keep the first row)")]
    DuplicateKey { key: NaiveDateTime },
}

pub type Result<T> = std::result::Result<T, Error>;
