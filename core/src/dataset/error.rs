//! Error types for dataset loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a dataset load. Malformed rows never do; they are
/// dropped and counted in the `LoadReport`.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset file {path}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to memory map file {path}")]
    MemoryMap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV records")]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("dataset has no header row")]
    EmptyInput,

    #[error("required column '{name}' missing from header")]
    MissingColumn { name: &'static str },
}
