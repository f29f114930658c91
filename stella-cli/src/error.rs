//! This module defines all the errors that can occur while executing stella-cli.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that occur during execution of Stella's CLI app
#[derive(Error, Debug)]
pub enum CliError {
    /// Error if an export would overwrite an existing file
    #[error("export file {filename} already exists; use --overwrite-results to replace it")]
    ExportExists {
        /// Name of the file that already exists
        filename: PathBuf,
    },
    /// Error resulting from io operations
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// Error originating from stella
    #[error(transparent)]
    StellaError(#[from] stella::error::Error),
}
