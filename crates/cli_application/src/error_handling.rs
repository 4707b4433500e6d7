//! Declares the error handling types for the command-line tool.
//!
//! This module defines the custom `CliError` enum, which encapsulates
//! all possible failure conditions that can occur within the tool, and
//! the logging bootstrap shared by both operating modes. Centralizing
//! the error definitions here gives every command-line operation one
//! consistent error-handling mechanism.

use std::io;

use ecm2::Ecm2Error;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Represents all possible errors that can occur in the tool.
///
/// This enum uses `thiserror` to derive the `Error` trait, providing a
/// centralized and descriptive way to handle the failure modes, from
/// I/O issues to invalid arguments and malformed input files.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O Error")]
    Io(#[from] io::Error),

    #[error("Provided path does not exist. {0}")]
    InvalidPath(String),

    #[error("File exists. {0}")]
    FileExistsError(String),

    #[error("Conflicting flags. {0}")]
    ConflictingFlagsError(String),

    #[error("The input file is not a disc image or is damaged. {0}")]
    InvalidImage(String),

    #[error("The input file is not a valid encoded image or is damaged. {0}")]
    InvalidContainer(String),

    #[error("Codec error: {0}")]
    Codec(#[from] Ecm2Error),

    #[error("An internal logic error occurred: {0}")]
    InternalError(String),
}

/// Initializes the global tracing subscriber.
///
/// The default level is `info`. Verbose mode lowers the threshold to
/// `debug`, quiet mode raises it to `error`, and an explicit `RUST_LOG`
/// environment variable overrides both.
pub fn initiate_logging(verbose: bool, quiet: bool) -> Result<(), CliError> {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| CliError::InternalError(e.to_string()))?;

    Ok(())
}
