//! Manages command-line argument parsing and validation.
//!
//! This module defines the command-line interface for the tool using
//! the `clap` crate. It includes the `Args` struct, which specifies all
//! available options and flags, and the validation logic to ensure the
//! user input is sensible before any file is touched.

use std::path::PathBuf;

use clap::Parser;

use crate::error_handling::CliError;

const CUSTOM_HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{all-args}{after-help}
";

/// Defines the command-line arguments for the tool.
#[derive(Parser, Debug)]
#[command(name = "ecmtool", version, about, long_about = None,
    help_template = CUSTOM_HELP_TEMPLATE)]
pub struct Args {
    //Primary group of arguments.

    ///Path to the disc image to encode, or to the encoded file when
    ///decoding.
    #[arg(short, long, help_heading = "Primary Options")]
    pub input: PathBuf,

    ///Path for the output file.
    #[arg(short, long, help_heading = "Primary Options")]
    pub output: PathBuf,

    ///Decode an encoded file back into a disc image. Without this flag
    ///the input is encoded.
    #[arg(short, long, help_heading = "Primary Options",
        default_value_t = false)]
    pub decode: bool,

    //Behavior and Output Control

    ///Forces the system to overwrite the output file if it exists.
    #[arg(short, long, help_heading = "Behavior and Output Control",
        default_value_t = false)]
    pub force: bool,

    ///Activates verbose output for detailed diagnostic information.
    #[arg(short, long, help_heading = "Behavior and Output Control",
        default_value_t = false)]
    pub verbose: bool,

    ///Activates quiet mode, suppressing all non-essential output.
    #[arg(short, long, help_heading = "Behavior and Output Control",
        default_value_t = false)]
    pub quiet: bool,
}

/// Validates the command-line arguments provided by the user.
///
/// # Errors
///
/// Returns an error in the following cases:
/// - The input path does not point to an existing file.
/// - The output file exists and `--force` was not given.
/// - `--verbose` and `--quiet` are combined.
pub fn validate_args(args: &Args) -> Result<(), CliError> {
    if !args.input.is_file() {
        return Err(CliError::InvalidPath(
            args.input.display().to_string(),
        ));
    }

    if args.output.exists() && !args.force {
        return Err(CliError::FileExistsError(format!(
            "{} already exists, pass --force to overwrite it.",
            args.output.display(),
        )));
    }

    if args.verbose && args.quiet {
        return Err(CliError::ConflictingFlagsError(
            "Verbose and quiet modes cannot be used simultaneously."
                .to_string(),
        ));
    }

    Ok(())
}
