//! The primary entry point and dispatcher for the command-line tool.
//!
//! This module parses and validates the command-line arguments, sets up
//! logging, and dispatches execution to the encode or decode mode. It
//! also owns the failure policy: any error after the output file has
//! been created removes that file and exits with a non-zero status, so
//! a half-written container never survives.

use clap::Parser;
use tracing::{debug, error};

mod arg_handling;
use arg_handling::{validate_args, Args};

mod error_handling;
use error_handling::{initiate_logging, CliError};

mod modes;
use modes::{run_decode, run_encode};

mod storage_io;

/// Executes the selected operating mode.
fn run(args: &Args) -> Result<(), CliError> {
    if args.decode {
        debug!("Mode: Decode");
        run_decode(args)
    } else {
        debug!("Mode: Encode");
        run_encode(args)
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = initiate_logging(args.verbose, args.quiet) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    //Further validate and check for conflicting options.
    match validate_args(&args) {
        Ok(_) => {
            debug!("Command-line arguments are valid.");
        }
        Err(e) => {
            error!("Invalid command-line arguments. Please verify input.");
            eprintln!("\nError: {e}");
            std::process::exit(1);
        }
    }

    //Begin the selected operation.
    match run(&args) {
        Ok(_) => {
            debug!("The file was processed without any problem.");
        }
        Err(e) => {
            error!("There was an error processing the input file: {e}");
            storage_io::discard_output(&args.output);
            std::process::exit(1);
        }
    }
}
