//! `fstproc` — process a stream with a letter transducer.
//!
//! Only parses arguments, initialises logging, and delegates to
//! `fstproc_cli::run`. `-h`/`-v` are checked against the raw argument list
//! before parsing, since clap's built-in help/version actions always exit
//! 0 and this front end's `-h` must exit 1 (usage error) while `fst_file`
//! stays a required positional the user may not have supplied yet.

#![forbid(unsafe_code)]

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use fstproc_cli::Cli;

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.iter().any(|arg| arg == "-h" || arg == "--help") {
        eprint!("{}", Cli::command().render_help());
        return ExitCode::from(1);
    }
    if argv.iter().any(|arg| arg == "-v" || arg == "--version") {
        println!("fstproc {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    #[cfg(feature = "trace")]
    env_logger::init();

    let cli = Cli::parse();
    match fstproc_cli::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fstproc: {err:#}");
            ExitCode::FAILURE
        }
    }
}
