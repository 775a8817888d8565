mod cli;
mod inputs;
mod platform;

use std::process::ExitCode;

use clap::Parser;
use mediaconv_logging::batch_error;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match platform::run_app(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            batch_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
