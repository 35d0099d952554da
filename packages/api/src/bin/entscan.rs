use std::process::ExitCode;

use clap::Parser;
use entscan::cli::{Cli, exit_code, init_logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:?}");
            ExitCode::from(exit_code(&err))
        }
    }
}
