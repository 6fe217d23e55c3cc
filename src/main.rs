#![forbid(unsafe_code)]

use std::process::ExitCode;

use clap::Parser;
use storefrontd::app::Args;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let Err(err) = storefrontd::run(args).await else {
        return ExitCode::SUCCESS;
    };
    tracing::error!(error = %format!("{err:#}"), "storefrontd stopped");
    eprintln!("storefrontd: {err:#}");
    ExitCode::FAILURE
}
