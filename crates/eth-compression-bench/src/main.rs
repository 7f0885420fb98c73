// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

mod cli;
mod error;

use std::process::ExitCode;

use block_fetcher::run_fetch;
use clap::Parser;
use compression_bench::run_benchmark;
use tracing::{error, info, level_filters::LevelFilter, subscriber::set_global_default};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::{
    cli::{Cli, Config},
    error::CliError,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    if let Err(e) = run().await {
        error!("{e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    set_global_default(subscriber).expect(
        "Failed to set up the global default subscriber for logging. Please check if the RUST_LOG environment variable is set correctly.",
    );
}

async fn run() -> Result<(), CliError> {
    // a missing .env file is fine, flags and the environment still apply
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match Config::from(cli.command) {
        Config::Run(config) => {
            let reports = run_benchmark(&config)?;
            let exported = reports.iter().filter(|r| r.is_exported()).count();
            info!(
                files = reports.len(),
                exported,
                skipped = reports.len() - exported,
                "benchmarks finished"
            );
        }
        Config::Fetch(config) => {
            run_fetch(&config).await?;
        }
    }

    Ok(())
}
