//! Import the cube prims of a USD file into a Speckle stream.
//!
//! ```text
//! SPECKLE_API_TOKEN=... usd-to-speckle --input scene.usdz
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use speckle_sink::{Credentials, Receipt, ServerSink, SinkConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use usd_to_speckle::run_import;

/// Upload every Cube prim of a USD scene as a Speckle mesh
#[derive(Parser, Debug)]
#[command(name = "usd-to-speckle", version, about, long_about = None)]
struct Cli {
    /// Path to a .usda or .usdz file
    #[arg(long)]
    input: PathBuf,
}

fn run(cli: &Cli) -> Result<Receipt> {
    let receipt = run_import(&cli.input, Credentials::from_env(), |credentials| {
        ServerSink::connect(SinkConfig::default(), &credentials)
    })
    .with_context(|| format!("failed to import {}", cli.input.display()))?;
    Ok(receipt)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(receipt) => {
            log::info!(
                "committed {} (object {})",
                receipt.commit_id,
                receipt.object_id
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
