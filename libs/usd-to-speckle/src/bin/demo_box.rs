//! Upload a single untyped box to the Speckle stream.

use anyhow::{Context, Result};
use speckle_sink::{Credentials, Receipt, ServerSink, SinkConfig};
use std::process::ExitCode;
use usd_to_speckle::{connect_sink, publish_demo_box};

fn run() -> Result<Receipt> {
    let mut sink = connect_sink(Credentials::from_env(), |credentials| {
        ServerSink::connect(SinkConfig::default(), &credentials)
    })?;
    publish_demo_box(&mut sink).context("failed to publish demo box")
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(receipt) => {
            log::info!("committed {}", receipt.commit_id);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
