//! Binary crate for the `weather-alert` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and loading settings
//! - Routing log records to a file so they stay off the console
//! - Choosing a console and wiring both check loops together

use clap::Parser;

mod cli;
mod logging;
mod setup;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
