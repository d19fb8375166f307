//! ## wavestream-cli
//! **Operator entry point**
//!
//! Streams recorded voltage/current waveforms to the measurement nodes and
//! lets the operator switch scenarios per node from the keyboard.

use clap::Parser;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::run_command(cli).await
}
