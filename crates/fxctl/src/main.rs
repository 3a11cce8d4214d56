//! fxctl - inspect settings stores and run the FoundationEx helpers

mod handler;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::handler::{Command, CommandHandler};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings store directory
    #[arg(short, long, default_value = "./data")]
    data: String,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    debug!(data = %args.data, command = ?args.command, "running command");

    let handler = CommandHandler::new(&args.data);
    let output = handler.handle(args.command)?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
