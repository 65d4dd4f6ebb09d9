mod app;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "murmur",
    version,
    about = "Record speech, transcribe it, and copy the text to the clipboard"
)]
struct Cli {
    /// Print debug detail for each lifecycle step
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive recording session: Enter toggles, q quits
    Record,
    /// Show or update configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    murmur_core::set_verbose(cli.verbose);

    match cli.command.unwrap_or(Command::Record) {
        Command::Record => commands::record::run().await,
        Command::Config(args) => commands::config::run(args),
    }
}
