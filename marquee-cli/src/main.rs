//! Marquee CLI - Command-line interface
//!
//! Browses the now-playing listing, movie details and search from a terminal.

mod commands;

use clap::Parser;
use marquee_core::MarqueeError;
use marquee_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Browse the movie catalog from the terminal")]
#[command(version)]
struct Cli {
    /// Console log level
    #[arg(long, global = true, value_enum, default_value_t = CliLogLevel::Warn)]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_level.into(), None)?;

    if let Err(error) = commands::handle_command(cli.command).await {
        match error.downcast_ref::<MarqueeError>() {
            Some(marquee_error) => eprintln!("Error: {}", marquee_error.user_message()),
            None => eprintln!("Error: {error}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
