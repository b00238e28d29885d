//! lazyload CLI - drive the lazy-load engine over a page layout.

mod commands;
mod error;
mod layout;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::simulate::{self, SimulateArgs, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_LATENCY_MS};
use error::CliError;

#[derive(Parser)]
#[command(name = "lazyload")]
#[command(version = lazyload::VERSION)]
#[command(about = "Deferred image loading simulator", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scroll session over a JSON page layout
    Simulate {
        /// Page layout file
        layout: PathBuf,

        /// Maximum concurrent image fetches
        #[arg(long)]
        concurrent: Option<usize>,

        /// Space-separated trigger events (the first one is fired each step)
        #[arg(long)]
        on: Option<String>,

        /// Fade-in duration in milliseconds
        #[arg(long)]
        speed: Option<f64>,

        /// Pixels scrolled per step
        #[arg(long, default_value_t = 300.0)]
        scroll_step: f64,

        /// Number of scroll steps after the initial pass
        #[arg(long, default_value_t = 5)]
        steps: u32,

        /// Fetch without network access
        #[arg(long)]
        offline: bool,

        /// Offline fetch latency in milliseconds
        #[arg(long, default_value_t = DEFAULT_LATENCY_MS)]
        latency: u64,

        /// Seconds to wait for outstanding loads at the end
        #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
        idle_timeout: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let _guard = lazyload::logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Simulate {
            layout,
            concurrent,
            on,
            speed,
            scroll_step,
            steps,
            offline,
            latency,
            idle_timeout,
        } => simulate::run(SimulateArgs {
            layout,
            concurrent,
            on,
            speed,
            scroll_step,
            steps,
            offline,
            latency_ms: latency,
            idle_timeout_secs: idle_timeout,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::try_parse_from([
            "lazyload",
            "simulate",
            "page.json",
            "--concurrent",
            "2",
            "--offline",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Simulate {
                layout,
                concurrent,
                offline,
                steps,
                ..
            } => {
                assert_eq!(layout, PathBuf::from("page.json"));
                assert_eq!(concurrent, Some(2));
                assert!(offline);
                assert_eq!(steps, 5);
            }
        }
    }
}
