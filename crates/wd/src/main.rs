use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod hook;

#[derive(Parser)]
#[command(name = "wd", version, about = "Session review and auto-commit governor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hook entry points, invoked by the coding assistant
    Hook {
        #[command(subcommand)]
        command: HookCommands,
    },
    /// Run one review cycle against the current directory and print the outcome
    Review,
}

#[derive(Subcommand)]
enum HookCommands {
    /// Stop hook: reads the JSON payload from stdin, writes the decision to stdout
    Stop,
}

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries the hook protocol; everything else goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Hook {
            command: HookCommands::Stop,
        } => hook::run_stop_hook().await,
        Commands::Review => hook::run_manual_review().await,
    }
}
