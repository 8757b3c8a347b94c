// expecta/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug expecta run ... to see per-rule details.
    // Logs go to stderr so `--format json` keeps stdout parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match cli.command {
        // --- USE CASE: RUN VALIDATION ---
        Commands::Run {
            project_dir,
            table,
            format,
        } => match commands::run::execute(project_dir, table, format).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("\n💥 CRITICAL VALIDATION ERROR: {:#}", e);
                2
            }
        },

        // --- USE CASE: CHECK RULES ---
        Commands::Check { project_dir } => match commands::check::execute(project_dir).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("❌ Check failed: {:#}", e);
                2
            }
        },

        // --- USE CASE: EXPECTATION CATALOG ---
        Commands::Expectations => {
            commands::expectations::execute()?;
            0
        }
    };

    if code != 0 {
        // Exit with error code for CI/CD
        std::process::exit(code);
    }
    Ok(())
}
