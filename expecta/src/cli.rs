// expecta/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "expecta")]
#[command(about = "Declarative data-quality expectations, checked against your tables", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Runs every enabled rule against the configured data
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Only run rules targeting this table (ex: "CUSTOMERS")
        #[arg(long, short)]
        table: Option<String>,

        /// Report format printed on stdout
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// 🩺 Parses the rules against the registry without touching data
    Check {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 📚 Lists the registered expectation types
    Expectations,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() -> Result<()> {
        let args = Cli::parse_from(["expecta", "run"]);
        match args.command {
            Commands::Run {
                project_dir,
                table,
                format,
            } => {
                assert_eq!(project_dir.to_string_lossy(), ".");
                assert_eq!(table, None);
                assert_eq!(format, OutputFormat::Table);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_table_json() -> Result<()> {
        let args = Cli::parse_from([
            "expecta",
            "run",
            "-t",
            "CUSTOMERS",
            "--format",
            "json",
            "--project-dir",
            "/tmp",
        ]);
        match args.command {
            Commands::Run {
                project_dir,
                table,
                format,
            } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp");
                assert_eq!(table.as_deref(), Some("CUSTOMERS"));
                assert_eq!(format, OutputFormat::Json);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_check() -> Result<()> {
        let args = Cli::parse_from(["expecta", "check", "--project-dir", "shop"]);
        match args.command {
            Commands::Check { project_dir } => {
                assert_eq!(project_dir.to_string_lossy(), "shop");
                Ok(())
            }
            _ => bail!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["expecta", "run", "--format", "xml"]).is_err());
    }
}
