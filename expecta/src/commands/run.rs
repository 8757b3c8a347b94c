// expecta/src/commands/run.rs
//
// USE CASE: Run the validation.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use expecta_core::application::{RunOptions, ValidationRunner, run_validation};
use expecta_core::domain::expectation::ExpectationRegistry;
use expecta_core::domain::{Outcome, Report};
use expecta_core::infrastructure::report::{render_json, save_report};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::cli::OutputFormat;
use crate::commands::open_project;

pub async fn execute(
    project_dir: PathBuf,
    table: Option<String>,
    format: OutputFormat,
) -> anyhow::Result<i32> {
    let start = Instant::now();
    // JSON goes to stdout untouched, so progress is only printed for the table view.
    let chatty = format == OutputFormat::Table;

    if chatty {
        println!("⚙️  Loading configuration...");
    }
    let project = open_project(&project_dir).await?;
    if chatty {
        println!("   Project: {} (v{})", project.config.name, project.config.version);
        println!("   Engine: {}", project.accessor.engine_name());
        println!("   Rules: {}", project.rules.describe());
    }

    let runner = ValidationRunner::new(
        ExpectationRegistry::builtin(),
        RunOptions::from_config(&project.config),
    );

    let cancel = CancellationToken::new();
    let listener = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupt received, cancelling pending rules");
                listener.cancel();
            }
            _ = listener.cancelled() => {}
        }
    });

    let report = run_validation(
        project.rules.as_ref(),
        project.accessor.as_ref(),
        &runner,
        table.as_deref(),
        cancel.clone(),
    )
    .await
    .with_context(|| format!("Failed to read rules from {}", project.rules.describe()))?;
    // Releases the interrupt listener.
    cancel.cancel();

    match format {
        OutputFormat::Table => print_table(&report),
        OutputFormat::Json => println!("{}", render_json(&report)?),
    }

    let path = save_report(&report, &project.target_dir())
        .with_context(|| format!("Failed to write report under {:?}", project.target_dir()))?;

    if chatty {
        let s = &report.summary;
        println!();
        for (name, status) in &s.tables {
            let icon = match status {
                Outcome::Failed => "❌",
                Outcome::Errored => "💥",
                _ => "✅",
            };
            println!("   {icon} Validation {} for {name}", status_word(*status));
        }
        println!(
            "   {} total | {} passed | {} failed | {} errored | {} skipped",
            s.total, s.passed, s.failed, s.errored, s.skipped
        );
        println!("   📝 Report: {}", path.display());
        match report.status() {
            Outcome::Failed => eprintln!("\n❌ FAILURE. {} rules failed.", s.failed),
            Outcome::Errored => eprintln!("\n💥 ERRORED. {} rules could not be evaluated.", s.errored),
            _ => println!("\n✨ SUCCESS! Validation finished in {:.2?}", start.elapsed()),
        }
    }

    Ok(exit_code(report.status()))
}

fn status_word(status: Outcome) -> &'static str {
    match status {
        Outcome::Failed => "failed",
        Outcome::Errored => "errored",
        _ => "passed",
    }
}

/// 0 PASSED, 1 FAILED, 2 ERRORED.
pub fn exit_code(status: Outcome) -> i32 {
    match status {
        Outcome::Passed | Outcome::Skipped => 0,
        Outcome::Failed => 1,
        Outcome::Errored => 2,
    }
}

fn print_table(report: &Report) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Table", "Column", "Expectation", "Outcome", "Detail", "Time"]);

    for result in &report.results {
        let color = match result.outcome {
            Outcome::Passed => Color::Green,
            Outcome::Failed => Color::Red,
            Outcome::Errored => Color::Magenta,
            Outcome::Skipped => Color::DarkGrey,
        };
        table.add_row(vec![
            Cell::new(result.rule.index),
            Cell::new(&result.rule.table),
            Cell::new(result.rule.column.as_deref().unwrap_or("-")),
            Cell::new(&result.rule.expectation_type),
            Cell::new(result.outcome).fg(color),
            Cell::new(&result.detail),
            Cell::new(format!("{:.2?}", result.elapsed)),
        ]);
    }

    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(Outcome::Passed), 0);
        assert_eq!(exit_code(Outcome::Failed), 1);
        assert_eq!(exit_code(Outcome::Errored), 2);
    }

    #[test]
    fn test_table_status_words() {
        assert_eq!(status_word(Outcome::Failed), "failed");
        assert_eq!(status_word(Outcome::Errored), "errored");
        assert_eq!(status_word(Outcome::Skipped), "passed");
    }
}
