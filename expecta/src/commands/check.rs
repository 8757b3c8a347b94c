// expecta/src/commands/check.rs
//
// USE CASE: Validate the rule configuration without touching data.

use std::path::PathBuf;

use anyhow::Context;
use expecta_core::application::{check_rules, load_rules};
use expecta_core::domain::expectation::ExpectationRegistry;

use crate::commands::open_rules;

/// Exit code: 0 when every rule binds, 1 otherwise.
pub async fn execute(project_dir: PathBuf) -> anyhow::Result<i32> {
    println!("⚙️  Loading configuration...");
    let (config, source) = open_rules(&project_dir)?;
    println!("   Project: {} (v{})", config.name, config.version);

    let rows = source
        .fetch_rules()
        .await
        .with_context(|| format!("Failed to read rules from {}", source.describe()))?;
    println!("   Rules: {} rows from {}", rows.len(), source.describe());

    let registry = ExpectationRegistry::builtin();
    let loaded = load_rules(&rows, Some(&registry));
    let problems = check_rules(&loaded, &registry);

    for (rule, error) in &problems {
        eprintln!("   ❌ {rule}: {error}");
    }

    if problems.is_empty() {
        println!("\n✨ All {} rules are valid.", loaded.len());
        Ok(0)
    } else {
        eprintln!("\n❌ {} of {} rules are misconfigured.", problems.len(), loaded.len());
        Ok(1)
    }
}
