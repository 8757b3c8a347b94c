// expecta/src/commands/expectations.rs
//
// USE CASE: List the expectation catalog.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use expecta_core::domain::expectation::ExpectationRegistry;

pub fn execute() -> anyhow::Result<()> {
    let registry = ExpectationRegistry::builtin();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Expectation", "Scope", "Parameters", "Description"]);

    for descriptor in registry.iter() {
        table.add_row(vec![
            descriptor.name().to_string(),
            descriptor.scope().to_string(),
            descriptor.schema().to_string(),
            descriptor.description().to_string(),
        ]);
    }

    println!("{table}");
    println!("📚 {} expectations registered (mostly and result_format accepted by all)", registry.len());
    Ok(())
}
