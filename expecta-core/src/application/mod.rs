// expecta-core/src/application/mod.rs

pub mod loader;
pub mod runner;
pub mod validation;

// --- RE-EXPORTS (FACADE) ---
// Le CLI fait `use expecta_core::application::{run_validation, ValidationRunner};`

pub use loader::{check_rules, filter_table, load_rules};
pub use runner::{RunOptions, ValidationRunner};
pub use validation::run_validation;
