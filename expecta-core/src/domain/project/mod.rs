// expecta-core/src/domain/project/mod.rs

pub mod configuration;
pub use configuration::{Engine, ProjectConfig, RulesConfig};
