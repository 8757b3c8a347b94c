// expecta/src/commands/mod.rs

pub mod check;
pub mod expectations;
pub mod run;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use expecta_core::domain::project::{Engine, ProjectConfig};
use expecta_core::infrastructure::adapters::{DataFusionAccessor, DuckDBAccessor};
use expecta_core::infrastructure::config::{FileRuleSource, load_project_config};
use expecta_core::ports::{DataAccessor, RuleSource};

/// Config plus the engine and rule source it describes.
pub struct Project {
    pub dir: PathBuf,
    pub config: ProjectConfig,
    pub accessor: Box<dyn DataAccessor>,
    pub rules: Box<dyn RuleSource>,
}

impl Project {
    pub fn target_dir(&self) -> PathBuf {
        self.dir.join(&self.config.target_path)
    }
}

/// Loads the config, opens the engine and registers the CSV sources.
pub async fn open_project(project_dir: &Path) -> anyhow::Result<Project> {
    let config = load_config(project_dir)?;

    let (accessor, rules): (Box<dyn DataAccessor>, Box<dyn RuleSource>) = match config.engine {
        Engine::DuckDB => {
            let duck = open_duckdb(project_dir, &config)?;
            for (table, path) in &config.sources {
                duck.register_csv(table, &project_dir.join(path))
                    .with_context(|| format!("Failed to register source {} ({})", table, path))?;
            }
            let rules: Box<dyn RuleSource> = match (&config.rules.file, &config.rules.table) {
                (Some(file), _) => Box::new(FileRuleSource::new(project_dir.join(file))),
                (None, Some(table)) => Box::new(duck.rule_source(table.clone())),
                (None, None) => bail!("No rule source configured (rules.file or rules.table)"),
            };
            (Box::new(duck), rules)
        }
        Engine::DataFusion => {
            let fusion = DataFusionAccessor::new();
            for (table, path) in &config.sources {
                fusion
                    .register_csv(table, &project_dir.join(path))
                    .await
                    .with_context(|| format!("Failed to register source {} ({})", table, path))?;
            }
            let Some(file) = &config.rules.file else {
                bail!("rules.table requires the duckdb engine; use rules.file with datafusion");
            };
            (
                Box::new(fusion),
                Box::new(FileRuleSource::new(project_dir.join(file))),
            )
        }
    };

    Ok(Project {
        dir: project_dir.to_path_buf(),
        config,
        accessor,
        rules,
    })
}

/// Config and rule source only. The engine is opened just for `rules.table`,
/// so checking a file-based rule set never creates a database.
pub fn open_rules(project_dir: &Path) -> anyhow::Result<(ProjectConfig, Box<dyn RuleSource>)> {
    let config = load_config(project_dir)?;

    let rules: Box<dyn RuleSource> = match (&config.rules.file, &config.rules.table) {
        (Some(file), _) => Box::new(FileRuleSource::new(project_dir.join(file))),
        (None, Some(table)) => {
            if config.engine != Engine::DuckDB {
                bail!("rules.table requires the duckdb engine; use rules.file with datafusion");
            }
            Box::new(open_duckdb(project_dir, &config)?.rule_source(table.clone()))
        }
        (None, None) => bail!("No rule source configured (rules.file or rules.table)"),
    };
    Ok((config, rules))
}

fn load_config(project_dir: &Path) -> anyhow::Result<ProjectConfig> {
    load_project_config(project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })
}

fn open_duckdb(project_dir: &Path, config: &ProjectConfig) -> anyhow::Result<DuckDBAccessor> {
    let db_path = if config.database == ":memory:" {
        config.database.clone()
    } else {
        project_dir.join(&config.database).to_string_lossy().into_owned()
    };
    DuckDBAccessor::new(&db_path).with_context(|| format!("Failed to initialize DuckDB at {}", db_path))
}
