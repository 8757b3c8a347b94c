// expecta-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::project::configuration::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

const CANDIDATES: [&str; 2] = ["expecta.yaml", "expecta_project.yaml"];

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project config");

    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // Layering: EXPECTA_TARGET_PATH=/tmp/out expecta run
    apply_env_overrides(&mut config);

    config.validate()?;
    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "{} (checked {:?})",
        root.display(),
        CANDIDATES
    )))
}

fn apply_env_overrides(config: &mut ProjectConfig) {
    if let Ok(val) = std::env::var("EXPECTA_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    if let Ok(val) = std::env::var("EXPECTA_DATABASE") {
        info!(old = ?config.database, new = ?val, "Overriding database via ENV");
        config.database = val;
    }
    if let Ok(val) = std::env::var("EXPECTA_MAX_WORKERS") {
        match val.parse::<usize>() {
            Ok(n) => {
                info!(old = config.max_workers, new = n, "Overriding max workers via ENV");
                config.max_workers = n;
            }
            Err(_) => warn!(value = %val, "Ignoring non-numeric EXPECTA_MAX_WORKERS"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_reports_location() -> Result<()> {
        let dir = tempdir()?;
        let err = load_project_config(dir.path()).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigNotFound(_)));
        Ok(())
    }

    #[test]
    fn test_secondary_file_name_is_found() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("expecta_project.yaml"),
            "name: shop\nsources:\n  ORDERS: data/orders.csv\nrules:\n  file: rules.yaml\n",
        )?;
        let config = load_project_config(dir.path())?;
        assert_eq!(config.name, "shop");
        assert_eq!(config.sources.get("ORDERS").map(String::as_str), Some("data/orders.csv"));
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("expecta.yaml"), "name: shop\nrules: {}\n")?;
        let err = load_project_config(dir.path()).unwrap_err();
        assert!(matches!(err, InfrastructureError::InvalidConfig(_)));
        Ok(())
    }
}
