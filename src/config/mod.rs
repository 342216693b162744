pub mod feature;
pub mod task;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::config::task::TaskConfig;

const CONFIG_FILE: &str = "config.json";

pub fn default_config_path() -> Result<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Ok(local);
    }
    let project_dirs = ProjectDirs::from("com", "hellhbbd", "roster-sync")
        .ok_or_else(|| anyhow!("unable to resolve config directory"))?;
    Ok(project_dirs.config_dir().join(CONFIG_FILE))
}

pub fn load_tasks(path: &Path) -> Result<Vec<TaskConfig>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_tasks(&raw).with_context(|| format!("invalid config: {}", path.display()))
}

pub fn parse_tasks(raw: &str) -> Result<Vec<TaskConfig>> {
    // files saved by spreadsheet-friendly editors often start with a BOM
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let tasks: Vec<TaskConfig> =
        serde_json::from_str(raw).context("failed to parse task list")?;
    for task in &tasks {
        task.validate()?;
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tasks_accepts_a_leading_bom() {
        let raw = "\u{feff}[]";
        let tasks = parse_tasks(raw).expect("empty task list should parse");
        assert!(tasks.is_empty());
    }

    #[test]
    fn parse_tasks_rejects_a_single_object() {
        assert!(parse_tasks(r#"{"task": "x"}"#).is_err());
    }
}
