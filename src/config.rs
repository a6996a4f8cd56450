use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::model::project::Project;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub walkthrough_shown: bool,
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Single-project settings from before multiple projects were supported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devops: Option<LegacyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LegacyConfig {
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub access_token: String,
}

impl AppConfig {
    /// Move legacy single-project settings into the project list. Returns
    /// whether anything changed.
    pub fn migrate_legacy(&mut self) -> bool {
        let Some(legacy) = self.devops.take() else {
            return false;
        };
        if !self.projects.is_empty()
            || legacy.organization.is_empty()
            || legacy.access_token.is_empty()
        {
            return true;
        }
        let name = if legacy.project.is_empty() {
            legacy.organization.clone()
        } else {
            legacy.project.clone()
        };
        let project = Project::new(
            name,
            legacy.organization,
            legacy.project,
            legacy.access_token,
            &self.projects,
        );
        info!(project = %project.name, "migrated legacy project settings");
        self.projects.push(project);
        true
    }

    pub fn find_project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Remove a project by id. Returns whether it existed.
    pub fn remove_project(&mut self, id: &str) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        self.projects.len() != before
    }
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".devops-hours")
}

pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

/// Read the config at `path`, migrating legacy settings in place.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let mut config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    if config.migrate_legacy() {
        save_config_to(path, &config)?;
    }
    Ok(config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
}
