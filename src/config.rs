//! Declarative TOML configuration: which repositories the fleet contains.
//!
//! ```toml
//! root = "~/dev"
//! default_branch = "master"
//! safe_branches = ["develop", "/release\\/.*/"]
//! commit_prefix = 12
//!
//! [[projects]]
//! name = "api-server"
//! group = "backend"
//! marks = ["java"]
//!
//! [[projects]]
//! name = "web-client"
//! default_branch = "main"
//! prune_on_fetch = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::project::{Project, ProjectConfig};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Directory that project names are resolved under; `~` expands to the
    /// home directory.
    #[serde(default)]
    pub root: Option<PathBuf>,

    #[serde(default = "default_branch_name")]
    pub default_branch: String,

    /// Safe-branch entries applied to every project.
    #[serde(default)]
    pub safe_branches: Vec<String>,

    /// Commit-id prefix length; negative disables truncation.
    #[serde(default = "default_commit_prefix")]
    pub commit_prefix: i32,

    #[serde(default)]
    pub prune_on_fetch: bool,

    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectEntry {
    pub name: String,

    #[serde(default)]
    pub default_branch: Option<String>,

    #[serde(default)]
    pub marks: Vec<String>,

    /// Projects with the same consecutive group label share a labeled
    /// section in the report table.
    #[serde(default)]
    pub group: Option<String>,

    #[serde(default)]
    pub prune_on_fetch: Option<bool>,
}

fn default_branch_name() -> String {
    "master".to_string()
}

fn default_commit_prefix() -> i32 {
    12
}

/// Search order: the explicit `--config` path, then `~/.muster.toml`, then
/// `~/muster.toml`.
pub fn find_config_file(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(path) = explicit {
        candidates.push(path.to_path_buf());
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".muster.toml"));
        candidates.push(home.join("muster.toml"));
    }
    candidates
        .into_iter()
        .find(|path| path.is_file())
        .ok_or(ConfigError::MissingConfig)
}

/// Load and resolve the config file into project values.
pub fn load_projects(path: &Path) -> Result<Vec<Project>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::UnreadableConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    resolve_projects(config)
}

fn resolve_projects(config: ConfigFile) -> Result<Vec<Project>, ConfigError> {
    let root = expand_home(config.root.as_deref().unwrap_or(Path::new("")));

    let mut projects = Vec::with_capacity(config.projects.len());
    for entry in config.projects {
        let default_branch = entry
            .default_branch
            .unwrap_or_else(|| config.default_branch.clone());
        let path = root.join(&entry.name);
        projects.push(Project::new(ProjectConfig {
            name: entry.name,
            path,
            default_branch,
            safe_branches: config.safe_branches.clone(),
            marks: entry.marks,
            group: entry.group,
            commit_prefix: config.commit_prefix,
            prune_on_fetch: entry.prune_on_fetch.unwrap_or(config.prune_on_fetch),
        })?);
    }
    Ok(projects)
}

fn expand_home(root: &Path) -> PathBuf {
    root.strip_prefix("~")
        .ok()
        .and_then(|rest| dirs::home_dir().map(|home| home.join(rest)))
        .unwrap_or_else(|| root.to_path_buf())
}
