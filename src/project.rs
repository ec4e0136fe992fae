//! Project configuration values.

use std::path::PathBuf;

use regex::Regex;

use crate::error::ConfigError;
use crate::scm::git::repository::GitRepository;

/// Raw configuration for one project, assembled from the config file.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub name: String,
    pub path: PathBuf,
    pub default_branch: String,
    /// Safe-branch entries; `/…/` entries are regular expressions, anything
    /// else is a literal branch name.
    pub safe_branches: Vec<String>,
    pub marks: Vec<String>,
    pub group: Option<String>,
    /// Commit-id prefix length; negative disables truncation.
    pub commit_prefix: i32,
    pub prune_on_fetch: bool,
}

/// One configured repository.
///
/// The default branch is appended to the safe-branch entries at
/// construction time, so it can never become a deletion candidate for the
/// lifetime of the value.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
    pub default_branch: String,
    pub marks: Vec<String>,
    pub group: Option<String>,
    safe_patterns: Vec<Regex>,
    repository: GitRepository,
}

impl Project {
    pub fn new(config: ProjectConfig) -> Result<Self, ConfigError> {
        let repository =
            GitRepository::open(&config.path, config.commit_prefix, config.prune_on_fetch);
        Self::with_repository(config, repository)
    }

    /// Construct with an externally-built repository handle.
    pub fn with_repository(
        config: ProjectConfig,
        repository: GitRepository,
    ) -> Result<Self, ConfigError> {
        let mut entries = config.safe_branches;
        entries.push(config.default_branch.clone());
        let safe_patterns = compile_safe_patterns(&entries)?;

        Ok(Self {
            name: config.name,
            path: config.path,
            default_branch: config.default_branch,
            marks: config.marks,
            group: config.group,
            safe_patterns,
            repository,
        })
    }

    pub fn repository(&self) -> &GitRepository {
        &self.repository
    }

    /// True when a fully-qualified `remote/branch` name matches any
    /// safe-branch pattern.
    pub fn is_safe_branch(&self, branch: &str) -> bool {
        self.safe_patterns.iter().any(|re| re.is_match(branch))
    }
}

/// Literal entries anchor against their `origin/<name>` form; `/…/` entries
/// compile as written.
fn compile_safe_patterns(entries: &[String]) -> Result<Vec<Regex>, ConfigError> {
    entries
        .iter()
        .map(|entry| {
            let pattern = match entry
                .strip_prefix('/')
                .and_then(|rest| rest.strip_suffix('/'))
            {
                Some(raw) if !raw.is_empty() => raw.to_string(),
                _ => format!("^origin/{}$", regex::escape(entry)),
            };
            Regex::new(&pattern).map_err(|e| ConfigError::InvalidSafeBranch {
                pattern: entry.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}
