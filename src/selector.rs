//! Project selection: which configured repositories an invocation acts on.
//!
//! Unselected projects are not dropped; they carry a skip row through the
//! report so every configured project is always visible.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::error::ConfigError;
use crate::log_debug;
use crate::project::Project;

/// Raw selection options from the command line.
#[derive(Debug, Default, Clone)]
pub struct SelectorConfig {
    pub projects: Vec<String>,
    pub paths: Vec<String>,
    pub branch: String,
    pub mark: String,
}

/// At most one selection criterion may be active.
#[derive(Debug, Clone)]
pub enum Selector {
    All,
    ByName(Vec<String>),
    ByPath(Vec<PathBuf>),
    ByBranch(String),
    ByMark(String),
}

impl Selector {
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        let have_projects = !config.projects.is_empty();
        let have_paths = !config.paths.is_empty();
        let have_branch = !config.branch.trim().is_empty();
        let have_mark = !config.mark.trim().is_empty();

        let criteria = [have_projects, have_paths, have_branch, have_mark]
            .iter()
            .filter(|active| **active)
            .count();
        if criteria > 1 {
            return Err(ConfigError::ConflictingSelectors {
                projects: config.projects.clone(),
                paths: config.paths.clone(),
                branch: config.branch.clone(),
                mark: config.mark.clone(),
            });
        }

        if have_paths {
            Ok(Self::ByPath(config.paths.iter().map(absolutize).collect()))
        } else if have_projects {
            Ok(Self::ByName(config.projects.clone()))
        } else if have_branch {
            Ok(Self::ByBranch(config.branch.trim().to_string()))
        } else if have_mark {
            Ok(Self::ByMark(config.mark.trim().to_string()))
        } else {
            Ok(Self::All)
        }
    }

    pub fn criteria(&self) -> String {
        match self {
            Self::All => "all projects".to_string(),
            Self::ByName(names) => format!("in list: {}", names.join(", ")),
            Self::ByPath(paths) => format!(
                "in path list: {}",
                paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::ByBranch(branch) => format!("active branch = {branch}"),
            Self::ByMark(mark) => format!("project mark = {mark}"),
        }
    }

    async fn selects(&self, project: &Project) -> Result<bool> {
        match self {
            Self::All => Ok(true),
            Self::ByName(names) => Ok(names.iter().any(|name| *name == project.name)),
            Self::ByPath(paths) => Ok(paths.iter().any(|path| project.path.starts_with(path))),
            Self::ByBranch(branch) => {
                let current = project.repository().branch().await?;
                log_debug!(
                    "[{}] branch={current} selected={}",
                    project.name,
                    current == *branch
                );
                Ok(current == *branch)
            }
            Self::ByMark(mark) => Ok(project.marks.iter().any(|m| m == mark)),
        }
    }
}

fn absolutize(path: impl AsRef<str>) -> PathBuf {
    let path = path.as_ref();
    std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path))
}

/// A configured project together with its selection outcome.
#[derive(Debug)]
pub struct SelectedProject {
    pub project: Arc<Project>,
    pub selected: bool,
}

/// Evaluate the selector over every configured project. Selecting zero
/// projects is an error.
pub async fn select_projects(
    selector: &Selector,
    projects: Vec<Project>,
) -> Result<Vec<SelectedProject>> {
    let mut items = Vec::with_capacity(projects.len());
    let mut selected_count = 0usize;

    for project in projects {
        let selected = selector.selects(&project).await?;
        if selected {
            selected_count += 1;
        }
        items.push(SelectedProject {
            project: Arc::new(project),
            selected,
        });
    }

    log_debug!("selected {selected_count} projects");
    if selected_count == 0 {
        return Err(ConfigError::NoProjectsSelected {
            criteria: selector.criteria(),
        }
        .into());
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectConfig;
    use crate::scm::git::repository::GitRepository;
    use crate::scm::git::runner::testing::ScriptedRunner;

    fn project(name: &str, marks: &[&str]) -> Project {
        Project::with_repository(
            ProjectConfig {
                name: name.to_string(),
                path: PathBuf::from("/repos").join(name),
                default_branch: "master".to_string(),
                safe_branches: Vec::new(),
                marks: marks.iter().map(ToString::to_string).collect(),
                group: None,
                commit_prefix: 12,
                prune_on_fetch: false,
            },
            GitRepository::with_runner(Arc::new(ScriptedRunner::new()), 12, false),
        )
        .unwrap()
    }

    fn config(projects: &[&str], mark: &str) -> SelectorConfig {
        SelectorConfig {
            projects: projects.iter().map(ToString::to_string).collect(),
            paths: Vec::new(),
            branch: String::new(),
            mark: mark.to_string(),
        }
    }

    #[test]
    fn more_than_one_criterion_conflicts() {
        let err = Selector::from_config(&config(&["api"], "java")).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingSelectors { .. }));
    }

    #[tokio::test]
    async fn name_selector_keeps_unselected_projects_as_skip_rows() {
        let selector = Selector::from_config(&config(&["api"], "")).unwrap();
        let items = select_projects(&selector, vec![project("api", &[]), project("web", &[])])
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert!(items[0].selected);
        assert!(!items[1].selected);
    }

    #[tokio::test]
    async fn mark_selector_matches_marked_projects() {
        let selector = Selector::from_config(&config(&[], "java")).unwrap();
        let items = select_projects(
            &selector,
            vec![project("api", &["java"]), project("web", &["node"])],
        )
        .await
        .unwrap();

        assert!(items[0].selected);
        assert!(!items[1].selected);
    }

    #[tokio::test]
    async fn zero_selected_projects_is_an_error() {
        let selector = Selector::from_config(&config(&["missing"], "")).unwrap();
        let err = select_projects(&selector, vec![project("api", &[])])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("selection criteria"));
    }

    #[tokio::test]
    async fn branch_selector_queries_the_repository() {
        let runner = Arc::new(
            ScriptedRunner::new().ok("git rev-parse --abbrev-ref HEAD", "release-7\n", ""),
        );
        let on_release = Project::with_repository(
            ProjectConfig {
                name: "api".to_string(),
                path: PathBuf::from("/repos/api"),
                default_branch: "master".to_string(),
                safe_branches: Vec::new(),
                marks: Vec::new(),
                group: None,
                commit_prefix: 12,
                prune_on_fetch: false,
            },
            GitRepository::with_runner(runner, 12, false),
        )
        .unwrap();

        let selector = Selector::from_config(&SelectorConfig {
            projects: Vec::new(),
            paths: Vec::new(),
            branch: "release-7".to_string(),
            mark: String::new(),
        })
        .unwrap();

        let items = select_projects(&selector, vec![on_release]).await.unwrap();
        assert!(items[0].selected);
    }

    #[tokio::test]
    async fn path_selector_matches_by_prefix() {
        let selector = Selector::from_config(&SelectorConfig {
            projects: Vec::new(),
            paths: vec!["/repos".to_string()],
            branch: String::new(),
            mark: String::new(),
        })
        .unwrap();

        let items = select_projects(&selector, vec![project("api", &[])])
            .await
            .unwrap();
        assert!(items[0].selected);
    }
}
