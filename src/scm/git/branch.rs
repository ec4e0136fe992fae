//! Remote branch naming and case reconciliation.

use std::collections::HashMap;
use std::fmt;

use crate::log_debug;
use crate::scm::git::repository::{FetchFlag, FetchResult};

/// A `(remote, branch)` pair, e.g. `origin` / `feature/login`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteBranch {
    pub remote: String,
    pub branch: String,
}

impl RemoteBranch {
    pub fn new(remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            branch: branch.into(),
        }
    }

    /// Split a combined name (`remotes/origin/foo/bar` or `origin/foo/bar`)
    /// on its first path separator.
    pub fn from_branch_name(name: &str) -> Self {
        let normalized = name.strip_prefix("remotes/").unwrap_or(name);
        match normalized.split_once('/') {
            Some((remote, branch)) => Self::new(remote, branch),
            None => Self::new(normalized, ""),
        }
    }
}

impl fmt::Display for RemoteBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.remote, self.branch)
    }
}

/// Maps branch names whose casing changed on the remote.
///
/// Case-insensitive filesystems re-case tracking refs during fetch: the old
/// casing shows up as a `pruned` event and the new casing as a `new-ref`
/// event in the same invocation. Pairing the two by identical lowercase
/// form recovers the current remote-side name for a deletion that was
/// recorded under the old casing. Pairing is best-effort: an unmatched name
/// resolves to itself.
#[derive(Debug, Default)]
pub struct BranchCaseMap {
    /// remote name → branch name as recorded → branch name as fetched
    map: HashMap<String, HashMap<String, String>>,
}

impl BranchCaseMap {
    pub fn from_fetch(fetch: &FetchResult) -> Self {
        let mut deleted = Vec::new();
        let mut added = Vec::new();
        for item in &fetch.updated_branches {
            match item.flag {
                FetchFlag::Pruned => deleted.push(item.tracking_branch.as_str()),
                FetchFlag::NewRef => added.push(item.tracking_branch.as_str()),
                _ => {}
            }
        }

        let mut map: HashMap<String, HashMap<String, String>> = HashMap::new();
        for old in deleted {
            let Some(current) = added
                .iter()
                .find(|name| name.to_lowercase() == old.to_lowercase())
            else {
                continue;
            };
            log_debug!("matching branch: {old} => {current}");
            let renamed = RemoteBranch::from_branch_name(current);
            let old_branch = RemoteBranch::from_branch_name(old).branch;
            map.entry(renamed.remote)
                .or_default()
                .insert(old_branch, renamed.branch);
        }

        Self { map }
    }

    /// The current remote-side name for a pending deletion; unchanged when
    /// no case-differing replacement was observed.
    pub fn resolve(&self, target: &RemoteBranch) -> RemoteBranch {
        match self
            .map
            .get(&target.remote)
            .and_then(|branches| branches.get(&target.branch))
        {
            Some(current) => RemoteBranch::new(target.remote.clone(), current.clone()),
            None => target.clone(),
        }
    }
}
