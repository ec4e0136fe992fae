//! Line-oriented parsers for git's textual output.
//!
//! Each parser extracts the lines it recognizes and skips the rest, so new
//! output shapes in future git versions degrade a field instead of breaking
//! a run. Missing headers default to empty strings or zero counts.

use std::sync::LazyLock;

use regex::Regex;

use crate::scm::git::branch::RemoteBranch;
use crate::scm::git::repository::{
    BranchListing, FetchFlag, FetchItem, FetchResult, PullResult, StatusResult,
};

/// Apply the commit-id shortening policy: a non-negative prefix keeps that
/// many leading characters, a negative prefix disables truncation.
pub(crate) fn shorten_commit(commit: &str, prefix: i32) -> String {
    if prefix < 0 {
        commit.to_string()
    } else {
        commit.chars().take(prefix as usize).collect()
    }
}

/// Everything after the first `fields` space-separated fields. Only the
/// final segment (the path) may contain spaces.
fn field_after(line: &str, fields: usize) -> Option<&str> {
    line.splitn(fields + 1, ' ').nth(fields)
}

/// Parse `git status --porcelain=2 -b` output.
///
/// Header lines (`# branch.*`) are all optional: a detached or unpublished
/// head simply omits them. Entry lines contribute one path each; rename and
/// copy entries carry an `old<TAB>new` pair of which the old path is the
/// one reported.
pub(crate) fn parse_status(stdout: &str, commit_prefix: i32) -> StatusResult {
    let mut result = StatusResult::default();

    for line in stdout.lines() {
        if let Some(oid) = line.strip_prefix("# branch.oid ") {
            result.commit = shorten_commit(oid.trim(), commit_prefix);
        } else if let Some(head) = line.strip_prefix("# branch.head ") {
            result.branch = head.trim().to_string();
        } else if let Some(upstream) = line.strip_prefix("# branch.upstream ") {
            result.remote_branch = upstream.trim().to_string();
        } else if let Some(ab) = line.strip_prefix("# branch.ab ") {
            (result.ahead, result.behind) = parse_ahead_behind(ab);
        } else if line.starts_with("1 ") {
            if let Some(path) = field_after(line, 8) {
                result.modified_files.push(path.to_string());
            }
        } else if line.starts_with("2 ") {
            if let Some(pair) = field_after(line, 9) {
                let old = pair.split('\t').next().unwrap_or(pair);
                result.modified_files.push(old.to_string());
            }
        } else if let Some(path) = line.strip_prefix("? ") {
            result.modified_files.push(path.to_string());
        } else if line.starts_with("u ") {
            if let Some(path) = field_after(line, 10) {
                result.modified_files.push(path.to_string());
            }
        }
    }

    result
}

/// `+<ahead> -<behind>`; malformed counts degrade to zero.
fn parse_ahead_behind(ab: &str) -> (u32, u32) {
    let mut ahead = 0;
    let mut behind = 0;
    for token in ab.split_whitespace() {
        if let Some(n) = token.strip_prefix('+') {
            ahead = n.parse().unwrap_or(0);
        } else if let Some(n) = token.strip_prefix('-') {
            behind = n.parse().unwrap_or(0);
        }
    }
    (ahead, behind)
}

/// Updated files from a fast-forward merge summary: the diffstat lines of
/// the form ` <path> | <changes>`. "Already up to date." parses to an
/// empty list.
pub(crate) fn parse_pull(stdout: &str) -> PullResult {
    let mut updated_files = Vec::new();
    for line in stdout.lines() {
        if !line.starts_with(' ') {
            continue;
        }
        if let Some((path, _)) = line.split_once('|') {
            let path = path.trim();
            if !path.is_empty() {
                updated_files.push(path.to_string());
            }
        }
    }
    PullResult { updated_files }
}

/// One ref-update line from the fetch diagnostic stream: a one-character
/// flag, a bracketed or unbracketed action label, a source ref (or the
/// `(none)` marker), an arrow, and the destination tracking ref.
static FETCH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ (.) (\[[^\]]+\]|\S+)\s+(\S+)\s+->\s+(\S+)\s*$").expect("fetch line pattern")
});

/// Classify the diagnostic stream of `git fetch --prune`, preserving the
/// order git emitted the lines in.
pub(crate) fn parse_fetch(stderr: &str) -> FetchResult {
    let mut updated_branches = Vec::new();
    for line in stderr.lines() {
        let Some(caps) = FETCH_LINE.captures(line) else {
            continue;
        };
        let flag = FetchFlag::from_symbol(caps[1].chars().next().unwrap_or(' '));
        let source = &caps[3];
        let remote_branch = if source == "(none)" {
            None
        } else {
            Some(source.to_string())
        };
        updated_branches.push(FetchItem {
            flag,
            action: caps[2].to_string(),
            remote_branch,
            tracking_branch: caps[4].to_string(),
        });
    }
    FetchResult { updated_branches }
}

/// Branch names reported by `git remote prune <remote>` on its
/// ` * [pruned] <name>` lines.
pub(crate) fn parse_pruned_branches(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("* [pruned] "))
        .map(|name| name.trim().to_string())
        .collect()
}

/// Branch names from `git branch -r [--merged]`, dropping the decorated
/// `HEAD ->` alias line.
pub(crate) fn parse_remote_branches(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains("->"))
        .map(ToString::to_string)
        .collect()
}

/// Partition `git branch -a` output into local and remote-tracking
/// branches. The two-column marker prefix is stripped; `->` alias lines are
/// dropped.
pub(crate) fn parse_branch_listing(stdout: &str) -> BranchListing {
    let mut listing = BranchListing::default();
    for line in stdout.lines() {
        if line.contains("->") {
            continue;
        }
        let Some(name) = line.get(2..) else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if name.starts_with("remotes/") {
            listing.remote.push(RemoteBranch::from_branch_name(name));
        } else {
            listing.local.push(name.to_string());
        }
    }
    listing
}
