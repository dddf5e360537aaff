use std::fmt;

use crate::error::Result;
use crate::fs::{list_files, read_file, work_file_exists};
use crate::hash::{compute_blob_hash, Hash};
use crate::repo::Repo;
use crate::state::State;

/// why a working file differs from what would be committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Modification {
    Modified,
    Deleted,
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modification::Modified => write!(f, "modified"),
            Modification::Deleted => write!(f, "deleted"),
        }
    }
}

/// snapshot of branches, pending changes and working tree drift
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub current_branch: String,
    pub branches: Vec<String>,
    pub staged: Vec<String>,
    pub removed: Vec<String>,
    pub unstaged: Vec<(String, Modification)>,
    pub untracked: Vec<String>,
}

/// compare HEAD, the pending sets and the working tree
pub fn status(repo: &Repo) -> Result<StatusReport> {
    let _lock = repo.lock()?;
    let state = State::load(repo)?;
    let head = state.head_commit(repo)?;
    let files = list_files(repo)?;

    let mut unstaged = Vec::new();
    let mut consider = |name: &str, expected: Hash| -> Result<()> {
        if !work_file_exists(repo, name) {
            unstaged.push((name.to_string(), Modification::Deleted));
        } else if compute_blob_hash(name, &read_file(repo, name)?) != expected {
            unstaged.push((name.to_string(), Modification::Modified));
        }
        Ok(())
    };

    for (name, blob) in &head.tracked {
        if !state.is_staged(name) && !state.removals.contains(name) {
            consider(name, *blob)?;
        }
    }
    for (name, blob) in &state.staging {
        consider(name, *blob)?;
    }
    unstaged.sort();

    let untracked = files
        .into_iter()
        .filter(|name| {
            !state.is_staged(name) && (!head.tracks(name) || state.removals.contains(name))
        })
        .collect();

    Ok(StatusReport {
        branches: state.refs.branch_names().into_iter().map(String::from).collect(),
        staged: state.staging.keys().cloned().collect(),
        removed: state.removals.iter().cloned().collect(),
        current_branch: state.current_branch,
        unstaged,
        untracked,
    })
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Branches ===")?;
        for branch in &self.branches {
            if *branch == self.current_branch {
                writeln!(f, "*{}", branch)?;
            } else {
                writeln!(f, "{}", branch)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "=== Staged Files ===")?;
        for name in &self.staged {
            writeln!(f, "{}", name)?;
        }

        writeln!(f)?;
        writeln!(f, "=== Removed Files ===")?;
        for name in &self.removed {
            writeln!(f, "{}", name)?;
        }

        writeln!(f)?;
        writeln!(f, "=== Modifications Not Staged For Commit ===")?;
        for (name, kind) in &self.unstaged {
            writeln!(f, "{} ({})", name, kind)?;
        }

        writeln!(f)?;
        writeln!(f, "=== Untracked Files ===")?;
        for name in &self.untracked {
            writeln!(f, "{}", name)?;
        }
        Ok(())
    }
}
