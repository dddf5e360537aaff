use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{list_commits, read_commit};
use crate::repo::Repo;
use crate::state::State;
use crate::types::Commit;

/// commit with its hash for log output
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub hash: Hash,
    pub commit: Commit,
}

/// history of HEAD along first parents, newest first
pub fn log(repo: &Repo, max_count: Option<usize>) -> Result<Vec<LogEntry>> {
    let _lock = repo.lock()?;
    let state = State::load(repo)?;

    let mut entries = Vec::new();
    let mut visited = HashSet::new();
    let mut next = Some(state.head());

    while let Some(hash) = next {
        if max_count.is_some_and(|max| entries.len() >= max) || !visited.insert(hash) {
            break;
        }
        let commit = read_commit(repo, &hash)?;
        next = commit.parent();
        entries.push(LogEntry { hash, commit });
    }

    Ok(entries)
}

/// every stored commit in id order, reachable or not
pub fn global_log(repo: &Repo) -> Result<Vec<LogEntry>> {
    let _lock = repo.lock()?;
    list_commits(repo)?
        .into_iter()
        .map(|hash| Ok(LogEntry { hash, commit: read_commit(repo, &hash)? }))
        .collect()
}

/// ids of every commit whose message is exactly `message`
pub fn find(repo: &Repo, message: &str) -> Result<Vec<Hash>> {
    let found: Vec<Hash> = global_log(repo)?
        .into_iter()
        .filter(|entry| entry.commit.message == message)
        .map(|entry| entry.hash)
        .collect();

    if found.is_empty() {
        return Err(Error::NoCommitWithMessage(message.to_string()));
    }
    Ok(found)
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===")?;
        writeln!(f, "commit {}", self.hash)?;
        if let [first, second, ..] = self.commit.parents.as_slice() {
            writeln!(f, "Merge: {} {}", first.short(), second.short())?;
        }
        writeln!(f, "Date: {}", self.commit.timestamp)?;
        writeln!(f, "{}", self.commit.message)?;
        Ok(())
    }
}
