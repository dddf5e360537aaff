use crate::error::Result;
use crate::hash::Hash;
use crate::repo::Repo;
use crate::state::State;

/// a branch and where it points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchEntry {
    pub name: String,
    pub commit: Hash,
    /// is this the checked-out branch
    pub current: bool,
}

/// create a branch at HEAD without switching to it
pub fn create_branch(repo: &Repo, name: &str) -> Result<Hash> {
    let _lock = repo.lock()?;
    let mut state = State::load(repo)?;

    let head = state.head();
    state.refs.create_branch(name, head)?;
    state.save(repo)?;

    tracing::info!(branch = name, commit = %head.short(), "created branch");
    Ok(head)
}

/// delete a branch pointer; its commits stay in the store
pub fn delete_branch(repo: &Repo, name: &str) -> Result<Hash> {
    let _lock = repo.lock()?;
    let mut state = State::load(repo)?;

    let current = state.current_branch.clone();
    let commit = state.refs.delete_branch(name, &current)?;
    state.save(repo)?;

    tracing::info!(branch = name, commit = %commit.short(), "deleted branch");
    Ok(commit)
}

/// every branch in ascending name order
pub fn list_branches(repo: &Repo) -> Result<Vec<BranchEntry>> {
    let _lock = repo.lock()?;
    let state = State::load(repo)?;
    state
        .refs
        .branch_names()
        .into_iter()
        .map(|name| {
            Ok(BranchEntry {
                name: name.to_string(),
                commit: state.refs.branch(name)?,
                current: name == state.current_branch,
            })
        })
        .collect()
}
