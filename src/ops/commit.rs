use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::write_commit;
use crate::repo::Repo;
use crate::state::State;
use crate::types::Commit;

/// snapshot HEAD plus the pending changes as a new commit on the current branch
pub fn commit(repo: &Repo, message: &str) -> Result<Hash> {
    let _lock = repo.lock()?;
    let mut state = State::load(repo)?;

    let hash = commit_pending(repo, &mut state, message, None)?;

    state.save(repo)?;
    Ok(hash)
}

/// build and write a commit from `state`, advancing the current branch.
///
/// `merged` is the second parent of a merge commit; merges may commit an
/// empty change set, plain commits may not.
pub(crate) fn commit_pending(
    repo: &Repo,
    state: &mut State,
    message: &str,
    merged: Option<Hash>,
) -> Result<Hash> {
    if merged.is_none() && state.is_clean() {
        return Err(Error::EmptyCommit);
    }
    if message.is_empty() {
        return Err(Error::EmptyMessage);
    }

    let head = state.head_commit(repo)?;
    let mut tracked = head.tracked;
    for name in &state.removals {
        tracked.remove(name);
    }
    for (name, blob) in &state.staging {
        tracked.insert(name.clone(), *blob);
    }

    let mut parents = vec![state.head()];
    parents.extend(merged);

    let commit = Commit::new(parents, message, tracked);
    let hash = write_commit(repo, &commit)?;

    state.advance(hash);
    state.clear_pending();

    tracing::info!(
        commit = %hash.short(),
        branch = %state.current_branch,
        files = commit.tracked.len(),
        "committed"
    );
    Ok(hash)
}
