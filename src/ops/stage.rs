use crate::error::{Error, Result};
use crate::fs::{normalize_name, read_file, remove_file, work_file_exists};
use crate::hash::Hash;
use crate::object::put_blob;
use crate::repo::Repo;
use crate::state::State;

/// result of staging a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// the file's content was staged under this blob
    Staged(Hash),
    /// already staged with identical content
    AlreadyStaged,
    /// content equals HEAD's version, nothing to stage
    MatchesHead,
}

/// result of removing a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RmOutcome {
    /// tracked by HEAD: deleted from the working tree and marked for removal
    Removed,
    /// only staged: the staged entry was dropped
    Unstaged,
}

/// stage a working file for the next commit
pub fn add(repo: &Repo, file: &str) -> Result<AddOutcome> {
    let _lock = repo.lock()?;
    let mut state = State::load(repo)?;

    let outcome = add_file(repo, &mut state, file)?;

    state.save(repo)?;
    Ok(outcome)
}

/// unstage a file, or mark a tracked file for removal
pub fn rm(repo: &Repo, file: &str) -> Result<RmOutcome> {
    let _lock = repo.lock()?;
    let mut state = State::load(repo)?;

    let outcome = rm_file(repo, &mut state, file)?;

    state.save(repo)?;
    Ok(outcome)
}

pub(crate) fn add_file(repo: &Repo, state: &mut State, file: &str) -> Result<AddOutcome> {
    let name = normalize_name(file)?;
    if !work_file_exists(repo, &name) {
        return Err(Error::FileNotFound(file.to_string()));
    }

    // adding a file cancels its pending removal
    state.removals.remove(&name);

    let content = read_file(repo, &name)?;
    let blob = put_blob(repo, &name, &content)?;

    if state.staging.get(&name) == Some(&blob) {
        tracing::debug!(file = %name, "already staged");
        return Ok(AddOutcome::AlreadyStaged);
    }

    let head = state.head_commit(repo)?;
    if head.blob_for(&name) == Some(blob) {
        // reverted to the committed version: any older staged copy is stale
        state.unstage(&name);
        tracing::debug!(file = %name, "matches HEAD, not staged");
        return Ok(AddOutcome::MatchesHead);
    }

    state.stage(&name, blob);
    tracing::debug!(file = %name, blob = %blob, "staged");
    Ok(AddOutcome::Staged(blob))
}

pub(crate) fn rm_file(repo: &Repo, state: &mut State, file: &str) -> Result<RmOutcome> {
    let name = normalize_name(file).map_err(|_| Error::NothingToRemove(file.to_string()))?;
    let head = state.head_commit(repo)?;

    if head.tracks(&name) {
        remove_file(repo, &name)?;
        state.mark_removed(&name);
        tracing::debug!(file = %name, "marked for removal");
        Ok(RmOutcome::Removed)
    } else if state.unstage(&name) {
        tracing::debug!(file = %name, "unstaged");
        Ok(RmOutcome::Unstaged)
    } else {
        Err(Error::NothingToRemove(name))
    }
}
