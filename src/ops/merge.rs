//! three-way merge of another branch into the current one

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::fs::{remove_file, write_file};
use crate::hash::Hash;
use crate::object::{put_blob, read_blob, read_commit};
use crate::ops::checkout::{ensure_no_untracked, switch_tree};
use crate::ops::commit::commit_pending;
use crate::repo::Repo;
use crate::state::State;
use crate::types::Commit;

const CONFLICT_START: &[u8] = b"<<<<<<< HEAD\n";
const CONFLICT_SEPARATOR: &[u8] = b"=======\n";
const CONFLICT_END: &[u8] = b">>>>>>>\n";

/// how a merge ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// HEAD was an ancestor of the branch; moved to it without a commit
    FastForward(Hash),
    /// the branch is already contained in HEAD
    AlreadyAncestor,
    /// merged cleanly into a new two-parent commit
    Merged(Hash),
    /// these files hold conflict markers; nothing was committed
    Conflicted(Vec<String>),
}

/// per-file decision of the three-way comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    KeepCurrent,
    TakeTarget(Hash),
    Remove,
    Conflict,
}

/// merge `branch` into the current branch
pub fn merge(repo: &Repo, branch: &str) -> Result<MergeOutcome> {
    let _lock = repo.lock()?;
    let mut state = State::load(repo)?;

    if branch == state.current_branch {
        return Err(Error::SelfMerge(branch.to_string()));
    }
    if !state.is_clean() {
        return Err(Error::UncommittedChanges);
    }
    let target = state.refs.branch(branch)?;
    let head_commit = state.head_commit(repo)?;
    ensure_no_untracked(repo, &state, &head_commit)?;

    let head = state.head();
    let split = split_point(repo, head, target)?;
    tracing::debug!(head = %head.short(), target = %target.short(), split = %split.short(), "split point");

    let outcome = if split == head {
        let target_commit = read_commit(repo, &target)?;
        switch_tree(repo, &state, &head_commit, &target_commit)?;
        state.advance(target);
        MergeOutcome::FastForward(target)
    } else if split == target {
        MergeOutcome::AlreadyAncestor
    } else {
        let split_commit = read_commit(repo, &split)?;
        let target_commit = read_commit(repo, &target)?;
        let conflicts = apply_three_way(
            repo,
            &mut state,
            &split_commit,
            &head_commit,
            &target_commit,
        )?;

        if conflicts.is_empty() {
            let message = format!("Merged {} into {}.", branch, state.current_branch);
            MergeOutcome::Merged(commit_pending(repo, &mut state, &message, Some(target))?)
        } else {
            MergeOutcome::Conflicted(conflicts)
        }
    };

    state.save(repo)?;

    match &outcome {
        MergeOutcome::FastForward(hash) => {
            tracing::info!(branch, commit = %hash.short(), "fast-forwarded")
        }
        MergeOutcome::AlreadyAncestor => tracing::info!(branch, "already merged"),
        MergeOutcome::Merged(hash) => tracing::info!(branch, commit = %hash.short(), "merged"),
        MergeOutcome::Conflicted(files) => {
            tracing::warn!(branch, conflicts = files.len(), "merge left conflicts")
        }
    }
    Ok(outcome)
}

/// nearest common ancestor of `head` and `other`.
///
/// every ancestor of `other` is collected first, then `head`'s ancestry is
/// walked breadth-first over all parents; the first commit found in both wins.
pub fn split_point(repo: &Repo, head: Hash, other: Hash) -> Result<Hash> {
    let theirs = ancestors(repo, other)?;

    let mut queue = VecDeque::from([head]);
    let mut seen = HashSet::from([head]);
    while let Some(hash) = queue.pop_front() {
        if theirs.contains(&hash) {
            return Ok(hash);
        }
        for parent in read_commit(repo, &hash)?.parents {
            if seen.insert(parent) {
                queue.push_back(parent);
            }
        }
    }

    // every history starts at the shared root commit
    Err(Error::CorruptState {
        name: "refs".to_string(),
        message: format!("{} and {} share no ancestor", head, other),
    })
}

/// `start` and everything reachable from it through parent links
fn ancestors(repo: &Repo, start: Hash) -> Result<HashSet<Hash>> {
    let mut seen = HashSet::from([start]);
    let mut stack = vec![start];
    while let Some(hash) = stack.pop() {
        for parent in read_commit(repo, &hash)?.parents {
            if seen.insert(parent) {
                stack.push(parent);
            }
        }
    }
    Ok(seen)
}

fn classify(split: Option<Hash>, current: Option<Hash>, target: Option<Hash>) -> Resolution {
    let current_changed = current != split;
    let target_changed = target != split;

    match (current_changed, target_changed) {
        (_, false) => Resolution::KeepCurrent,
        (false, true) => match target {
            Some(blob) => Resolution::TakeTarget(blob),
            None => Resolution::Remove,
        },
        (true, true) if current == target => Resolution::KeepCurrent,
        (true, true) => Resolution::Conflict,
    }
}

/// resolve every file against the split point, returning conflicted names.
///
/// every decision is made and every stored copy read before the working tree
/// is touched; removals then run before writes so a directory the target
/// replaced with a file is gone by the time the file is written.
fn apply_three_way(
    repo: &Repo,
    state: &mut State,
    split: &Commit,
    current: &Commit,
    target: &Commit,
) -> Result<Vec<String>> {
    let names: BTreeSet<&String> = split
        .tracked
        .keys()
        .chain(current.tracked.keys())
        .chain(target.tracked.keys())
        .collect();

    let mut removals = Vec::new();
    let mut writes: Vec<(&String, Hash, Vec<u8>)> = Vec::new();
    let mut conflicts = Vec::new();

    for name in names {
        let ours = current.blob_for(name);
        let theirs = target.blob_for(name);

        match classify(split.blob_for(name), ours, theirs) {
            Resolution::KeepCurrent => {}
            Resolution::TakeTarget(hash) => {
                tracing::debug!(file = %name, "taken from target");
                writes.push((name, hash, read_blob(repo, &hash)?.content));
            }
            Resolution::Remove => {
                tracing::debug!(file = %name, "removed by target");
                removals.push(name);
            }
            Resolution::Conflict => {
                tracing::debug!(file = %name, "conflict");
                let content = conflict_content(repo, ours, theirs)?;
                let hash = put_blob(repo, name, &content)?;
                writes.push((name, hash, content));
                conflicts.push(name.clone());
            }
        }
    }

    for name in &removals {
        remove_file(repo, name)?;
    }
    for (name, _, content) in &writes {
        write_file(repo, name, content)?;
    }

    for name in removals {
        state.mark_removed(name);
    }
    for (name, hash, _) in writes {
        state.stage(name, hash);
    }

    Ok(conflicts)
}

fn conflict_content(repo: &Repo, ours: Option<Hash>, theirs: Option<Hash>) -> Result<Vec<u8>> {
    let read = |hash: Option<Hash>| -> Result<Vec<u8>> {
        match hash {
            Some(h) => Ok(read_blob(repo, &h)?.content),
            None => Ok(Vec::new()),
        }
    };

    let mut content = CONFLICT_START.to_vec();
    content.extend(read(ours)?);
    content.extend_from_slice(CONFLICT_SEPARATOR);
    content.extend(read(theirs)?);
    content.extend_from_slice(CONFLICT_END);
    Ok(content)
}
