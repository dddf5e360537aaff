use crate::error::{Error, Result};
use crate::fs::{list_files, normalize_name, remove_file, write_file};
use crate::hash::Hash;
use crate::object::{read_blob, read_commit, resolve_commit};
use crate::repo::Repo;
use crate::state::State;
use crate::types::Commit;

/// restore one file from HEAD into the working tree
pub fn checkout_file(repo: &Repo, file: &str) -> Result<()> {
    let _lock = repo.lock()?;
    let state = State::load(repo)?;
    let head = state.head_commit(repo)?;
    restore_file(repo, &head, file)
}

/// restore one file from the commit named by `commit_id` (full or prefix)
pub fn checkout_file_at(repo: &Repo, commit_id: &str, file: &str) -> Result<()> {
    let _lock = repo.lock()?;
    let hash = resolve_commit(repo, commit_id)?;
    let commit = read_commit(repo, &hash)?;
    restore_file(repo, &commit, file)
}

/// switch the working tree and HEAD to another branch
pub fn checkout_branch(repo: &Repo, branch: &str) -> Result<Hash> {
    let _lock = repo.lock()?;
    let mut state = State::load(repo)?;

    let target = state.refs.branch(branch)?;
    if branch == state.current_branch {
        return Err(Error::AlreadyCurrent(branch.to_string()));
    }

    let head = state.head_commit(repo)?;
    let target_commit = read_commit(repo, &target)?;
    switch_tree(repo, &state, &head, &target_commit)?;

    state.switch_to(branch, target);
    state.clear_pending();
    state.save(repo)?;

    tracing::info!(branch, commit = %target.short(), "switched branch");
    Ok(target)
}

/// move the current branch and HEAD to an arbitrary commit, rewriting the working tree
pub fn reset(repo: &Repo, commit_id: &str) -> Result<Hash> {
    let _lock = repo.lock()?;
    let mut state = State::load(repo)?;

    let target = resolve_commit(repo, commit_id)?;
    let head = state.head_commit(repo)?;
    let target_commit = read_commit(repo, &target)?;
    switch_tree(repo, &state, &head, &target_commit)?;

    state.advance(target);
    state.clear_pending();
    state.save(repo)?;

    tracing::info!(branch = %state.current_branch, commit = %target.short(), "reset");
    Ok(target)
}

fn restore_file(repo: &Repo, commit: &Commit, file: &str) -> Result<()> {
    let missing = || Error::FileNotInCommit(file.to_string());
    let name = normalize_name(file).map_err(|_| missing())?;
    let blob = commit.blob_for(&name).ok_or_else(missing)?;

    let blob = read_blob(repo, &blob)?;
    write_file(repo, &name, &blob.content)?;

    tracing::debug!(file = %name, "restored");
    Ok(())
}

/// fail if a working file is neither tracked by `head` nor staged
pub(crate) fn ensure_no_untracked(repo: &Repo, state: &State, head: &Commit) -> Result<()> {
    for name in list_files(repo)? {
        if !head.tracks(&name) && !state.is_staged(&name) {
            return Err(Error::UntrackedFileInTheWay(name));
        }
    }
    Ok(())
}

/// replace the working tree contents of `from` with those of `to`.
///
/// files tracked by `from` but not `to` are deleted; every file of `to` is
/// written. files tracked by neither are left alone.
pub(crate) fn switch_tree(repo: &Repo, state: &State, from: &Commit, to: &Commit) -> Result<()> {
    ensure_no_untracked(repo, state, from)?;

    // read everything up front so a missing object fails before the tree is touched
    let mut blobs = Vec::with_capacity(to.tracked.len());
    for (name, hash) in &to.tracked {
        blobs.push((name, read_blob(repo, hash)?));
    }

    for name in from.tracked.keys() {
        if !to.tracks(name) {
            remove_file(repo, name)?;
        }
    }
    for (name, blob) in blobs {
        write_file(repo, name, &blob.content)?;
    }

    tracing::debug!(
        removed = from.tracked.keys().filter(|n| !to.tracks(n)).count(),
        written = to.tracked.len(),
        "working tree switched"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::branch::create_branch;
    use crate::ops::commit::commit;
    use crate::ops::stage::{add, rm};
    use std::fs;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn write_and_commit(dir: &std::path::Path, repo: &Repo, name: &str, content: &str) -> Hash {
        fs::write(dir.join(name), content).unwrap();
        add(repo, name).unwrap();
        commit(repo, &format!("write {}", name)).unwrap()
    }

    #[test]
    fn test_checkout_file_from_head() {
        let (dir, repo) = test_repo();
        write_and_commit(dir.path(), &repo, "wug.txt", "wug\n");

        fs::write(dir.path().join("wug.txt"), "not a wug\n").unwrap();
        checkout_file(&repo, "wug.txt").unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("wug.txt")).unwrap(), "wug\n");
    }

    #[test]
    fn test_checkout_file_does_not_touch_staging() {
        let (dir, repo) = test_repo();
        write_and_commit(dir.path(), &repo, "a.txt", "1");
        fs::write(dir.path().join("a.txt"), "2").unwrap();
        add(&repo, "a.txt").unwrap();

        checkout_file(&repo, "a.txt").unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "1");
        assert!(State::load(&repo).unwrap().is_staged("a.txt"));
    }

    #[test]
    fn test_checkout_file_not_in_head() {
        let (_dir, repo) = test_repo();
        let result = checkout_file(&repo, "nope.txt");
        assert!(matches!(result, Err(Error::FileNotInCommit(_))));
    }

    #[test]
    fn test_checkout_file_at_prefix() {
        let (dir, repo) = test_repo();
        let first = write_and_commit(dir.path(), &repo, "a.txt", "old");
        write_and_commit(dir.path(), &repo, "a.txt", "new");

        checkout_file_at(&repo, &first.to_hex()[..8], "a.txt").unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "old");
    }

    #[test]
    fn test_checkout_file_at_unknown_commit() {
        let (_dir, repo) = test_repo();
        let result = checkout_file_at(&repo, "deadbeef", "a.txt");
        assert!(matches!(result, Err(Error::NoSuchCommit(_))));
    }

    #[test]
    fn test_checkout_branch_switches_files() {
        let (dir, repo) = test_repo();
        write_and_commit(dir.path(), &repo, "shared.txt", "base");
        create_branch(&repo, "other").unwrap();
        write_and_commit(dir.path(), &repo, "master-only.txt", "m");

        let other = checkout_branch(&repo, "other").unwrap();

        assert!(!dir.path().join("master-only.txt").exists());
        assert_eq!(fs::read_to_string(dir.path().join("shared.txt")).unwrap(), "base");

        let state = State::load(&repo).unwrap();
        assert_eq!(state.current_branch, "other");
        assert_eq!(state.head(), other);

        checkout_branch(&repo, "master").unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("master-only.txt")).unwrap(), "m");
    }

    #[test]
    fn test_checkout_branch_clears_pending() {
        let (dir, repo) = test_repo();
        write_and_commit(dir.path(), &repo, "a.txt", "a");
        create_branch(&repo, "other").unwrap();

        fs::write(dir.path().join("b.txt"), "b").unwrap();
        add(&repo, "b.txt").unwrap();
        rm(&repo, "a.txt").unwrap();

        checkout_branch(&repo, "other").unwrap();
        let state = State::load(&repo).unwrap();
        assert!(state.is_clean());
        // a.txt is tracked on other, so it comes back
        assert!(dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_checkout_current_branch() {
        let (_dir, repo) = test_repo();
        let result = checkout_branch(&repo, "master");
        assert!(matches!(result, Err(Error::AlreadyCurrent(_))));
    }

    #[test]
    fn test_checkout_unknown_branch() {
        let (_dir, repo) = test_repo();
        let result = checkout_branch(&repo, "nope");
        assert!(matches!(result, Err(Error::NoSuchBranch(_))));
    }

    #[test]
    fn test_checkout_branch_refuses_untracked() {
        let (dir, repo) = test_repo();
        create_branch(&repo, "other").unwrap();
        fs::write(dir.path().join("stray.txt"), "stray").unwrap();

        let before = State::load(&repo).unwrap();
        let result = checkout_branch(&repo, "other");
        assert!(matches!(result, Err(Error::UntrackedFileInTheWay(_))));
        assert_eq!(State::load(&repo).unwrap(), before);
        assert!(dir.path().join("stray.txt").exists());
    }

    #[test]
    fn test_ignored_files_are_not_in_the_way() {
        let dir = tempdir().unwrap();
        let mut config = crate::config::Config::default();
        config.add_ignore("*.log").unwrap();
        let repo = Repo::init_with_config(dir.path(), config).unwrap();
        create_branch(&repo, "other").unwrap();
        fs::write(dir.path().join("build.log"), "noise").unwrap();

        checkout_branch(&repo, "other").unwrap();
        assert!(dir.path().join("build.log").exists());
    }

    #[test]
    fn test_reset_moves_branch() {
        let (dir, repo) = test_repo();
        let first = write_and_commit(dir.path(), &repo, "a.txt", "1");
        write_and_commit(dir.path(), &repo, "b.txt", "2");

        reset(&repo, &first.to_hex()).unwrap();

        let state = State::load(&repo).unwrap();
        assert_eq!(state.head(), first);
        assert_eq!(state.refs.branch("master").unwrap(), first);
        assert_eq!(state.current_branch, "master");
        assert!(!dir.path().join("b.txt").exists());
        assert!(dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_reset_unknown_commit() {
        let (_dir, repo) = test_repo();
        assert!(matches!(reset(&repo, "abc123"), Err(Error::NoSuchCommit(_))));
    }
}
