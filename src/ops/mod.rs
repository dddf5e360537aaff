//! high-level operations on twig repositories
//!
//! every operation holds the repository lock for its whole duration and
//! works on a `State` loaded at its start; mutating operations save it back
//! only after every step has succeeded.

mod branch;
mod checkout;
mod commit;
mod fsck;
mod log;
mod merge;
mod stage;
mod status;

pub use branch::{create_branch, delete_branch, list_branches, BranchEntry};
pub use checkout::{checkout_branch, checkout_file, checkout_file_at, reset};
pub use commit::commit;
pub use fsck::{fsck, CorruptObject, FsckReport, MissingObject};
pub use log::{find, global_log, log, LogEntry};
pub use merge::{merge, split_point, MergeOutcome};
pub use stage::{add, rm, AddOutcome, RmOutcome};
pub use status::{status, Modification, StatusReport};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::Repo;
    use crate::state::State;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn read(dir: &Path, name: &str) -> String {
        fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn test_first_commit_history() {
        let (dir, repo) = test_repo();
        write(dir.path(), "hello.txt", "world");
        add(&repo, "hello.txt").unwrap();
        commit(&repo, "first").unwrap();

        let entries = log(&repo, None).unwrap();
        assert_eq!(entries[0].commit.message, "first");
        assert_eq!(entries[0].commit.parents.len(), 1);
        // the only older entry is the parentless root created by init
        assert_eq!(entries.len(), 2);
        assert!(entries[1].commit.is_root());
    }

    #[test]
    fn test_branch_round_trip() {
        let (dir, repo) = test_repo();
        let d = dir.path();
        write(d, "hello.txt", "world");
        add(&repo, "hello.txt").unwrap();
        commit(&repo, "C1").unwrap();

        create_branch(&repo, "feature").unwrap();
        checkout_branch(&repo, "feature").unwrap();
        write(d, "hello.txt", "moon");
        add(&repo, "hello.txt").unwrap();
        commit(&repo, "second").unwrap();

        checkout_branch(&repo, "master").unwrap();
        assert_eq!(read(d, "hello.txt"), "world");
        checkout_branch(&repo, "feature").unwrap();
        assert_eq!(read(d, "hello.txt"), "moon");
    }

    #[test]
    fn test_automatic_merge_keeps_both_edits() {
        let (dir, repo) = test_repo();
        let d = dir.path();
        write(d, "x.txt", "x");
        write(d, "y.txt", "y");
        add(&repo, "x.txt").unwrap();
        add(&repo, "y.txt").unwrap();
        commit(&repo, "C1").unwrap();
        create_branch(&repo, "A").unwrap();
        create_branch(&repo, "B").unwrap();

        checkout_branch(&repo, "A").unwrap();
        write(d, "x.txt", "x from A");
        add(&repo, "x.txt").unwrap();
        commit(&repo, "edit x").unwrap();

        checkout_branch(&repo, "B").unwrap();
        write(d, "y.txt", "y from B");
        add(&repo, "y.txt").unwrap();
        commit(&repo, "edit y").unwrap();

        let MergeOutcome::Merged(hash) = merge(&repo, "A").unwrap() else {
            panic!("expected an automatic merge");
        };
        let merged = crate::object::read_commit(&repo, &hash).unwrap();
        assert_eq!(merged.message, "Merged A into B.");
        assert_eq!(read(d, "x.txt"), "x from A");
        assert_eq!(read(d, "y.txt"), "y from B");
        assert!(status(&repo).unwrap().unstaged.is_empty());
    }

    #[test]
    fn test_conflicting_merge_marks_file() {
        let (dir, repo) = test_repo();
        let d = dir.path();
        write(d, "x.txt", "base");
        add(&repo, "x.txt").unwrap();
        commit(&repo, "C1").unwrap();
        create_branch(&repo, "A").unwrap();
        create_branch(&repo, "B").unwrap();

        checkout_branch(&repo, "A").unwrap();
        write(d, "x.txt", "left");
        add(&repo, "x.txt").unwrap();
        commit(&repo, "left").unwrap();

        checkout_branch(&repo, "B").unwrap();
        write(d, "x.txt", "right");
        add(&repo, "x.txt").unwrap();
        commit(&repo, "right").unwrap();

        let outcome = merge(&repo, "A").unwrap();
        assert_eq!(outcome, MergeOutcome::Conflicted(vec!["x.txt".to_string()]));
        assert_eq!(read(d, "x.txt"), "<<<<<<< HEAD\nright=======\nleft>>>>>>>\n");
    }

    #[test]
    fn test_snapshots_are_deterministic() {
        let (dir_a, repo_a) = test_repo();
        let (dir_b, repo_b) = test_repo();
        for (dir, repo) in [(&dir_a, &repo_a), (&dir_b, &repo_b)] {
            write(dir.path(), "same.txt", "identical bytes");
            add(repo, "same.txt").unwrap();
        }

        let staged_a = State::load(&repo_a).unwrap().staging;
        let staged_b = State::load(&repo_b).unwrap().staging;
        assert_eq!(staged_a, staged_b);
    }

    #[test]
    fn test_failed_operations_leave_state_alone() {
        let (dir, repo) = test_repo();
        write(dir.path(), "a.txt", "a");
        add(&repo, "a.txt").unwrap();
        let before = State::load(&repo).unwrap();

        assert!(commit(&repo, "").is_err());
        assert!(checkout_branch(&repo, "nope").is_err());
        assert!(reset(&repo, "zzz").is_err());
        assert!(merge(&repo, "master").is_err());
        assert!(delete_branch(&repo, "master").is_err());

        assert_eq!(State::load(&repo).unwrap(), before);
    }
}
