use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{get, list_ids, ObjectKind, StoredObject};
use crate::repo::Repo;
use crate::state::State;
use crate::types::{Blob, Commit};

/// fsck report
#[derive(Debug, Default)]
pub struct FsckReport {
    /// objects checked
    pub objects_checked: usize,
    /// objects that fail to decode or hash back to their key
    pub corrupt_objects: Vec<CorruptObject>,
    /// objects referenced by refs, commits or the staging index but absent
    pub missing_objects: Vec<MissingObject>,
    /// commits no ref reaches (left behind by rm-branch or reset)
    pub unreachable_commits: Vec<Hash>,
    /// blobs no commit or staged entry references
    pub dangling_blobs: Vec<Hash>,
}

impl FsckReport {
    pub fn is_ok(&self) -> bool {
        self.corrupt_objects.is_empty() && self.missing_objects.is_empty()
    }
}

#[derive(Debug)]
pub struct CorruptObject {
    pub hash: Hash,
    pub kind: ObjectKind,
}

#[derive(Debug)]
pub struct MissingObject {
    pub hash: Hash,
    pub kind: ObjectKind,
    pub referenced_by: String,
}

/// verify repository integrity
pub fn fsck(repo: &Repo) -> Result<FsckReport> {
    let _lock = repo.lock()?;
    let state = State::load(repo)?;

    let mut report = FsckReport::default();
    let mut reachable_commits = HashSet::new();
    let mut reachable_blobs = HashSet::new();

    // walk every commit reachable from the ref table
    let mut stack: Vec<(Hash, String)> = state
        .refs
        .roots()
        .into_iter()
        .map(|(name, hash)| (hash, format!("ref {}", name)))
        .collect();

    while let Some((hash, referenced_by)) = stack.pop() {
        if !reachable_commits.insert(hash) {
            continue;
        }
        let Some(commit) = check::<Commit>(repo, &hash, &referenced_by, &mut report)? else {
            continue;
        };

        for parent in &commit.parents {
            stack.push((*parent, format!("commit {}", hash)));
        }
        for (name, blob) in &commit.tracked {
            if reachable_blobs.insert(*blob) {
                let by = format!("commit {} file {}", hash, name);
                check::<Blob>(repo, blob, &by, &mut report)?;
            }
        }
    }

    for (name, blob) in &state.staging {
        if reachable_blobs.insert(*blob) {
            let by = format!("staging index file {}", name);
            check::<Blob>(repo, blob, &by, &mut report)?;
        }
    }

    // whatever is left on disk is unreferenced; still verify it decodes
    for hash in list_ids(repo, ObjectKind::Commit)? {
        if !reachable_commits.contains(&hash) {
            check::<Commit>(repo, &hash, "object store", &mut report)?;
            report.unreachable_commits.push(hash);
        }
    }
    for hash in list_ids(repo, ObjectKind::Blob)? {
        if !reachable_blobs.contains(&hash) {
            check::<Blob>(repo, &hash, "object store", &mut report)?;
            report.dangling_blobs.push(hash);
        }
    }

    tracing::info!(
        checked = report.objects_checked,
        corrupt = report.corrupt_objects.len(),
        missing = report.missing_objects.len(),
        "fsck finished"
    );
    Ok(report)
}

/// read one object, recording it as missing or corrupt instead of failing
fn check<T: StoredObject>(
    repo: &Repo,
    hash: &Hash,
    referenced_by: &str,
    report: &mut FsckReport,
) -> Result<Option<T>> {
    report.objects_checked += 1;

    match get::<T>(repo, hash) {
        Ok(object) => Ok(Some(object)),
        Err(Error::ObjectNotFound(_)) => {
            report.missing_objects.push(MissingObject {
                hash: *hash,
                kind: T::KIND,
                referenced_by: referenced_by.to_string(),
            });
            Ok(None)
        }
        Err(Error::CorruptObject(_)) => {
            tracing::warn!(kind = %T::KIND, hash = %hash, "corrupt object");
            report.corrupt_objects.push(CorruptObject {
                hash: *hash,
                kind: T::KIND,
            });
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

impl std::fmt::Display for FsckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "checked {} objects", self.objects_checked)?;
        for corrupt in &self.corrupt_objects {
            writeln!(f, "corrupt {} {}", corrupt.kind, corrupt.hash)?;
        }
        for missing in &self.missing_objects {
            writeln!(
                f,
                "missing {} {} (referenced by {})",
                missing.kind, missing.hash, missing.referenced_by
            )?;
        }
        for hash in &self.unreachable_commits {
            writeln!(f, "unreachable commit {}", hash)?;
        }
        for hash in &self.dangling_blobs {
            writeln!(f, "dangling blob {}", hash)?;
        }
        Ok(())
    }
}
