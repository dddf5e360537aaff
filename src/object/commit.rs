use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{get, list_ids, object_exists, put, ObjectKind};
use crate::repo::Repo;
use crate::types::Commit;

/// write a commit to the object store
pub fn write_commit(repo: &Repo, commit: &Commit) -> Result<Hash> {
    put(repo, commit)
}

/// read a commit from the object store
pub fn read_commit(repo: &Repo, hash: &Hash) -> Result<Commit> {
    get(repo, hash)
}

/// check if a commit exists in the object store
pub fn commit_exists(repo: &Repo, hash: &Hash) -> bool {
    object_exists(repo, ObjectKind::Commit, hash)
}

/// every stored commit id, sorted
pub fn list_commits(repo: &Repo) -> Result<Vec<Hash>> {
    list_ids(repo, ObjectKind::Commit)
}

/// resolve a full or abbreviated commit id
///
/// a prefix must match exactly one stored commit; several matches fail with
/// AmbiguousCommitId rather than silently picking one.
pub fn resolve_commit(repo: &Repo, id: &str) -> Result<Hash> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::NoSuchCommit(id.to_string()));
    }

    // full id: direct lookup
    if id.len() == Hash::HEX_LEN {
        let hash = Hash::from_hex(&id.to_ascii_lowercase())?;
        if commit_exists(repo, &hash) {
            return Ok(hash);
        }
        return Err(Error::NoSuchCommit(id.to_string()));
    }

    let matches: Vec<Hash> = list_commits(repo)?
        .into_iter()
        .filter(|h| h.has_prefix(id))
        .collect();

    match matches.as_slice() {
        [] => Err(Error::NoSuchCommit(id.to_string())),
        [hash] => Ok(*hash),
        _ => Err(Error::AmbiguousCommitId {
            prefix: id.to_string(),
            matches: matches.len(),
        }),
    }
}
