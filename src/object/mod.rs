//! keyed object storage
//!
//! every stored object is CBOR serialized, zstd compressed and written to
//! `objects/<kind>/<xx>/<rest-of-hash>`. the key is the object's own
//! content address, so reads verify the decoded record against its key.

pub mod blob;
pub mod commit;

use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::fs::write_atomic;
use crate::hash::Hash;
use crate::repo::Repo;

pub use blob::{blob_exists, put_blob, read_blob};
pub use commit::{commit_exists, list_commits, read_commit, resolve_commit, write_commit};

/// zstd level used for every object
const COMPRESSION_LEVEL: i32 = 3;

/// partition of the object area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Commit,
}

impl ObjectKind {
    /// directory holding objects of this kind
    pub fn dir(&self, repo: &Repo) -> PathBuf {
        match self {
            ObjectKind::Blob => repo.blobs_path(),
            ObjectKind::Commit => repo.commits_path(),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Blob => write!(f, "blob"),
            ObjectKind::Commit => write!(f, "commit"),
        }
    }
}

/// a record that lives in the object area under its own hash
pub trait StoredObject: Serialize + DeserializeOwned {
    const KIND: ObjectKind;

    /// content address of this object
    fn id(&self) -> Hash;
}

impl StoredObject for crate::types::Blob {
    const KIND: ObjectKind = ObjectKind::Blob;

    fn id(&self) -> Hash {
        crate::types::Blob::id(self)
    }
}

impl StoredObject for crate::types::Commit {
    const KIND: ObjectKind = ObjectKind::Commit;

    fn id(&self) -> Hash {
        crate::types::Commit::id(self)
    }
}

/// get the filesystem path to an object
pub fn object_path(repo: &Repo, kind: ObjectKind, hash: &Hash) -> PathBuf {
    let (dir, file) = hash.to_path_components();
    kind.dir(repo).join(dir).join(file)
}

/// check if an object exists in the store
pub fn object_exists(repo: &Repo, kind: ObjectKind, hash: &Hash) -> bool {
    object_path(repo, kind, hash).exists()
}

/// write an object, returning its hash
///
/// writing an object that already exists is a no-op.
pub fn put<T: StoredObject>(repo: &Repo, object: &T) -> Result<Hash> {
    let hash = object.id();
    let path = object_path(repo, T::KIND, &hash);

    // dedup: if object already exists, we're done
    if path.exists() {
        return Ok(hash);
    }

    // serialize to cbor
    let mut cbor_bytes = Vec::new();
    ciborium::into_writer(object, &mut cbor_bytes)?;

    // compress with zstd
    let compressed =
        zstd::encode_all(&cbor_bytes[..], COMPRESSION_LEVEL).map_err(|e| Error::Io {
            path: PathBuf::from("<zstd>"),
            source: e,
        })?;

    write_atomic(repo, &path, &compressed)?;

    tracing::debug!(kind = %T::KIND, hash = %hash, "stored object");
    Ok(hash)
}

/// read an object, verifying it hashes back to its key
pub fn get<T: StoredObject>(repo: &Repo, hash: &Hash) -> Result<T> {
    let path = object_path(repo, T::KIND, hash);

    let compressed = fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ObjectNotFound(*hash)
        } else {
            Error::Io {
                path: path.clone(),
                source: e,
            }
        }
    })?;

    // a record that fails to decompress or decode is as corrupt as a mismatch
    let cbor_bytes = zstd::decode_all(&compressed[..]).map_err(|_| Error::CorruptObject(*hash))?;
    let object: T =
        ciborium::from_reader(&cbor_bytes[..]).map_err(|_| Error::CorruptObject(*hash))?;

    if object.id() != *hash {
        return Err(Error::CorruptObject(*hash));
    }

    Ok(object)
}

/// list every stored object id of a kind, sorted
pub fn list_ids(repo: &Repo, kind: ObjectKind) -> Result<Vec<Hash>> {
    let dir = kind.dir(repo);
    let mut hashes = Vec::new();

    if !dir.exists() {
        return Ok(hashes);
    }

    for entry in WalkDir::new(&dir).min_depth(2).max_depth(2) {
        let entry = entry.map_err(|e| Error::Io {
            path: dir.clone(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walkdir error")),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let parent_name = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("");

        let hex = format!("{}{}", parent_name, file_name);
        if let Ok(hash) = Hash::from_hex(&hex) {
            hashes.push(hash);
        }
    }

    hashes.sort();
    Ok(hashes)
}
