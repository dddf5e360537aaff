//! twig - local content-addressed version control
//!
//! a single-user version control system for one working directory: files are
//! staged, snapshotted into commits, branched, checked out and merged with a
//! three-way comparison against the nearest common ancestor.
//!
//! # Core concepts
//!
//! - **Blob**: one file's name and bytes, keyed by their hash (CBOR + zstd)
//! - **Commit**: full file name -> blob mapping, parents, message and timestamp
//! - **Branch**: a named pointer to a commit; HEAD follows the current one
//! - **Staging index / removal set**: pending changes for the next commit
//!
//! # Hash format
//!
//! blob hash = SHA256("twig-blob\0" | name_len | name | content_len | content)
//!
//! commit hash = SHA256("twig-commit\0" | files | parents | message | timestamp)
//!
//! every variable-length field is prefixed with its length as a little endian u64.
//!
//! # Example usage
//!
//! ```no_run
//! use twig::{ops, Repo};
//! use std::path::Path;
//!
//! // initialize a repository inside a working directory
//! let repo = Repo::init(Path::new("/path/to/work")).unwrap();
//!
//! // stage and commit a file
//! ops::add(&repo, "hello.txt").unwrap();
//! let hash = ops::commit(&repo, "first").unwrap();
//!
//! // branch off and merge back
//! ops::create_branch(&repo, "feature").unwrap();
//! ops::checkout_branch(&repo, "feature").unwrap();
//! ops::checkout_branch(&repo, "master").unwrap();
//! ops::merge(&repo, "feature").unwrap();
//! # let _ = hash;
//! ```

mod config;
mod error;
mod hash;
mod object;
mod refs;
mod repo;
mod state;

pub mod fs;
pub mod ops;
pub mod types;

pub use config::{Config, WorktreeConfig, DEFAULT_BRANCH};
pub use error::{Error, IoResultExt, Result};
pub use hash::{compute_blob_hash, compute_commit_hash, Hash};
pub use object::{
    blob_exists, commit_exists, list_commits, put_blob, read_blob, read_commit, resolve_commit,
    write_commit, ObjectKind, StoredObject,
};
pub use refs::{validate_branch_name, RefTable, HEAD, INITIAL};
pub use repo::{Repo, RepoLock, REPO_DIR};
pub use state::{State, INITIAL_MESSAGE};
pub use types::{Blob, Commit, TIMESTAMP_FORMAT};
