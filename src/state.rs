//! mutable repository state
//!
//! four small records live under `.twig/state`: the reference table, the
//! staging index, the removal set and the current branch name. each
//! operation loads them into a `State`, works on that value, and saves it
//! back while holding the repository lock.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::fs::write_atomic;
use crate::hash::Hash;
use crate::object::{read_commit, write_commit};
use crate::refs::RefTable;
use crate::repo::Repo;
use crate::types::Commit;

const REFS_RECORD: &str = "refs";
const STAGING_RECORD: &str = "staging";
const REMOVALS_RECORD: &str = "removals";
const BRANCH_RECORD: &str = "branch";

/// message of the root commit created by init
pub const INITIAL_MESSAGE: &str = "initial commit";

/// in-memory view of the repository's mutable state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// branch pointers, HEAD and INITIAL
    pub refs: RefTable,
    /// branch HEAD shadows
    pub current_branch: String,
    /// file name -> blob for pending additions and modifications
    pub staging: BTreeMap<String, Hash>,
    /// file names pending removal
    pub removals: BTreeSet<String>,
}

impl State {
    /// create the root commit and the initial records for a new repository
    pub fn initialize(repo: &Repo) -> Result<Self> {
        let root = Commit::new(vec![], INITIAL_MESSAGE, BTreeMap::new());
        let root_hash = write_commit(repo, &root)?;

        let branch = repo.config().default_branch.clone();
        let state = Self {
            refs: RefTable::new(root_hash, &branch)?,
            current_branch: branch,
            staging: BTreeMap::new(),
            removals: BTreeSet::new(),
        };
        state.save(repo)?;
        Ok(state)
    }

    /// load every state record
    pub fn load(repo: &Repo) -> Result<Self> {
        Ok(Self {
            refs: read_record(repo, REFS_RECORD)?,
            current_branch: read_record(repo, BRANCH_RECORD)?,
            staging: read_record(repo, STAGING_RECORD)?,
            removals: read_record(repo, REMOVALS_RECORD)?,
        })
    }

    /// persist every state record
    pub fn save(&self, repo: &Repo) -> Result<()> {
        write_record(repo, REFS_RECORD, &self.refs)?;
        write_record(repo, BRANCH_RECORD, &self.current_branch)?;
        write_record(repo, STAGING_RECORD, &self.staging)?;
        write_record(repo, REMOVALS_RECORD, &self.removals)?;
        Ok(())
    }

    /// commit currently checked out
    pub fn head(&self) -> Hash {
        self.refs.head()
    }

    /// read the commit HEAD points at
    pub fn head_commit(&self, repo: &Repo) -> Result<Commit> {
        read_commit(repo, &self.refs.head())
    }

    /// no staged additions and no pending removals
    pub fn is_clean(&self) -> bool {
        self.staging.is_empty() && self.removals.is_empty()
    }

    /// is `name` staged
    pub fn is_staged(&self, name: &str) -> bool {
        self.staging.contains_key(name)
    }

    /// stage `name` at `blob`, cancelling a pending removal
    pub fn stage(&mut self, name: &str, blob: Hash) {
        self.removals.remove(name);
        self.staging.insert(name.to_string(), blob);
    }

    /// drop a staged entry, returning whether one existed
    pub fn unstage(&mut self, name: &str) -> bool {
        self.staging.remove(name).is_some()
    }

    /// mark `name` for removal, dropping any staged version
    pub fn mark_removed(&mut self, name: &str) {
        self.staging.remove(name);
        self.removals.insert(name.to_string());
    }

    /// forget all pending additions and removals
    pub fn clear_pending(&mut self) {
        self.staging.clear();
        self.removals.clear();
    }

    /// move the current branch and HEAD to `commit`
    pub fn advance(&mut self, commit: Hash) {
        let branch = self.current_branch.clone();
        self.refs.advance(&branch, commit);
    }

    /// make `branch` current and move it and HEAD to `commit`
    pub fn switch_to(&mut self, branch: &str, commit: Hash) {
        self.current_branch = branch.to_string();
        self.refs.advance(branch, commit);
    }
}

/// write one state record atomically
fn write_record<T: Serialize>(repo: &Repo, name: &str, value: &T) -> Result<()> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)?;
    write_atomic(repo, &repo.state_path().join(name), &bytes)
}

/// read one state record
fn read_record<T: DeserializeOwned>(repo: &Repo, name: &str) -> Result<T> {
    let path = repo.state_path().join(name);
    let bytes = fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::CorruptState {
                name: name.to_string(),
                message: "record is missing".to_string(),
            }
        } else {
            Error::Io {
                path: path.clone(),
                source: e,
            }
        }
    })?;

    ciborium::from_reader(&bytes[..]).map_err(|e| Error::CorruptState {
        name: name.to_string(),
        message: e.to_string(),
    })
}
