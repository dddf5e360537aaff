use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hash::{compute_commit_hash, Hash};

/// timestamp layout recorded in commits
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// an immutable snapshot of every tracked file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// parent commit hashes (empty for the root, 1 for linear, 2 for merge)
    pub parents: Vec<Hash>,
    /// commit message
    pub message: String,
    /// local time of creation, formatted with TIMESTAMP_FORMAT
    pub timestamp: String,
    /// file name -> blob hash (BTreeMap keeps the canonical order)
    pub tracked: BTreeMap<String, Hash>,
}

impl Commit {
    /// create a new commit stamped with the current local time
    pub fn new(
        parents: Vec<Hash>,
        message: impl Into<String>,
        tracked: BTreeMap<String, Hash>,
    ) -> Self {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        Self::with_timestamp(parents, message, timestamp, tracked)
    }

    /// create a new commit with explicit timestamp
    pub fn with_timestamp(
        parents: Vec<Hash>,
        message: impl Into<String>,
        timestamp: impl Into<String>,
        tracked: BTreeMap<String, Hash>,
    ) -> Self {
        Self {
            parents,
            message: message.into(),
            timestamp: timestamp.into(),
            tracked,
        }
    }

    /// content address of this commit
    pub fn id(&self) -> Hash {
        compute_commit_hash(&self.tracked, &self.parents, &self.message, &self.timestamp)
    }

    /// first parent, the one history walks follow
    pub fn parent(&self) -> Option<Hash> {
        self.parents.first().copied()
    }

    /// blob tracked under `name`
    pub fn blob_for(&self, name: &str) -> Option<Hash> {
        self.tracked.get(name).copied()
    }

    /// is `name` tracked by this commit
    pub fn tracks(&self, name: &str) -> bool {
        self.tracked.contains_key(name)
    }

    /// is this an initial commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// is this a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
