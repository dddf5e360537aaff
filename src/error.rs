use std::path::PathBuf;

use crate::Hash;

/// error type for twig operations
///
/// user errors carry the exact message shown to the user and leave the
/// repository unchanged. everything else is an infrastructure failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not in an initialized twig directory.")]
    NoRepo(PathBuf),

    #[error("A twig repository already exists in that directory.")]
    RepoExists(PathBuf),

    #[error("File does not exist.")]
    FileNotFound(String),

    #[error("No changes added to the commit.")]
    EmptyCommit,

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No reason to remove the file.")]
    NothingToRemove(String),

    #[error("File does not exist in that commit.")]
    FileNotInCommit(String),

    #[error("No commit with that id exists.")]
    NoSuchCommit(String),

    #[error("Commit id prefix {prefix} is ambiguous ({matches} matches).")]
    AmbiguousCommitId { prefix: String, matches: usize },

    #[error("A branch with that name does not exist.")]
    NoSuchBranch(String),

    #[error("No need to checkout the current branch.")]
    AlreadyCurrent(String),

    #[error("There is an untracked file in the way; delete it or add it first.")]
    UntrackedFileInTheWay(String),

    #[error("A branch with that name already exists.")]
    BranchExists(String),

    #[error("Cannot remove the current branch.")]
    CannotDeleteCurrent(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("Cannot merge a branch with itself.")]
    SelfMerge(String),

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("Found no commit with that message.")]
    NoCommitWithMessage(String),

    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("corrupt object: hash mismatch for {0}")]
    CorruptObject(Hash),

    #[error("corrupt state record {name}: {message}")]
    CorruptState { name: String, message: String },

    #[error("lock contention on repository")]
    LockContention,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cbor serialization error: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("cbor deserialization error: {0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid ignore pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),
}

impl Error {
    /// true for precondition failures reported to the user,
    /// false for storage and environment failures
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::NoRepo(_)
                | Error::RepoExists(_)
                | Error::FileNotFound(_)
                | Error::EmptyCommit
                | Error::EmptyMessage
                | Error::NothingToRemove(_)
                | Error::FileNotInCommit(_)
                | Error::NoSuchCommit(_)
                | Error::AmbiguousCommitId { .. }
                | Error::NoSuchBranch(_)
                | Error::AlreadyCurrent(_)
                | Error::UntrackedFileInTheWay(_)
                | Error::BranchExists(_)
                | Error::CannotDeleteCurrent(_)
                | Error::InvalidBranchName(_)
                | Error::SelfMerge(_)
                | Error::UncommittedChanges
                | Error::NoCommitWithMessage(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
