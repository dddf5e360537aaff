use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Hash;

/// reserved name for the checked-out commit
pub const HEAD: &str = "HEAD";

/// reserved name for the root commit
pub const INITIAL: &str = "INITIAL";

/// branch name -> commit id, plus the HEAD and INITIAL pointers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefTable {
    head: Hash,
    initial: Hash,
    branches: BTreeMap<String, Hash>,
}

impl RefTable {
    /// table for a fresh repository: one branch, HEAD and INITIAL on the root
    pub fn new(root: Hash, branch: &str) -> Result<Self> {
        validate_branch_name(branch)?;
        let mut branches = BTreeMap::new();
        branches.insert(branch.to_string(), root);
        Ok(Self {
            head: root,
            initial: root,
            branches,
        })
    }

    /// commit currently checked out
    pub fn head(&self) -> Hash {
        self.head
    }

    /// root commit of the repository
    pub fn initial(&self) -> Hash {
        self.initial
    }

    /// commit a branch points at
    pub fn branch(&self, name: &str) -> Result<Hash> {
        self.branches
            .get(name)
            .copied()
            .ok_or_else(|| Error::NoSuchBranch(name.to_string()))
    }

    /// does the branch exist
    pub fn contains(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    /// branch names in ascending order
    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.keys().map(|s| s.as_str()).collect()
    }

    /// create a branch pointing at `at`
    pub fn create_branch(&mut self, name: &str, at: Hash) -> Result<()> {
        validate_branch_name(name)?;
        if self.branches.contains_key(name) {
            return Err(Error::BranchExists(name.to_string()));
        }
        self.branches.insert(name.to_string(), at);
        Ok(())
    }

    /// delete a branch pointer, returning the commit it pointed at
    ///
    /// the commits themselves stay in the object store.
    pub fn delete_branch(&mut self, name: &str, current: &str) -> Result<Hash> {
        if name == current {
            return Err(Error::CannotDeleteCurrent(name.to_string()));
        }
        self.branches
            .remove(name)
            .ok_or_else(|| Error::NoSuchBranch(name.to_string()))
    }

    /// point both HEAD and `branch` at `commit`
    pub fn advance(&mut self, branch: &str, commit: Hash) {
        self.branches.insert(branch.to_string(), commit);
        self.head = commit;
    }

    /// every commit a branch, HEAD or INITIAL points at
    pub fn roots(&self) -> Vec<(String, Hash)> {
        let mut roots = vec![
            (HEAD.to_string(), self.head),
            (INITIAL.to_string(), self.initial),
        ];
        roots.extend(self.branches.iter().map(|(n, h)| (n.clone(), *h)));
        roots
    }
}

/// validate branch name
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidBranchName("empty branch name".to_string()));
    }

    if name == HEAD || name == INITIAL {
        return Err(Error::InvalidBranchName(format!(
            "{} is reserved",
            name
        )));
    }

    if name.starts_with('/') || name.ends_with('/') || name.starts_with('-') {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot start or end with '/' or start with '-': {}",
            name
        )));
    }

    if name.contains("//") {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot contain '//': {}",
            name
        )));
    }

    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot contain whitespace or control characters: {:?}",
            name
        )));
    }

    // check for path traversal
    for component in name.split('/') {
        if component == "." || component == ".." {
            return Err(Error::InvalidBranchName(format!(
                "branch name cannot contain '.' or '..': {}",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: char) -> Hash {
        Hash::from_hex(&byte.to_string().repeat(64)).unwrap()
    }

    #[test]
    fn test_new_table() {
        let table = RefTable::new(hash('1'), "master").unwrap();

        assert_eq!(table.head(), hash('1'));
        assert_eq!(table.initial(), hash('1'));
        assert_eq!(table.branch("master").unwrap(), hash('1'));
        assert_eq!(table.branch_names(), vec!["master"]);
    }

    #[test]
    fn test_create_branch() {
        let mut table = RefTable::new(hash('1'), "master").unwrap();

        table.create_branch("feature", hash('2')).unwrap();
        assert_eq!(table.branch("feature").unwrap(), hash('2'));
        // HEAD does not move
        assert_eq!(table.head(), hash('1'));

        let result = table.create_branch("feature", hash('3'));
        assert!(matches!(result, Err(Error::BranchExists(_))));
        assert_eq!(table.branch("feature").unwrap(), hash('2'));
    }

    #[test]
    fn test_delete_branch() {
        let mut table = RefTable::new(hash('1'), "master").unwrap();
        table.create_branch("old", hash('2')).unwrap();

        let result = table.delete_branch("master", "master");
        assert!(matches!(result, Err(Error::CannotDeleteCurrent(_))));

        assert_eq!(table.delete_branch("old", "master").unwrap(), hash('2'));
        assert!(!table.contains("old"));

        let result = table.delete_branch("old", "master");
        assert!(matches!(result, Err(Error::NoSuchBranch(_))));
    }

    #[test]
    fn test_advance_moves_head_and_branch() {
        let mut table = RefTable::new(hash('1'), "master").unwrap();

        table.advance("master", hash('2'));
        assert_eq!(table.head(), hash('2'));
        assert_eq!(table.branch("master").unwrap(), hash('2'));
        // INITIAL is fixed
        assert_eq!(table.initial(), hash('1'));
    }

    #[test]
    fn test_unknown_branch() {
        let table = RefTable::new(hash('1'), "master").unwrap();
        assert!(matches!(table.branch("nope"), Err(Error::NoSuchBranch(_))));
    }

    #[test]
    fn test_invalid_branch_names() {
        assert!(validate_branch_name("").is_err());
        assert!(validate_branch_name(HEAD).is_err());
        assert!(validate_branch_name(INITIAL).is_err());
        assert!(validate_branch_name("/start").is_err());
        assert!(validate_branch_name("end/").is_err());
        assert!(validate_branch_name("-flag").is_err());
        assert!(validate_branch_name("double//slash").is_err());
        assert!(validate_branch_name("with/./dot").is_err());
        assert!(validate_branch_name("with/../dotdot").is_err());
        assert!(validate_branch_name("has space").is_err());
        assert!(validate_branch_name("with\0null").is_err());

        // valid names
        assert!(validate_branch_name("master").is_ok());
        assert!(validate_branch_name("feature/login").is_ok());
        assert!(validate_branch_name("release-1.0").is_ok());
    }

    #[test]
    fn test_table_cbor_roundtrip() {
        let mut table = RefTable::new(hash('1'), "master").unwrap();
        table.create_branch("dev", hash('2')).unwrap();

        let mut bytes = Vec::new();
        ciborium::into_writer(&table, &mut bytes).unwrap();
        let parsed: RefTable = ciborium::from_reader(&bytes[..]).unwrap();

        assert_eq!(table, parsed);
    }
}
