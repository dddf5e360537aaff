use crate::error::Result;
use crate::hash::Hash;
use crate::object::{get, object_exists, put, ObjectKind};
use crate::repo::Repo;
use crate::types::Blob;

/// store a file's name and content, returning hash(name, content)
///
/// idempotent: the same (name, content) always lands on the same record.
pub fn put_blob(repo: &Repo, name: &str, content: &[u8]) -> Result<Hash> {
    put(repo, &Blob::new(name, content))
}

/// read a blob from the object store
pub fn read_blob(repo: &Repo, hash: &Hash) -> Result<Blob> {
    get(repo, hash)
}

/// check if a blob exists in the object store
pub fn blob_exists(repo: &Repo, hash: &Hash) -> bool {
    object_exists(repo, ObjectKind::Blob, hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::hash::compute_blob_hash;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_write_and_read_blob() {
        let (_dir, repo) = test_repo();

        let hash = put_blob(&repo, "hello.txt", b"world").unwrap();

        // verify it exists
        assert!(blob_exists(&repo, &hash));

        // read it back
        let blob = read_blob(&repo, &hash).unwrap();
        assert_eq!(blob.name, "hello.txt");
        assert_eq!(blob.content, b"world");
    }

    #[test]
    fn test_blob_deduplication() {
        let (_dir, repo) = test_repo();

        let h1 = put_blob(&repo, "dup.txt", b"duplicate content").unwrap();
        let h2 = put_blob(&repo, "dup.txt", b"duplicate content").unwrap();

        assert_eq!(h1, h2);
        assert_eq!(h1, compute_blob_hash("dup.txt", b"duplicate content"));
    }

    #[test]
    fn test_same_content_different_name() {
        let (_dir, repo) = test_repo();

        let h1 = put_blob(&repo, "a.txt", b"same content").unwrap();
        let h2 = put_blob(&repo, "b.txt", b"same content").unwrap();

        assert_ne!(h1, h2);
        assert!(blob_exists(&repo, &h1));
        assert!(blob_exists(&repo, &h2));
    }

    #[test]
    fn test_read_nonexistent_blob() {
        let (_dir, repo) = test_repo();

        let result = read_blob(&repo, &Hash::ZERO);
        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
    }
}
