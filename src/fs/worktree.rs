//! plain-file access to the working tree
//!
//! file names are working-tree relative and always use `/` separators.
//! the repository directory itself is never visible through these helpers.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path};

use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result};
use crate::repo::{Repo, REPO_DIR};

/// normalize a user-supplied file name to its working-tree relative form
///
/// `./a/b.txt` becomes `a/b.txt`. absolute paths, `..` components and
/// anything inside the repository directory are rejected as FileNotFound.
pub fn normalize_name(name: &str) -> Result<String> {
    let mut parts = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => match part.to_str() {
                Some(s) => parts.push(s),
                None => return Err(Error::FileNotFound(name.to_string())),
            },
            _ => return Err(Error::FileNotFound(name.to_string())),
        }
    }

    if parts.is_empty() || parts[0] == REPO_DIR {
        return Err(Error::FileNotFound(name.to_string()));
    }

    Ok(parts.join("/"))
}

/// list every plain file in the working tree, minus ignored ones
pub fn list_files(repo: &Repo) -> Result<BTreeSet<String>> {
    let root = repo.work_dir();
    let ignore = repo.config().ignore_patterns()?;
    let mut files = BTreeSet::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.depth() == 1 && e.file_name() == REPO_DIR));

    for entry in walker {
        let entry = entry.map_err(|e| Error::Io {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walkdir error")),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let Some(name) = rel.to_str().map(|s| s.replace(std::path::MAIN_SEPARATOR, "/")) else {
            tracing::warn!(path = %rel.display(), "skipping non utf-8 file name");
            continue;
        };

        if ignore.iter().any(|p| p.matches(&name)) {
            continue;
        }
        files.insert(name);
    }

    Ok(files)
}

/// does `name` exist as a plain file in the working tree
pub fn work_file_exists(repo: &Repo, name: &str) -> bool {
    repo.work_dir().join(name).is_file()
}

/// read a working file, FileNotFound if absent
pub fn read_file(repo: &Repo, name: &str) -> Result<Vec<u8>> {
    let path = repo.work_dir().join(name);
    fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(name.to_string())
        } else {
            Error::Io { path, source: e }
        }
    })
}

/// overwrite (or create) a working file, creating parent directories
pub fn write_file(repo: &Repo, name: &str, content: &[u8]) -> Result<()> {
    let path = repo.work_dir().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }
    fs::write(&path, content).with_path(&path)
}

/// delete a working file if present, pruning directories it leaves empty
pub fn remove_file(repo: &Repo, name: &str) -> Result<()> {
    let root = repo.work_dir();
    let path = root.join(name);

    match fs::remove_file(&path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::Io { path, source: e }),
    }

    let mut dir = path.parent();
    while let Some(d) = dir {
        if d == root {
            break;
        }
        // stops at the first non-empty directory
        if fs::remove_dir(d).is_err() {
            break;
        }
        dir = d.parent();
    }

    Ok(())
}
