use std::fs::File;
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};

/// name of the repository directory inside the working tree
pub const REPO_DIR: &str = ".twig";

/// a twig repository: a working tree plus its `.twig` directory
pub struct Repo {
    work_dir: PathBuf,
    path: PathBuf,
    config: Config,
}

impl Repo {
    /// initialize a new repository in the given working directory
    ///
    /// creates the directory layout, the root commit, the default branch
    /// and empty staging records.
    pub fn init(work_dir: &Path) -> Result<Self> {
        Self::init_with_config(work_dir, Config::default())
    }

    /// initialize with an explicit configuration
    pub fn init_with_config(work_dir: &Path, config: Config) -> Result<Self> {
        let path = work_dir.join(REPO_DIR);
        let config_path = path.join("config.toml");
        if config_path.exists() {
            return Err(Error::RepoExists(work_dir.to_path_buf()));
        }

        // create directory structure
        std::fs::create_dir_all(path.join("objects/blobs")).with_path(&path)?;
        std::fs::create_dir_all(path.join("objects/commits")).with_path(&path)?;
        std::fs::create_dir_all(path.join("state")).with_path(&path)?;
        std::fs::create_dir_all(path.join("tmp")).with_path(&path)?;

        let repo = Self {
            work_dir: work_dir.to_path_buf(),
            path,
            config,
        };

        {
            let _lock = repo.lock()?;
            crate::state::State::initialize(&repo)?;
        }

        // config goes last: its presence marks a complete repository
        repo.config.save(&config_path)?;

        tracing::info!(path = %repo.work_dir.display(), "initialized repository");

        Ok(repo)
    }

    /// open an existing repository rooted at the given working directory
    pub fn open(work_dir: &Path) -> Result<Self> {
        let path = work_dir.join(REPO_DIR);
        let config_path = path.join("config.toml");
        if !config_path.exists() {
            return Err(Error::NoRepo(work_dir.to_path_buf()));
        }

        let config = Config::load(&config_path)?;

        Ok(Self {
            work_dir: work_dir.to_path_buf(),
            path,
            config,
        })
    }

    /// working tree root
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// repository directory (`<work_dir>/.twig`)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// repository configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// mutable access to configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// save configuration changes
    pub fn save_config(&self) -> Result<()> {
        self.config.save(&self.config_path())
    }

    /// path to config.toml
    pub fn config_path(&self) -> PathBuf {
        self.path.join("config.toml")
    }

    /// path to objects directory
    pub fn objects_path(&self) -> PathBuf {
        self.path.join("objects")
    }

    /// path to blobs directory
    pub fn blobs_path(&self) -> PathBuf {
        self.objects_path().join("blobs")
    }

    /// path to commits directory
    pub fn commits_path(&self) -> PathBuf {
        self.objects_path().join("commits")
    }

    /// path to the small mutable state records
    pub fn state_path(&self) -> PathBuf {
        self.path.join("state")
    }

    /// path to tmp directory (for atomic writes)
    pub fn tmp_path(&self) -> PathBuf {
        self.path.join("tmp")
    }

    /// path to lock file
    pub fn lock_path(&self) -> PathBuf {
        self.path.join(".lock")
    }

    /// acquire exclusive lock on repository
    /// returns a guard that releases the lock on drop
    pub fn lock(&self) -> Result<RepoLock> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        let flock = Flock::lock(file, FlockArg::LockExclusiveNonblock)
            .map_err(|_| Error::LockContention)?;

        Ok(RepoLock { flock })
    }
}

/// guard that holds repository lock until dropped
pub struct RepoLock {
    #[allow(dead_code)]
    flock: Flock<File>,
}
// lock is released automatically when Flock is dropped
