pub mod atomic;
pub mod worktree;

pub use atomic::{fsync_dir, write_atomic};
pub use worktree::{
    list_files, normalize_name, read_file, remove_file, work_file_exists, write_file,
};
