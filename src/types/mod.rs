mod blob;
mod commit;

pub use blob::Blob;
pub use commit::{Commit, TIMESTAMP_FORMAT};
