//! Disk side of a session: per-segment artifacts and the staged destination.
//!
//! Artifacts live in a session-scoped temp directory (`.splitget-XXXXXX`)
//! with one `part_<index>` file per segment. Assembly streams them in index
//! order into `<destination>.part`, then renames it into place, so a readable
//! destination only ever exists complete.

mod segments;
mod staging;

pub use segments::SegmentStore;
pub use staging::{StagingFile, StagingFileBuilder};

use std::path::{Path, PathBuf};

use crate::error::AssemblyError;

/// Temporary suffix of the destination while it is being assembled.
pub const STAGING_SUFFIX: &str = ".part";

/// Staging path for a destination: `file.iso` → `file.iso.part`.
pub fn staging_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(STAGING_SUFFIX);
    PathBuf::from(o)
}

/// Create and remove the staging file for `final_path`, so a destination
/// that cannot be written fails before any byte is fetched.
pub fn check_destination(final_path: &Path) -> std::io::Result<()> {
    let staging = staging_path(final_path);
    drop(StagingFileBuilder::create(&staging)?);
    std::fs::remove_file(&staging)
}

/// Writes an empty destination (zero-length resource), staged like any other.
pub fn write_empty(final_path: &Path) -> Result<(), AssemblyError> {
    let staging = staging_path(final_path);
    StagingFileBuilder::create(&staging)
        .and_then(|b| b.build().finalize(final_path))
        .map_err(|source| {
            let _ = std::fs::remove_file(&staging);
            AssemblyError::Destination {
                path: final_path.to_path_buf(),
                source,
            }
        })
}
