//! Session temp directory holding one artifact per segment.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::staging::StagingFileBuilder;
use super::staging_path;
use crate::error::AssemblyError;
use crate::segmenter::TransferPlan;

/// Prefix of session directories; the rest of the name is random, so
/// concurrent sessions in the same directory never collide.
const SESSION_DIR_PREFIX: &str = ".splitget-";

/// Session-scoped artifact storage. Dropping it removes whatever is left.
#[derive(Debug)]
pub struct SegmentStore {
    dir: TempDir,
}

impl SegmentStore {
    /// Create a fresh session directory under `parent`.
    pub fn create_in(parent: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(SESSION_DIR_PREFIX)
            .tempdir_in(parent)?;
        tracing::debug!(dir = %dir.path().display(), "session directory created");
        Ok(SegmentStore { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Deterministic artifact path for segment `index`.
    pub fn artifact_path(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("part_{}", index))
    }

    /// Create (truncate) the artifact for segment `index`.
    pub fn create_artifact(&self, index: usize) -> io::Result<File> {
        File::create(self.artifact_path(index))
    }

    /// Remove every artifact and the session directory.
    pub fn purge(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        tracing::debug!(dir = %path.display(), "session directory purged");
        Ok(())
    }

    /// Concatenate artifacts in index order into `destination`.
    ///
    /// Each artifact is checked against its expected length and deleted as
    /// soon as it has been appended. On error the staging file is removed and
    /// the session directory is dropped; `destination` is untouched.
    pub fn assemble(self, plan: &TransferPlan, destination: &Path) -> Result<u64, AssemblyError> {
        let staging = staging_path(destination);
        match self.assemble_into(plan, &staging, destination) {
            Ok(bytes) => {
                let dir = self.path().to_path_buf();
                if let Err(e) = self.purge() {
                    tracing::warn!(dir = %dir.display(), "could not remove session directory: {}", e);
                }
                Ok(bytes)
            }
            Err(e) => {
                if let Err(rm) = fs::remove_file(&staging) {
                    if rm.kind() != io::ErrorKind::NotFound {
                        tracing::warn!(path = %staging.display(), "could not remove staging file: {}", rm);
                    }
                }
                Err(e)
            }
        }
    }

    fn assemble_into(
        &self,
        plan: &TransferPlan,
        staging: &Path,
        destination: &Path,
    ) -> Result<u64, AssemblyError> {
        let dest_err = |source: io::Error| AssemblyError::Destination {
            path: destination.to_path_buf(),
            source,
        };

        let mut builder = StagingFileBuilder::create(staging).map_err(dest_err)?;
        if let Some(total) = plan.total_size {
            builder.preallocate(total).map_err(dest_err)?;
        }
        let mut out = builder.build();

        for task in plan.tasks() {
            let path = self.artifact_path(task.index);
            let mut part = File::open(&path).map_err(|source| AssemblyError::MissingArtifact {
                index: task.index,
                source,
            })?;
            let copied = out.append_from(&mut part).map_err(dest_err)?;
            if let Some(expected) = task.expected_len {
                if copied != expected {
                    return Err(AssemblyError::ShortArtifact {
                        index: task.index,
                        expected,
                        actual: copied,
                    });
                }
            }
            drop(part);
            fs::remove_file(&path).map_err(|source| AssemblyError::MissingArtifact {
                index: task.index,
                source,
            })?;
        }

        let written = out.written();
        out.finalize(destination).map_err(dest_err)?;
        Ok(written)
    }
}
