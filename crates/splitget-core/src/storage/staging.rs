//! Staged destination file: created under `.part`, renamed on success.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Builder for the staging file. Call `preallocate` then `build`.
pub struct StagingFileBuilder {
    file: File,
    path: PathBuf,
}

impl StagingFileBuilder {
    /// Create (or truncate) the staging file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(StagingFileBuilder {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Reserve `size` bytes up front so a full disk fails before copying
    /// starts. Uses `posix_fallocate` on Unix, `set_len` otherwise or on failure.
    pub fn preallocate(&mut self, size: u64) -> io::Result<()> {
        if size == 0 {
            return Ok(());
        }
        #[cfg(unix)]
        {
            let fd = self.file.as_raw_fd();
            let r = unsafe { libc::posix_fallocate(fd, 0, size as libc::off_t) };
            if r == 0 {
                return Ok(());
            }
            tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
        }
        self.file.set_len(size)
    }

    pub fn build(self) -> StagingFile {
        StagingFile {
            out: BufWriter::new(self.file),
            path: self.path,
            written: 0,
        }
    }
}

/// Sequential writer for the staged destination.
pub struct StagingFile {
    out: BufWriter<File>,
    path: PathBuf,
    written: u64,
}

impl StagingFile {
    /// Append everything `reader` yields; returns the bytes copied.
    pub fn append_from(&mut self, reader: &mut impl io::Read) -> io::Result<u64> {
        let n = io::copy(reader, &mut self.out)?;
        self.written += n;
        Ok(n)
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush, fsync, trim to the bytes actually written and rename onto
    /// `final_path`. Consumes the writer and closes the file.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        let StagingFile { out, path, written } = self;
        let file = out.into_inner().map_err(|e| e.into_error())?;
        file.set_len(written)?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&path, final_path)
    }
}
