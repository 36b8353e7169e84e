//! Where the finished file goes and where its session directory lives.

use std::path::{Path, PathBuf};

use super::DownloadRequest;
use crate::transport::ProbeResult;
use crate::url_model::derive_filename;

/// Destination for `request`: the explicit path, or a derived filename inside
/// the output directory (or inside the explicit path when it is a directory).
pub(crate) fn resolve_destination(request: &DownloadRequest, probe: &ProbeResult) -> PathBuf {
    let derived = || {
        let url = probe.effective_url.as_deref().unwrap_or(&request.url);
        derive_filename(url, probe.suggested_filename.as_deref())
    };
    match &request.destination {
        Some(path) if path.is_dir() => path.join(derived()),
        Some(path) => path.clone(),
        None => request.output_dir.join(derived()),
    }
}

/// Parent for the session directory: `temp_dir` if configured, else the
/// destination's own directory.
pub(crate) fn session_parent(temp_dir: Option<&Path>, destination: &Path) -> PathBuf {
    if let Some(dir) = temp_dir {
        return dir.to_path_buf();
    }
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
