//! Materialising embedded helper sources on disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::SetupError;

/// Tracing target for asset preparation.
const ASSETS_TARGET: &str = "openregex_engines::assets";

/// Writes `contents` to `dir/file_name` unless an identical file exists.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// concurrent reader never observes a partial file.
pub(crate) fn materialise(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf, SetupError> {
    let path = dir.join(file_name);
    if fs::read_to_string(&path).is_ok_and(|existing| existing == contents) {
        return Ok(path);
    }
    write_atomically(dir, &path, contents.as_bytes())?;
    debug!(
        target: ASSETS_TARGET,
        path = %path.display(),
        "materialised helper source"
    );
    Ok(path)
}

/// Writes `bytes` to `path` through a temporary file in `dir`.
pub(crate) fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), SetupError> {
    fs::create_dir_all(dir).map_err(|err| SetupError::io(dir, err))?;
    let mut staged = NamedTempFile::new_in(dir).map_err(|err| SetupError::io(dir, err))?;
    let written = staged.write_all(bytes).and_then(|()| staged.flush());
    written.map_err(|err| SetupError::io(staged.path(), err))?;
    staged
        .persist(path)
        .map_err(|err| SetupError::io(path, err.error))?;
    Ok(())
}
