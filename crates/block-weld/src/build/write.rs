//! Whole-file output writes

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `contents` in one step
///
/// The text goes to a temporary file in the same directory which is then
/// renamed over the target, so readers never see a half-written file.
/// Missing parent directories are created.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    stage(path, contents)?.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Replace several files together
///
/// Every file is staged next to its target before any target is touched.
/// A failure while staging leaves all targets as they were.
pub fn write_all_atomic(files: &[(&Path, &str)]) -> io::Result<()> {
    let staged = files
        .iter()
        .map(|(path, contents)| stage(path, contents))
        .collect::<io::Result<Vec<_>>>()?;

    for (tmp, (path, _)) in staged.into_iter().zip(files) {
        tmp.persist(path).map_err(|e| e.error)?;
    }
    Ok(())
}

fn stage(path: &Path, contents: &str) -> io::Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    Ok(tmp)
}
