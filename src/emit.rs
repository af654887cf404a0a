//! Render entries back into a M3U playlist and write it to disk
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::playlist::{m3u, Entry};

#[derive(Debug, thiserror::Error)]
#[error("Failed to write playlist to \"{}\"", .path.display())]
pub struct OutputWriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Render the header, a blank line and then every entry, separated by exactly one blank line.
///
/// Without entries the result is the header followed by a blank line.
pub fn render(entries: &[Entry]) -> String {
    let mut out = String::from(m3u::HEADER);
    out.push_str("\n\n");

    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            out.push_str("\n\n");
        }
        let mut lines = entry.lines();
        if let Some(first) = lines.next() {
            out.push_str(first);
        }
        for line in lines {
            out.push('\n');
            out.push_str(line);
        }
    }
    if !entries.is_empty() {
        out.push('\n');
    }

    out
}

/// Write `content` to `path` as a whole or not at all.
///
/// The parent directory is created if needed. The content goes into a temporary file next to `path`,
/// which is then renamed over the destination.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), OutputWriteError> {
    let to_error = |source: std::io::Error| OutputWriteError {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(to_error)?;

    let mut file = NamedTempFile::new_in(dir).map_err(to_error)?;
    file.write_all(content.as_bytes()).map_err(to_error)?;
    file.as_file().sync_all().map_err(to_error)?;
    file.persist(path).map_err(|err| to_error(err.error))?;

    Ok(())
}
