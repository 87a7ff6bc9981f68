//! Atomic file replacement

use cs_core::error::{Result, SentimentError};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Hidden sibling used as the write target before the rename
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Write to a temp file next to `path`, then rename over it.
///
/// Parent directories are created as needed. Readers never observe a
/// partially written file.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            SentimentError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create directory {}: {}", parent.display(), e),
            ))
        })?;
    }

    let temp = temp_path(path);
    let file = fs::File::create(&temp).map_err(|e| {
        SentimentError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create temp file: {}", e),
        ))
    })?;
    let mut writer = BufWriter::new(file);
    let written = write(&mut writer).and_then(|_| writer.flush().map_err(SentimentError::from));
    if let Err(e) = written {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }
    drop(writer);

    fs::rename(&temp, path).map_err(|e| {
        let _ = fs::remove_file(&temp);
        SentimentError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to rename temp file: {}", e),
        ))
    })?;

    debug!("Wrote {:?}", path);
    Ok(())
}

/// Serialize `value` as pretty JSON, atomically
pub(crate) fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, |writer| {
        serde_json::to_writer_pretty(writer, value)?;
        Ok(())
    })
}
