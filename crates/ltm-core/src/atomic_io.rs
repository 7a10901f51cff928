use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::time_utils::current_unix_timestamp_ms;

/// Writes `content` to `path` through a sibling temp file plus rename, so a
/// crashed writer never leaves a half-written snapshot in the ledger.
pub fn write_text_atomic(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("snapshot destination path is empty");
    }
    if path.is_dir() {
        bail!("snapshot destination '{}' is a directory", path.display());
    }

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create ledger directory {}", parent.display()))?;

    let stem = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("snapshot");
    let temp_path = parent.join(format!(
        ".{stem}.{}-{}.tmp",
        std::process::id(),
        current_unix_timestamp_ms()
    ));

    std::fs::write(&temp_path, content)
        .with_context(|| format!("failed to stage snapshot at {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path).with_context(|| {
        format!(
            "failed to move staged snapshot {} into place at {}",
            temp_path.display(),
            path.display()
        )
    })?;
    Ok(())
}
