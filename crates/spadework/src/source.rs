//! Script Source Acquisition
//!
//! Reads are plain shared reads; editors and the watcher's own notification
//! mechanism can touch the file concurrently. Absence means "skip this
//! reload cycle", never a fatal condition.

use std::path::Path;

/// Read a script's text. Any I/O failure (missing file, permissions, a
/// transient lock) and empty content both yield `None`.
pub async fn read_script(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) if text.is_empty() => {
            tracing::debug!("script {} is empty, skipping", path.display());
            None
        }
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!("could not read script {}: {}", path.display(), e);
            None
        }
    }
}
