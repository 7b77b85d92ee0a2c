use std::path::Path;
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::{info, warn};

pub(crate) const TMP_MARKER: &str = ".rlisttmp.";
const STALE_AFTER: Duration = Duration::from_secs(300);

/// Removes temporary siblings of `target` older than [`STALE_AFTER`].
///
/// Fresh temporaries may belong to a concurrent writer and are left alone.
pub(crate) async fn purge_tmp(directory: &Path, target: &str) {
    let prefix = format!("{target}{TMP_MARKER}");
    let now = SystemTime::now();

    let mut entries = match fs::read_dir(directory).await {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %directory.display(), error = %err, "Temp file scan failed");
            return;
        },
    };

    let mut removed = 0usize;
    let mut failed = 0usize;

    while let Ok(Some(entry)) = entries.next_entry().await {
        let is_candidate = entry.file_name().to_str().is_some_and(|name| name.starts_with(&prefix));
        if !is_candidate {
            continue;
        }

        let Ok(metadata) = entry.metadata().await else { continue };
        if !metadata.is_file() || !is_stale(&metadata, now) {
            continue;
        }

        match fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "Temp file removal failed");
                failed += 1;
            },
        }
    }

    if removed > 0 || failed > 0 {
        info!(removed, failed, "Cleaned up temporary snapshot files");
    }
}

fn is_stale(metadata: &std::fs::Metadata, now: SystemTime) -> bool {
    metadata
        .modified()
        .ok()
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > STALE_AFTER)
}
