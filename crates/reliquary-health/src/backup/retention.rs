//! GFS retention: bounded per-category backup counts, pruned oldest-first.

use reliquary_core::config::BackupConfig;
use reliquary_core::models::{BackupCategory, BackupManifest, BackupMetadata};

/// Enforce every category's retention cap against the manifest and the
/// filesystem. Victims are deleted oldest-first; an individual delete
/// failure is logged and the sweep continues. Returns the number of
/// entries dropped from the manifest.
pub fn enforce(manifest: &mut BackupManifest, config: &BackupConfig) -> usize {
    let mut kept: Vec<BackupMetadata> = Vec::with_capacity(manifest.backups.len());
    let mut removed = 0;

    for category in BackupCategory::ALL {
        let mut entries: Vec<BackupMetadata> = manifest
            .backups
            .iter()
            .filter(|b| b.category == category)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let cap = config.cap(category);
        let victims = entries.split_off(entries.len().min(cap));
        kept.extend(entries);

        // Oldest first.
        for victim in victims.into_iter().rev() {
            match std::fs::remove_file(&victim.file_path) {
                Ok(()) => {
                    tracing::info!(
                        "retention: deleted {} backup {}",
                        category.dir_name(),
                        victim.file_path.display()
                    );
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        "retention: failed to delete {}: {e}",
                        victim.file_path.display()
                    );
                }
            }
            removed += 1;
        }
    }

    manifest.backups = kept;
    removed
}
