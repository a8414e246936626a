//! On-disk state transitions between a title's sibling artifacts.
//!
//! Every transition is a same-directory rename or a removal; nothing is
//! copied. See [`dtsforge_common::artifacts`] for the naming scheme.

mod reconcile;

pub use reconcile::{reconcile_temp, reconcile_tree, ReconcileReport, TempResolution};

use dtsforge_common::artifacts::{next_backup_path, next_quarantine_path};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A filesystem step of a transition failed.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StateError>;

fn rename(from: &Path, to: &Path) -> Result<()> {
    debug!("Renaming {:?} -> {:?}", from, to);
    std::fs::rename(from, to).map_err(|source| StateError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

fn remove(path: &Path) -> Result<()> {
    debug!("Removing {:?}", path);
    std::fs::remove_file(path).map_err(|source| StateError::Remove {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace `original` with the validated `temp` output.
///
/// If the original cannot be removed the temp output is discarded and the
/// original stays as it was. If the rename fails after the original is gone
/// the temp output is kept, so `clean-temp` can still promote it.
pub fn promote(original: &Path, temp: &Path) -> Result<()> {
    if let Err(e) = remove(original) {
        if let Err(cleanup) = discard(temp) {
            warn!("Could not clean up {:?}: {}", temp, cleanup);
        }
        return Err(e);
    }
    rename(temp, original)
}

/// Move a rejected `temp` output aside as the next free quarantine name of `original`.
///
/// Returns the quarantine path. The original is never touched.
pub fn quarantine(original: &Path, temp: &Path) -> Result<PathBuf> {
    let target = next_quarantine_path(original);
    rename(temp, &target)?;
    Ok(target)
}

/// Remove a leftover temp output. Returns whether a file was removed.
pub fn discard(temp: &Path) -> Result<bool> {
    match std::fs::remove_file(temp) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(StateError::Remove {
            path: temp.to_path_buf(),
            source,
        }),
    }
}

/// Back up the current `original` and promote `quarantined` into its place.
///
/// Returns the backup path. If the second rename fails the backup is moved
/// back so the title keeps its canonical file.
pub fn backup_and_promote(original: &Path, quarantined: &Path) -> Result<PathBuf> {
    let backup = next_backup_path(original);
    rename(original, &backup)?;

    if let Err(e) = rename(quarantined, original) {
        if let Err(restore) = rename(&backup, original) {
            warn!("Could not restore {:?} from {:?}: {}", original, backup, restore);
        }
        return Err(e);
    }

    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_promote_replaces_original() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("movie.mkv");
        let temp = dir.path().join("movie.temp.mkv");
        fs::write(&original, b"dts").unwrap();
        fs::write(&temp, b"eac3").unwrap();

        promote(&original, &temp).unwrap();

        assert_eq!(fs::read(&original).unwrap(), b"eac3");
        assert!(!temp.exists());
    }

    #[test]
    fn test_promote_missing_original_discards_temp() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("gone.mkv");
        let temp = dir.path().join("gone.temp.mkv");
        fs::write(&temp, b"eac3").unwrap();

        let err = promote(&original, &temp).unwrap_err();
        assert!(matches!(err, StateError::Remove { .. }));
        assert!(!temp.exists());
    }

    #[test]
    fn test_quarantine_numbers_on_collision() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("movie.mkv");
        fs::write(&original, b"dts").unwrap();

        for expected in ["movie.BAD_CONVERT.mkv", "movie.BAD_CONVERT_1.mkv", "movie.BAD_CONVERT_2.mkv"] {
            let temp = dir.path().join("movie.temp.mkv");
            fs::write(&temp, b"bad").unwrap();
            let target = quarantine(&original, &temp).unwrap();
            assert_eq!(target, dir.path().join(expected));
            assert!(!temp.exists());
        }
        assert_eq!(fs::read(&original).unwrap(), b"dts");
    }

    #[test]
    fn test_discard() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join("movie.temp.mkv");
        assert!(!discard(&temp).unwrap());
        fs::write(&temp, b"partial").unwrap();
        assert!(discard(&temp).unwrap());
        assert!(!temp.exists());
    }

    #[test]
    fn test_backup_and_promote() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("movie.mkv");
        let bad = dir.path().join("movie.BAD_CONVERT_1.mkv");
        fs::write(&original, b"dts").unwrap();
        fs::write(&bad, b"eac3").unwrap();
        fs::write(dir.path().join("movie.ORIG_BACKUP.mkv"), b"older").unwrap();

        let backup = backup_and_promote(&original, &bad).unwrap();

        assert_eq!(backup, dir.path().join("movie.ORIG_BACKUP_1.mkv"));
        assert_eq!(fs::read(&backup).unwrap(), b"dts");
        assert_eq!(fs::read(&original).unwrap(), b"eac3");
        assert!(!bad.exists());
    }

    #[test]
    fn test_backup_and_promote_restores_on_failure() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("movie.mkv");
        fs::write(&original, b"dts").unwrap();

        let missing = dir.path().join("movie.BAD_CONVERT.mkv");
        let err = backup_and_promote(&original, &missing).unwrap_err();

        assert!(matches!(err, StateError::Rename { .. }));
        assert_eq!(fs::read(&original).unwrap(), b"dts");
        assert!(!dir.path().join("movie.ORIG_BACKUP.mkv").exists());
    }
}
