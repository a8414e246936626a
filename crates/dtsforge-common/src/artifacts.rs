//! Sibling artifacts produced while converting a media file.
//!
//! A title's on-disk state is encoded purely in filenames next to the
//! canonical file:
//!
//! | state       | name                                                       |
//! |-------------|------------------------------------------------------------|
//! | original    | `<stem><ext>`                                              |
//! | temporary   | `<stem>.temp<ext>`                                         |
//! | quarantined | `<stem>.BAD_CONVERT<ext>` or `<stem>.BAD_CONVERT_<N><ext>` |
//! | backup      | `<stem>.ORIG_BACKUP<ext>` or `<stem>.ORIG_BACKUP_<N><ext>` |
//!
//! Markers are recognised case-insensitively but always written in the case
//! shown above, so libraries touched by earlier runs keep working.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Marker inserted before the extension of an in-flight conversion output.
pub const TEMP_MARKER: &str = ".temp";
/// Marker for an output that failed validation.
pub const QUARANTINE_MARKER: &str = ".BAD_CONVERT";
/// Marker for an original displaced by a re-verified output.
pub const BACKUP_MARKER: &str = ".ORIG_BACKUP";

/// Which state a file on disk represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Canonical media file.
    Original,
    /// Output of a conversion that has not been validated yet.
    Temporary,
    /// Output that failed validation, kept for re-verification.
    Quarantined { serial: Option<u32> },
    /// Original displaced by a promoted quarantined output.
    Backup { serial: Option<u32> },
}

impl ArtifactKind {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Original => "original",
            ArtifactKind::Temporary => "temporary",
            ArtifactKind::Quarantined { .. } => "quarantined",
            ArtifactKind::Backup { .. } => "backup",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A file classified by its name, together with the canonical path it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path of the file itself.
    pub path: PathBuf,
    /// State encoded in the filename.
    pub kind: ArtifactKind,
    /// Path of the canonical original for this title (equal to `path` for originals).
    pub canonical: PathBuf,
}

impl Artifact {
    /// Classify a path by its filename.
    ///
    /// # Examples
    ///
    /// ```
    /// use dtsforge_common::{Artifact, ArtifactKind};
    /// use std::path::Path;
    ///
    /// let temp = Artifact::classify(Path::new("/m/My Movie.temp.mkv"));
    /// assert_eq!(temp.kind, ArtifactKind::Temporary);
    /// assert_eq!(temp.canonical, Path::new("/m/My Movie.mkv"));
    /// ```
    pub fn classify(path: &Path) -> Self {
        let parsed = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_name);

        match parsed {
            Some((kind, canonical_name)) => Self {
                path: path.to_path_buf(),
                kind,
                canonical: path.with_file_name(canonical_name),
            },
            None => Self {
                path: path.to_path_buf(),
                kind: ArtifactKind::Original,
                canonical: path.to_path_buf(),
            },
        }
    }

    /// Whether this file is a canonical original.
    pub fn is_original(&self) -> bool {
        self.kind == ArtifactKind::Original
    }
}

/// Split `name` into `(stem, ext)` where `ext` keeps its leading dot.
fn split_extension(name: &str) -> Option<(&str, &str)> {
    let dot = name.rfind('.')?;
    if dot == 0 || dot + 1 == name.len() {
        return None;
    }
    Some(name.split_at(dot))
}

/// Find `marker` at the end of `stem` (optionally followed by `_<N>`), case-insensitively.
///
/// Returns the base stem and the serial, if any.
fn strip_marker<'a>(stem: &'a str, marker: &str, numbered: bool) -> Option<(&'a str, Option<u32>)> {
    let lower = stem.to_ascii_lowercase();
    let marker_lower = marker.to_ascii_lowercase();
    let at = lower.rfind(&marker_lower)?;
    let base = &stem[..at];
    if base.is_empty() {
        return None;
    }

    let rest = &stem[at + marker.len()..];
    if rest.is_empty() {
        return Some((base, None));
    }
    if !numbered {
        return None;
    }

    let digits = rest.strip_prefix('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|n| (base, Some(n)))
}

fn parse_name(name: &str) -> Option<(ArtifactKind, String)> {
    let (stem, ext) = split_extension(name)?;

    if let Some((base, _)) = strip_marker(stem, TEMP_MARKER, false) {
        return Some((ArtifactKind::Temporary, format!("{base}{ext}")));
    }
    if let Some((base, serial)) = strip_marker(stem, QUARANTINE_MARKER, true) {
        return Some((ArtifactKind::Quarantined { serial }, format!("{base}{ext}")));
    }
    if let Some((base, serial)) = strip_marker(stem, BACKUP_MARKER, true) {
        return Some((ArtifactKind::Backup { serial }, format!("{base}{ext}")));
    }
    None
}

/// Build `<stem><marker>[_<serial>]<ext>` next to `original`.
fn sibling(original: &Path, marker: &str, serial: Option<u32>) -> PathBuf {
    let mut name = OsString::new();
    if let Some(stem) = original.file_stem() {
        name.push(stem);
    }
    name.push(marker);
    if let Some(n) = serial {
        name.push(format!("_{n}"));
    }
    if let Some(ext) = original.extension() {
        name.push(".");
        name.push(ext);
    }
    original.with_file_name(name)
}

/// First of `<marker>`, `<marker>_1`, `<marker>_2`, ... that does not exist yet.
fn next_free(original: &Path, marker: &str) -> PathBuf {
    let plain = sibling(original, marker, None);
    if !plain.exists() {
        return plain;
    }
    (1u32..)
        .map(|n| sibling(original, marker, Some(n)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(plain)
}

/// Temporary output path for a conversion of `original` (`<stem>.temp<ext>`).
pub fn temp_path(original: &Path) -> PathBuf {
    sibling(original, TEMP_MARKER, None)
}

/// Quarantine path with an explicit serial.
pub fn quarantine_path(original: &Path, serial: Option<u32>) -> PathBuf {
    sibling(original, QUARANTINE_MARKER, serial)
}

/// Backup path with an explicit serial.
pub fn backup_path(original: &Path, serial: Option<u32>) -> PathBuf {
    sibling(original, BACKUP_MARKER, serial)
}

/// Quarantine path for `original` that does not collide with an existing file.
pub fn next_quarantine_path(original: &Path) -> PathBuf {
    next_free(original, QUARANTINE_MARKER)
}

/// Backup path for `original` that does not collide with an existing file.
pub fn next_backup_path(original: &Path) -> PathBuf {
    next_free(original, BACKUP_MARKER)
}
