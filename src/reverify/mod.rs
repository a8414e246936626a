//! Re-verification of quarantined conversions.
//!
//! A quarantined output is checked again against a fresh probe of the
//! current original, with a caller-supplied size tolerance and the relaxed
//! content rule (some E-AC-3 track in the target language). Outputs that now
//! pass replace the original, which is kept as a numbered backup.

use crate::conversion::{Baseline, ContentCheck, SizePolicy, ValidationFailure, Validator};
use crate::scanner::Scanner;
use crate::state::{backup_and_promote, StateError};
use anyhow::Result;
use dtsforge_av::TrackProber;
use dtsforge_common::{Artifact, ArtifactKind};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Result of re-verifying one quarantined artifact.
#[derive(Debug)]
pub enum ReverifyOutcome {
    /// No canonical original exists next to the artifact.
    Orphan { original: PathBuf },
    /// The original could not be probed or read.
    BaselineUnavailable(String),
    /// The artifact still fails validation.
    Rejected(ValidationFailure),
    /// The artifact replaced the original.
    Replaced { backup: PathBuf },
    /// Validation passed but the renames failed.
    SwapFailed(StateError),
}

/// Totals for a re-verification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReverifyReport {
    pub examined: usize,
    pub replaced: usize,
    pub skipped: usize,
}

impl ReverifyReport {
    fn record(&mut self, outcome: &ReverifyOutcome) {
        self.examined += 1;
        match outcome {
            ReverifyOutcome::Replaced { .. } => self.replaced += 1,
            _ => self.skipped += 1,
        }
    }

    /// Process exit code: 1 when artifacts were examined but none replaced.
    pub fn exit_code(&self) -> u8 {
        if self.replaced == 0 && self.examined > 0 {
            1
        } else {
            0
        }
    }
}

/// Re-validates quarantined artifacts.
pub struct Reverifier<'a> {
    prober: &'a dyn TrackProber,
    tolerance: f64,
    language: String,
}

impl<'a> Reverifier<'a> {
    /// `tolerance` is a fraction (0.30 = ±30%); `language` is the required E-AC-3 language.
    pub fn new(prober: &'a dyn TrackProber, tolerance: f64, language: impl Into<String>) -> Self {
        Self {
            prober,
            tolerance,
            language: language.into(),
        }
    }

    /// Re-verify one artifact. Returns `None` if it is not quarantined.
    pub fn reverify(&self, artifact: &Artifact) -> Option<ReverifyOutcome> {
        if !matches!(artifact.kind, ArtifactKind::Quarantined { .. }) {
            return None;
        }
        info!(file = %artifact.path.display(), "Found quarantined output");

        let original = &artifact.canonical;
        if !original.exists() {
            warn!(file = %artifact.path.display(), "Original missing: {:?}", original);
            return Some(ReverifyOutcome::Orphan {
                original: original.clone(),
            });
        }

        let size = match std::fs::metadata(original) {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(file = %original.display(), "Size stat failed: {}", e);
                return Some(ReverifyOutcome::BaselineUnavailable(e.to_string()));
            }
        };
        let tracks = match self.prober.probe(original) {
            Ok(info) => info.audio_tracks,
            Err(e) => {
                warn!(file = %original.display(), "Probe failed: {}", e);
                return Some(ReverifyOutcome::BaselineUnavailable(e.to_string()));
            }
        };

        let validation = Validator::new(self.prober).validate(
            Baseline {
                tracks: &tracks,
                size,
            },
            &artifact.path,
            &ContentCheck::LanguageEac3(self.language.clone()),
            SizePolicy::Within(self.tolerance),
        );
        if let Err(reason) = validation {
            return Some(ReverifyOutcome::Rejected(reason));
        }

        Some(match backup_and_promote(original, &artifact.path) {
            Ok(backup) => {
                info!(file = %original.display(), "Replaced original with re-verified output. Backup: {:?}", backup);
                ReverifyOutcome::Replaced { backup }
            }
            Err(e) => {
                error!(file = %original.display(), "Failed to swap files: {}", e);
                ReverifyOutcome::SwapFailed(e)
            }
        })
    }

    /// Re-verify every quarantined artifact under the scanner's root.
    pub fn run(&self, scanner: &Scanner) -> Result<ReverifyReport> {
        let mut report = ReverifyReport::default();
        scanner.walk(|artifact| {
            if let Some(outcome) = self.reverify(artifact) {
                report.record(&outcome);
            }
        })?;

        info!(
            "Re-verification complete. Examined: {} | Replaced: {} | Skipped: {}",
            report.examined, report.replaced, report.skipped
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{track, FakeProber};
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_exit_code() {
        let none = ReverifyReport::default();
        assert_eq!(none.exit_code(), 0);
        let failed = ReverifyReport { examined: 2, replaced: 0, skipped: 2 };
        assert_eq!(failed.exit_code(), 1);
        let some = ReverifyReport { examined: 2, replaced: 1, skipped: 1 };
        assert_eq!(some.exit_code(), 0);
    }

    #[test]
    fn test_orphan_is_skipped() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("movie.BAD_CONVERT.mkv");
        fs::write(&bad, vec![0u8; 100]).unwrap();

        let prober = FakeProber::new();
        let outcome = Reverifier::new(&prober, 0.3, "en").reverify(&Artifact::classify(&bad));
        assert_matches!(outcome, Some(ReverifyOutcome::Orphan { .. }));
        assert!(bad.exists());
    }

    #[test]
    fn test_non_quarantined_ignored() {
        let prober = FakeProber::new();
        let reverifier = Reverifier::new(&prober, 0.3, "en");
        assert!(reverifier
            .reverify(&Artifact::classify(std::path::Path::new("/m/movie.mkv")))
            .is_none());
    }

    #[test]
    fn test_replaces_when_within_variance() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("movie.mkv");
        let bad = dir.path().join("movie.BAD_CONVERT_1.mkv");
        fs::write(&original, vec![0u8; 1000]).unwrap();
        fs::write(&bad, vec![1u8; 780]).unwrap();
        fs::write(dir.path().join("movie.ORIG_BACKUP.mkv"), b"older").unwrap();

        let prober = FakeProber::new()
            .with(&original, vec![track(0, "DTS", "en"), track(1, "AC-3", "fr")])
            .with(&bad, vec![track(0, "E-AC-3", "en"), track(1, "AC-3", "fr")]);

        let outcome = Reverifier::new(&prober, 0.30, "en").reverify(&Artifact::classify(&bad));
        let backup = dir.path().join("movie.ORIG_BACKUP_1.mkv");
        assert_matches!(outcome, Some(ReverifyOutcome::Replaced { backup: ref b }) if *b == backup);
        assert_eq!(fs::read(&original).unwrap().len(), 780);
        assert_eq!(fs::read(&backup).unwrap().len(), 1000);
        assert!(!bad.exists());
    }

    #[test]
    fn test_rejects_outside_variance() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("movie.mkv");
        let bad = dir.path().join("movie.BAD_CONVERT.mkv");
        fs::write(&original, vec![0u8; 1000]).unwrap();
        fs::write(&bad, vec![1u8; 500]).unwrap();

        let prober = FakeProber::new()
            .with(&original, vec![track(0, "DTS", "en")])
            .with(&bad, vec![track(0, "E-AC-3", "en")]);

        let outcome = Reverifier::new(&prober, 0.30, "en").reverify(&Artifact::classify(&bad));
        assert_matches!(
            outcome,
            Some(ReverifyOutcome::Rejected(ValidationFailure::SizeOutOfRange { .. }))
        );
        assert_eq!(fs::read(&original).unwrap().len(), 1000);
        assert!(bad.exists());
    }
}
