//! Post-conversion checks run before an original is replaced.

use dtsforge_av::{AudioTrack, TrackProber};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What the converted audio has to look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentCheck {
    /// The track at this index must be E-AC-3 (fresh conversions).
    TargetTrack(u32),
    /// Some E-AC-3 track must carry this language (re-verification).
    LanguageEac3(String),
}

/// How the output size is compared with the original.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizePolicy {
    /// Output must lie within `±fraction` of the original size.
    Within(f64),
    /// No size check.
    Unchecked,
}

impl SizePolicy {
    /// Lossless sources shrink by an unpredictable amount, so they skip the size check.
    pub fn for_source(lossless: bool, tolerance: f64) -> Self {
        if lossless {
            SizePolicy::Unchecked
        } else {
            SizePolicy::Within(tolerance)
        }
    }
}

/// Why a converted file was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ValidationFailure {
    #[error("output missing: {}", path.display())]
    MissingOutput { path: PathBuf },

    #[error("output is zero bytes: {}", path.display())]
    EmptyOutput { path: PathBuf },

    #[error("cannot read output: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "size variance exceeded: original={original} new={candidate} diff={} allowed=±{:.1}%",
        size_delta(.original, .candidate),
        .tolerance * 100.0
    )]
    SizeOutOfRange {
        original: u64,
        candidate: u64,
        tolerance: f64,
    },

    #[error("probe failed on output: {0}")]
    ProbeFailed(String),

    #[error("audio track count changed (original={original}, new={candidate})")]
    TrackCountChanged { original: usize, candidate: usize },

    #[error("no E-AC-3 track in output")]
    NoEac3,

    #[error("target index {index} out of range in output ({count} audio tracks)")]
    TargetOutOfRange { index: u32, count: usize },

    #[error("track {index} is {format}, expected E-AC-3")]
    TargetNotEac3 { index: u32, format: String },

    #[error("no E-AC-3 track with language '{language}'")]
    NoLanguageEac3 { language: String },
}

/// Signed size difference in MB plus the absolute percentage, e.g. `-12.50 MB (4.17%)`.
pub fn size_delta(original: &u64, candidate: &u64) -> String {
    let diff = *candidate as i128 - *original as i128;
    let sign = match diff.signum() {
        1 => "+",
        -1 => "-",
        _ => "",
    };
    let diff_mb = diff.unsigned_abs() as f64 / (1024.0 * 1024.0);
    let percent = if *original == 0 {
        0.0
    } else {
        diff.unsigned_abs() as f64 / *original as f64 * 100.0
    };
    format!("{sign}{diff_mb:.2} MB ({percent:.2}%)")
}

/// The state of the original the output is compared against.
#[derive(Debug, Clone, Copy)]
pub struct Baseline<'a> {
    pub tracks: &'a [AudioTrack],
    pub size: u64,
}

/// Runs the post-conversion checks. First failure wins.
pub struct Validator<'a> {
    prober: &'a dyn TrackProber,
}

impl<'a> Validator<'a> {
    pub fn new(prober: &'a dyn TrackProber) -> Self {
        Self { prober }
    }

    /// Check `candidate` against `baseline`.
    ///
    /// Any failure to read or probe the candidate counts as a rejection.
    pub fn validate(
        &self,
        baseline: Baseline<'_>,
        candidate: &Path,
        content: &ContentCheck,
        size: SizePolicy,
    ) -> Result<(), ValidationFailure> {
        let result = self.run_checks(baseline, candidate, content, size);
        match &result {
            Ok(()) => debug!(file = %candidate.display(), "Validation passed"),
            Err(reason) => warn!(file = %candidate.display(), "Validation failed: {}", reason),
        }
        result
    }

    fn run_checks(
        &self,
        baseline: Baseline<'_>,
        candidate: &Path,
        content: &ContentCheck,
        size: SizePolicy,
    ) -> Result<(), ValidationFailure> {
        let candidate_size = match std::fs::metadata(candidate) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ValidationFailure::MissingOutput {
                    path: candidate.to_path_buf(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        if candidate_size == 0 {
            return Err(ValidationFailure::EmptyOutput {
                path: candidate.to_path_buf(),
            });
        }

        if let SizePolicy::Within(tolerance) = size {
            let original = baseline.size as f64;
            let lower = (1.0 - tolerance) * original;
            let upper = (1.0 + tolerance) * original;
            let actual = candidate_size as f64;
            if actual < lower || actual > upper {
                return Err(ValidationFailure::SizeOutOfRange {
                    original: baseline.size,
                    candidate: candidate_size,
                    tolerance,
                });
            }
        }

        let probed = self
            .prober
            .probe(candidate)
            .map_err(|e| ValidationFailure::ProbeFailed(e.to_string()))?;
        let tracks = &probed.audio_tracks;

        if tracks.len() != baseline.tracks.len() {
            return Err(ValidationFailure::TrackCountChanged {
                original: baseline.tracks.len(),
                candidate: tracks.len(),
            });
        }

        if !tracks.iter().any(AudioTrack::is_eac3) {
            return Err(ValidationFailure::NoEac3);
        }

        match content {
            ContentCheck::TargetTrack(index) => {
                let track = probed.audio_track(*index as usize).ok_or(
                    ValidationFailure::TargetOutOfRange {
                        index: *index,
                        count: tracks.len(),
                    },
                )?;
                if !track.is_eac3() {
                    return Err(ValidationFailure::TargetNotEac3 {
                        index: *index,
                        format: track.format.clone(),
                    });
                }
            }
            ContentCheck::LanguageEac3(language) => {
                if !tracks.iter().any(|t| t.is_eac3() && t.is_language(language)) {
                    return Err(ValidationFailure::NoLanguageEac3 {
                        language: language.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
