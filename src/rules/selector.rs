//! Which audio track, if any, a file gets converted.

use dtsforge_av::probe::{formats, normalize_language};
use dtsforge_av::AudioTrack;
use std::fmt;

/// Outcome of track selection for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Convert audio track `index`.
    Convert { index: u32, lossless: bool },
    /// Leave the file alone.
    Skip(SkipReason),
}

/// Why a file is not converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A track the player already handles is present (formats found, in track order).
    CompatibleFormatPresent(Vec<String>),
    /// The file has no DTS track at all.
    NoDts,
    /// DTS is present, but none of it in the target language.
    DtsNotEnglish,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::CompatibleFormatPresent(found) => {
                write!(f, "compatible audio already present ({})", found.join(", "))
            }
            SkipReason::NoDts => write!(f, "no DTS track"),
            SkipReason::DtsNotEnglish => write!(f, "DTS present but not in target language"),
        }
    }
}

/// Track selection rules.
///
/// Evaluated in order:
/// 1. any compatible format present → skip
/// 2. first DTS track in the target language → convert
/// 3. no DTS at all → skip, otherwise → skip as non-English
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPolicy {
    compatible_formats: Vec<String>,
    target_language: String,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::new([formats::AC3, formats::EAC3, formats::AAC], "en")
    }
}

impl SelectionPolicy {
    pub fn new<I, S>(compatible_formats: I, target_language: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            compatible_formats: compatible_formats
                .into_iter()
                .map(|f| f.as_ref().trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            target_language: normalize_language(Some(target_language)),
        }
    }

    pub fn compatible_formats(&self) -> &[String] {
        &self.compatible_formats
    }

    /// Normalised target language code.
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    fn is_compatible(&self, track: &AudioTrack) -> bool {
        self.compatible_formats.iter().any(|f| track.is_format(f))
    }

    /// Pick the track to convert from `tracks` (in stream order).
    pub fn select(&self, tracks: &[AudioTrack]) -> Selection {
        let mut found: Vec<String> = Vec::new();
        for track in tracks.iter().filter(|t| self.is_compatible(t)) {
            if !found.iter().any(|f| track.is_format(f)) {
                found.push(track.format.clone());
            }
        }
        if !found.is_empty() {
            return Selection::Skip(SkipReason::CompatibleFormatPresent(found));
        }

        if let Some(track) = tracks
            .iter()
            .find(|t| t.is_dts() && t.is_language(&self.target_language))
        {
            return Selection::Convert {
                index: track.index,
                lossless: track.lossless,
            };
        }

        if tracks.iter().any(AudioTrack::is_dts) {
            Selection::Skip(SkipReason::DtsNotEnglish)
        } else {
            Selection::Skip(SkipReason::NoDts)
        }
    }
}

/// Select with the default policy (AC-3/E-AC-3/AAC compatible, English target).
pub fn select_track(tracks: &[AudioTrack]) -> Selection {
    SelectionPolicy::default().select(tracks)
}
