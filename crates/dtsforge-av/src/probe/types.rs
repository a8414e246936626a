//! Media information types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Codec identifiers as reported by MediaInfo's `Format` field.
///
/// The ffprobe backend maps its codec names onto the same strings so the
/// selection rules never need to know which backend produced a track.
pub mod formats {
    pub const DTS: &str = "DTS";
    pub const AC3: &str = "AC-3";
    pub const EAC3: &str = "E-AC-3";
    pub const AAC: &str = "AAC";
    pub const TRUEHD: &str = "MLP FBA";
    pub const FLAC: &str = "FLAC";
    pub const OPUS: &str = "Opus";
    pub const MPEG_AUDIO: &str = "MPEG Audio";
    pub const PCM: &str = "PCM";
}

/// Language code used when a track carries no language tag.
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// Audio-centric information about a media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Path to the media file.
    pub file_path: PathBuf,
    /// File size in bytes as reported by the probe (0 if unknown).
    pub file_size: u64,
    /// Container format (e.g., "Matroska", "MPEG-4").
    pub container: String,
    /// Audio tracks in stream order.
    pub audio_tracks: Vec<AudioTrack>,
}

/// Information about an audio track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Position among the file's audio tracks (the `a:<index>` ffmpeg specifier).
    pub index: u32,
    /// Codec identifier (e.g., "DTS", "AC-3", "E-AC-3", "AAC").
    pub format: String,
    /// Lowercased ISO 639-1 code where known, otherwise the raw tag or "und".
    pub language: String,
    /// Whether this is a lossless DTS variant (DTS-HD MA, DTS:X).
    pub lossless: bool,
    /// Number of channels.
    pub channels: Option<u32>,
    /// Track title.
    pub title: Option<String>,
}

impl AudioTrack {
    /// Create a track with just the fields the selection rules look at.
    pub fn new(index: u32, format: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            index,
            format: format.into(),
            language: normalize_language(Some(&language.into())),
            lossless: false,
            channels: None,
            title: None,
        }
    }

    /// Mark the track as lossless.
    pub fn lossless(mut self) -> Self {
        self.lossless = true;
        self
    }

    /// Case-insensitive format comparison.
    pub fn is_format(&self, format: &str) -> bool {
        self.format.eq_ignore_ascii_case(format)
    }

    /// Whether this is a DTS track (any variant).
    pub fn is_dts(&self) -> bool {
        self.is_format(formats::DTS)
    }

    /// Whether this is an E-AC-3 track.
    pub fn is_eac3(&self) -> bool {
        self.is_format(formats::EAC3)
    }

    /// Whether the track language matches `code` after normalisation.
    pub fn is_language(&self, code: &str) -> bool {
        self.language == normalize_language(Some(code))
    }
}

impl MediaInfo {
    /// Number of audio tracks.
    pub fn track_count(&self) -> usize {
        self.audio_tracks.len()
    }

    /// Get an audio track by its audio index.
    pub fn audio_track(&self, index: usize) -> Option<&AudioTrack> {
        self.audio_tracks.get(index)
    }
}

impl std::fmt::Display for AudioTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let format = if self.format.is_empty() {
            "?"
        } else {
            self.format.as_str()
        };
        write!(
            f,
            "index={} format={} language={}",
            self.index, format, self.language
        )?;
        if self.is_dts() && self.lossless {
            write!(f, " (lossless DTS-HD)")?;
        }
        Ok(())
    }
}

/// ISO 639-2 codes (bibliographic and terminologic) mapped to ISO 639-1.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("eng", "en"),
    ("english", "en"),
    ("fre", "fr"),
    ("fra", "fr"),
    ("ger", "de"),
    ("deu", "de"),
    ("spa", "es"),
    ("ita", "it"),
    ("por", "pt"),
    ("jpn", "ja"),
    ("chi", "zh"),
    ("zho", "zh"),
    ("kor", "ko"),
    ("rus", "ru"),
    ("dut", "nl"),
    ("nld", "nl"),
    ("swe", "sv"),
    ("nor", "no"),
    ("dan", "da"),
    ("fin", "fi"),
    ("pol", "pl"),
];

/// Normalise a language tag to a lowercased short code.
///
/// Region subtags are dropped (`en-US` becomes `en`), common three-letter
/// codes are mapped to two letters, and a missing or empty tag becomes `und`.
///
/// # Example
///
/// ```
/// use dtsforge_av::probe::normalize_language;
///
/// assert_eq!(normalize_language(Some("eng")), "en");
/// assert_eq!(normalize_language(Some("en-GB")), "en");
/// assert_eq!(normalize_language(None), "und");
/// ```
pub fn normalize_language(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return UNDETERMINED_LANGUAGE.to_string();
    };

    let lower = raw.to_lowercase();
    let primary = lower
        .split(['-', '_'])
        .next()
        .unwrap_or(lower.as_str())
        .to_string();

    LANGUAGE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == primary)
        .map(|(_, code)| (*code).to_string())
        .unwrap_or(primary)
}
