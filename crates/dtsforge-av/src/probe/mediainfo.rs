//! MediaInfo-based audio track probing.
//!
//! MediaInfo exposes the DTS-HD/DTS:X markers needed for lossless detection
//! more reliably than ffprobe, so it is the preferred backend.

use super::lossless::LosslessDetector;
use super::types::*;
use super::{run_tool, TrackProber};
use crate::{Error, Result};
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct MediaInfoOutput {
    media: Option<MediaInfoMedia>,
}

#[derive(Debug, Deserialize)]
struct MediaInfoMedia {
    #[serde(default)]
    track: Vec<MediaInfoTrack>,
}

#[derive(Debug, Deserialize)]
struct MediaInfoTrack {
    #[serde(rename = "@type")]
    track_type: String,
    #[serde(rename = "Format")]
    format: Option<String>,
    #[serde(rename = "FileSize")]
    file_size: Option<String>,
    #[serde(rename = "Format_Profile")]
    format_profile: Option<String>,
    #[serde(rename = "Format_Commercial")]
    format_commercial: Option<String>,
    #[serde(rename = "Format_Commercial_IfAny")]
    format_commercial_if_any: Option<String>,
    #[serde(rename = "Format_Info")]
    format_info: Option<String>,
    #[serde(rename = "Format_AdditionalFeatures")]
    format_additional_features: Option<String>,
    #[serde(rename = "Channels")]
    channels: Option<String>,
    #[serde(rename = "Language")]
    language: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
}

impl MediaInfoTrack {
    fn descriptors(&self) -> Vec<&str> {
        [
            &self.format_profile,
            &self.format_commercial,
            &self.format_commercial_if_any,
            &self.format_info,
            &self.format_additional_features,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .collect()
    }
}

/// Probes audio tracks with the `mediainfo` CLI (`--Output=JSON`).
#[derive(Debug, Clone)]
pub struct MediaInfoProber {
    binary: PathBuf,
    detector: LosslessDetector,
}

impl MediaInfoProber {
    /// Create a prober that runs `binary` and classifies DTS with `detector`.
    pub fn new(binary: impl Into<PathBuf>, detector: LosslessDetector) -> Self {
        Self {
            binary: binary.into(),
            detector,
        }
    }

    /// Path of the mediainfo executable.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for MediaInfoProber {
    fn default() -> Self {
        Self::new("mediainfo", LosslessDetector::default())
    }
}

impl TrackProber for MediaInfoProber {
    fn name(&self) -> &'static str {
        "mediainfo"
    }

    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }

        let args = [OsStr::new("--Output=JSON"), path.as_os_str()];
        let stdout = run_tool("mediainfo", &self.binary, &args)?;
        if stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::parse_error("mediainfo", "empty output"));
        }

        let json_str = String::from_utf8(stdout)
            .map_err(|e| Error::parse_error("mediainfo", format!("Invalid UTF-8: {}", e)))?;

        parse_mediainfo_json(path, &json_str, &self.detector)
    }
}

pub(crate) fn parse_mediainfo_json(
    path: &Path,
    json_str: &str,
    detector: &LosslessDetector,
) -> Result<MediaInfo> {
    let output: MediaInfoOutput = serde_json::from_str(json_str)?;
    let media = output
        .media
        .ok_or_else(|| Error::parse_error("mediainfo", "no media element (unreadable file?)"))?;

    let mut info = MediaInfo {
        file_path: path.to_path_buf(),
        file_size: 0,
        container: String::new(),
        audio_tracks: Vec::new(),
    };

    let mut audio_index = 0u32;

    for track in media.track {
        match track.track_type.as_str() {
            "General" => {
                info.container = track.format.clone().unwrap_or_default();
                info.file_size = track.file_size.and_then(|s| s.parse().ok()).unwrap_or(0);
            }
            "Audio" => {
                let format = track.format.as_deref().unwrap_or_default().trim().to_string();
                let lossless = detector.is_lossless(&format, &track.descriptors());

                info.audio_tracks.push(AudioTrack {
                    index: audio_index,
                    format,
                    language: normalize_language(track.language.as_deref()),
                    lossless,
                    channels: track.channels.as_deref().and_then(parse_numeric),
                    title: track.title,
                });
                audio_index += 1;
            }
            _ => {}
        }
    }

    Ok(info)
}

fn parse_numeric<T: std::str::FromStr>(s: &str) -> Option<T> {
    // Remove non-numeric suffixes like " channels"
    s.split_whitespace().next().and_then(|n| n.parse().ok())
}
