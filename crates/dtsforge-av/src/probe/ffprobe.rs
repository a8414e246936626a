//! FFprobe-based audio track probing.

use super::lossless::LosslessDetector;
use super::types::*;
use super::{run_tool, TrackProber};
use crate::{Error, Result};
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: String,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    profile: Option<String>,
    channels: Option<u32>,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
    title: Option<String>,
}

/// Probes audio tracks with the `ffprobe` CLI (JSON output).
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    binary: PathBuf,
    detector: LosslessDetector,
}

impl FfprobeProber {
    /// Create a prober that runs `binary` and classifies DTS with `detector`.
    pub fn new(binary: impl Into<PathBuf>, detector: LosslessDetector) -> Self {
        Self {
            binary: binary.into(),
            detector,
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe", LosslessDetector::default())
    }
}

impl TrackProber for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }

        let args = [
            OsStr::new("-v"),
            OsStr::new("quiet"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            OsStr::new("-show_format"),
            OsStr::new("-show_streams"),
            OsStr::new("-select_streams"),
            OsStr::new("a"),
            path.as_os_str(),
        ];
        let stdout = run_tool("ffprobe", &self.binary, &args)?;

        let json_str = String::from_utf8(stdout)
            .map_err(|e| Error::parse_error("ffprobe", format!("Invalid UTF-8: {}", e)))?;

        parse_ffprobe_json(path, &json_str, &self.detector)
    }
}

/// Map an ffmpeg codec name onto the MediaInfo `Format` vocabulary.
fn format_from_codec(codec: &str) -> String {
    match codec {
        "dts" => formats::DTS.to_string(),
        "ac3" => formats::AC3.to_string(),
        "eac3" => formats::EAC3.to_string(),
        "aac" => formats::AAC.to_string(),
        "truehd" => formats::TRUEHD.to_string(),
        "flac" => formats::FLAC.to_string(),
        "opus" => formats::OPUS.to_string(),
        "mp2" | "mp3" => formats::MPEG_AUDIO.to_string(),
        c if c.starts_with("pcm_") => formats::PCM.to_string(),
        other => other.to_uppercase(),
    }
}

pub(crate) fn parse_ffprobe_json(
    path: &Path,
    json_str: &str,
    detector: &LosslessDetector,
) -> Result<MediaInfo> {
    let output: FfprobeOutput = serde_json::from_str(json_str)?;
    let format = output
        .format
        .ok_or_else(|| Error::parse_error("ffprobe", "no format section (unreadable file?)"))?;

    let audio_tracks = output
        .streams
        .into_iter()
        .filter(|s| s.codec_type.as_deref() == Some("audio"))
        .enumerate()
        .map(|(i, stream)| {
            let format = format_from_codec(stream.codec_name.as_deref().unwrap_or_default());
            let profile = stream.profile.as_deref().unwrap_or_default();
            AudioTrack {
                index: i as u32,
                lossless: detector.is_lossless(&format, &[profile]),
                format,
                language: normalize_language(stream.tags.language.as_deref()),
                channels: stream.channels,
                title: stream.tags.title,
            }
        })
        .collect();

    Ok(MediaInfo {
        file_path: path.to_path_buf(),
        file_size: format.size.and_then(|s| s.parse().ok()).unwrap_or(0),
        container: format.format_name,
        audio_tracks,
    })
}
