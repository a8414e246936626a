use dtsforge_av::actions::QuoteStyle;
use dtsforge_av::probe::{formats, LosslessDetector, DEFAULT_LOSSLESS_KEYWORDS};
use dtsforge_av::ProbeBackend;
use dtsforge_common::paths::video_extensions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::rules::SelectionPolicy;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub conversion: ConversionConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

/// Locations of the external tools. Unset paths are resolved through `PATH`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg: Option<PathBuf>,

    #[serde(default)]
    pub mediainfo: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe: Option<PathBuf>,

    /// Which probe tool to use (auto, mediainfo, ffprobe)
    #[serde(default)]
    pub probe_backend: ProbeBackend,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversionConfig {
    /// Target E-AC-3 bitrate in ffmpeg syntax
    #[serde(default = "default_bitrate")]
    pub bitrate: String,

    /// Language a DTS track must carry to be converted
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Allowed relative size change of a lossy conversion (0.10 = ±10%)
    #[serde(default = "default_size_tolerance")]
    pub size_tolerance: f64,

    /// Audio formats whose presence means the file is already playable
    #[serde(default = "default_compatible_formats")]
    pub compatible_formats: Vec<String>,

    /// Keywords that mark a DTS track as lossless
    #[serde(default = "default_lossless_keywords")]
    pub lossless_keywords: Vec<String>,

    /// File extensions considered media files
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_bitrate() -> String {
    dtsforge_av::actions::DEFAULT_BITRATE.to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_size_tolerance() -> f64 {
    0.10
}

fn default_compatible_formats() -> Vec<String> {
    vec![
        formats::AC3.to_string(),
        formats::EAC3.to_string(),
        formats::AAC.to_string(),
    ]
}

fn default_lossless_keywords() -> Vec<String> {
    DEFAULT_LOSSLESS_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

fn default_extensions() -> Vec<String> {
    video_extensions().iter().map(|e| e.to_string()).collect()
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            bitrate: default_bitrate(),
            target_language: default_target_language(),
            size_tolerance: default_size_tolerance(),
            compatible_formats: default_compatible_formats(),
            lossless_keywords: default_lossless_keywords(),
            extensions: default_extensions(),
        }
    }
}

impl ConversionConfig {
    /// Lossless detector built from the configured keywords.
    pub fn lossless_detector(&self) -> LosslessDetector {
        LosslessDetector::new(&self.lossless_keywords)
    }

    /// Track selection policy built from the configured formats and language.
    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy::new(&self.compatible_formats, &self.target_language)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Script flavor for `--batch` output (cmd or sh)
    #[serde(default)]
    pub flavor: QuoteStyle,
}
