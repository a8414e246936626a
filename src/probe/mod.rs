// Re-export probe functionality from dtsforge-av
pub use dtsforge_av::probe::*;
pub use dtsforge_av::{
    can_convert, check_tools, find_on_path, get_tool_path, AudioTrack, MediaInfo, ProbeBackend,
    ToolInfo, ToolLocations, TrackProber,
};

use crate::config::{Config, ToolsConfig};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

fn configured(path: &Option<PathBuf>, name: &str) -> PathBuf {
    path.clone().unwrap_or_else(|| PathBuf::from(name))
}

/// Build the prober selected by `[tools] probe_backend`.
pub fn build_prober(config: &Config) -> Box<dyn TrackProber> {
    let tools = &config.tools;
    let detector = config.conversion.lossless_detector();
    let mediainfo = MediaInfoProber::new(configured(&tools.mediainfo, "mediainfo"), detector.clone());
    let ffprobe = FfprobeProber::new(configured(&tools.ffprobe, "ffprobe"), detector);

    match tools.probe_backend {
        ProbeBackend::Auto => Box::new(AutoProber::new(mediainfo, ffprobe)),
        ProbeBackend::MediaInfo => Box::new(mediainfo),
        ProbeBackend::Ffprobe => Box::new(ffprobe),
    }
}

/// Probe a media file with the configured backend
pub fn probe_file(config: &Config, path: &Path) -> Result<MediaInfo> {
    build_prober(config)
        .probe(path)
        .with_context(|| format!("Failed to probe {:?}", path))
}

/// Resolve the ffmpeg executable, failing if it cannot be found.
pub fn resolve_ffmpeg(tools: &ToolsConfig) -> Result<PathBuf> {
    get_tool_path("ffmpeg", tools.ffmpeg.as_deref()).context("ffmpeg is required for conversion")
}

/// Ensure the configured probe backend has a tool to run.
pub fn require_probe_tools(tools: &ToolsConfig) -> Result<()> {
    let mediainfo = || get_tool_path("mediainfo", tools.mediainfo.as_deref());
    let ffprobe = || get_tool_path("ffprobe", tools.ffprobe.as_deref());

    match tools.probe_backend {
        ProbeBackend::MediaInfo => mediainfo().map(drop).context("mediainfo is required"),
        ProbeBackend::Ffprobe => ffprobe().map(drop).context("ffprobe is required"),
        ProbeBackend::Auto => mediainfo()
            .or_else(|_| ffprobe())
            .map(drop)
            .context("mediainfo or ffprobe is required"),
    }
}

/// Configured tool paths in the shape the tool check expects.
pub fn tool_locations(tools: &ToolsConfig) -> ToolLocations<'_> {
    ToolLocations {
        ffmpeg: tools.ffmpeg.as_deref(),
        ffprobe: tools.ffprobe.as_deref(),
        mediainfo: tools.mediainfo.as_deref(),
    }
}

/// Path of the media inspection tool named in batch files.
pub fn inspector_path(tools: &ToolsConfig) -> PathBuf {
    configured(&tools.mediainfo, "mediainfo")
}
