//! # dtsforge-av
//!
//! Audio track probing and E-AC-3 transcoding for dtsforge.
//!
//! This crate provides functionality for:
//! - Listing the audio tracks of a media file with mediainfo or ffprobe
//! - Classifying DTS tracks as lossless (DTS-HD MA, DTS:X)
//! - Building and running the ffmpeg command that converts one track to E-AC-3
//!
//! ## Features
//!
//! - `transcode` (default) - E-AC-3 conversion commands using ffmpeg
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use dtsforge_av::{AutoProber, TrackProber};
//! use std::path::Path;
//!
//! let info = AutoProber::default().probe(Path::new("/path/to/video.mkv"))?;
//! for track in &info.audio_tracks {
//!     println!("{}", track);
//! }
//! # Ok::<(), dtsforge_av::Error>(())
//! ```

mod error;
pub mod probe;
pub mod tools;

#[cfg(feature = "transcode")]
pub mod actions;

// Re-exports
pub use error::{Error, Result};
pub use probe::{
    AudioTrack, AutoProber, FfprobeProber, LosslessDetector, MediaInfo, MediaInfoProber,
    TrackProber,
};
pub use tools::{
    can_convert, check_tools, find_on_path, get_tool_path, Tool, ToolInfo, ToolLocations,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend to use for probing media files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeBackend {
    /// mediainfo first, ffprobe when it fails
    #[default]
    Auto,
    /// Use mediainfo CLI only
    MediaInfo,
    /// Use ffprobe CLI only
    Ffprobe,
}

impl fmt::Display for ProbeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::MediaInfo => write!(f, "mediainfo"),
            Self::Ffprobe => write!(f, "ffprobe"),
        }
    }
}

impl FromStr for ProbeBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "mediainfo" => Ok(Self::MediaInfo),
            "ffprobe" => Ok(Self::Ffprobe),
            other => Err(Error::InvalidInput(format!("unknown probe backend: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_backend_from_str() {
        assert_eq!("MediaInfo".parse::<ProbeBackend>().unwrap(), ProbeBackend::MediaInfo);
        assert_eq!("ffprobe".parse::<ProbeBackend>().unwrap(), ProbeBackend::Ffprobe);
        assert!("native".parse::<ProbeBackend>().is_err());
    }

    #[test]
    fn test_probe_backend_display_roundtrips() {
        for backend in [ProbeBackend::Auto, ProbeBackend::MediaInfo, ProbeBackend::Ffprobe] {
            assert_eq!(backend.to_string().parse::<ProbeBackend>().unwrap(), backend);
        }
    }
}
