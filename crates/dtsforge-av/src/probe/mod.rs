//! Audio track probing module.
//!
//! This module provides the [`TrackProber`] seam between the conversion
//! pipeline and the external probe tools:
//!
//! - **MediaInfo** (preferred): exposes DTS-HD/DTS:X markers
//! - **ffprobe**: fallback when mediainfo is missing or fails
//! - **Auto**: MediaInfo first, ffprobe second

mod ffprobe;
mod lossless;
mod mediainfo;
mod types;

pub use ffprobe::FfprobeProber;
pub use lossless::{LosslessDetector, DEFAULT_LOSSLESS_KEYWORDS};
pub use mediainfo::MediaInfoProber;
pub use types::*;

use crate::error::spawn_error;
use crate::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

/// Something that can list the audio tracks of a media file.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
pub trait TrackProber: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// Probe a media file and return its audio tracks in stream order.
    fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

impl<P: TrackProber + ?Sized> TrackProber for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        (**self).probe(path)
    }
}

impl<P: TrackProber + ?Sized> TrackProber for &P {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        (**self).probe(path)
    }
}

/// Tries MediaInfo first and falls back to ffprobe.
#[derive(Debug, Clone, Default)]
pub struct AutoProber {
    primary: MediaInfoProber,
    fallback: FfprobeProber,
}

impl AutoProber {
    /// Combine a primary and a fallback prober.
    pub fn new(primary: MediaInfoProber, fallback: FfprobeProber) -> Self {
        Self { primary, fallback }
    }
}

impl TrackProber for AutoProber {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        match self.primary.probe(path) {
            Ok(info) => Ok(info),
            Err(Error::FileNotFound { path }) => Err(Error::FileNotFound { path }),
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("mediainfo failed for {:?}, falling back to ffprobe: {}", path, _e);
                self.fallback.probe(path)
            }
        }
    }
}

/// Run a probe tool and return its stdout, failing on a non-zero exit.
pub(crate) fn run_tool(tool: &str, program: &Path, args: &[&OsStr]) -> Result<Vec<u8>> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| spawn_error(tool, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed(
            tool,
            format!("exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(output.stdout)
}
