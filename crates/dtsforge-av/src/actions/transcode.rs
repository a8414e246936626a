//! Running conversion commands.

use super::eac3::ConvertCommand;
use crate::error::spawn_error;
use crate::{Error, Result};
use std::process::{Command, Stdio};

/// Maximum number of trailing stderr characters kept in a failure message.
pub const STDERR_TAIL_CHARS: usize = 800;

/// Executes a [`ConvertCommand`] and waits for it to finish.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
pub trait Transcoder: Send + Sync {
    /// Run the command to completion.
    ///
    /// Launch problems are reported as [`Error::ToolNotFound`] or
    /// [`Error::Io`]; a non-zero exit as [`Error::ToolFailed`].
    fn transcode(&self, command: &ConvertCommand) -> Result<()>;
}

impl<T: Transcoder + ?Sized> Transcoder for Box<T> {
    fn transcode(&self, command: &ConvertCommand) -> Result<()> {
        (**self).transcode(command)
    }
}

impl<T: Transcoder + ?Sized> Transcoder for &T {
    fn transcode(&self, command: &ConvertCommand) -> Result<()> {
        (**self).transcode(command)
    }
}

/// Spawns the ffmpeg process described by the command.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegTranscoder;

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, command: &ConvertCommand) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Spawning {:?}", command.program());

        let output = Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error("ffmpeg", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool_failed(
                "ffmpeg",
                format!(
                    "exited with {}: {}",
                    output.status,
                    tail_chars(stderr.trim_end(), STDERR_TAIL_CHARS)
                ),
            ));
        }

        Ok(())
    }
}

/// Last `n` characters of `s`, respecting char boundaries.
fn tail_chars(s: &str, n: usize) -> &str {
    match s.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((idx, _)) if n > 0 => &s[idx..],
        _ if n == 0 => "",
        _ => s,
    }
}
