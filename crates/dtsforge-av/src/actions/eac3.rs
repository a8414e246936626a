//! E-AC-3 conversion command.

use super::render::{render_command_line, QuoteStyle};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// ffmpeg encoder used for the converted track.
pub const TARGET_CODEC: &str = "eac3";

/// Bitrate for the converted track.
pub const DEFAULT_BITRATE: &str = "640k";

/// An ffmpeg invocation that converts one audio track to E-AC-3.
///
/// All streams are mapped and stream-copied; only audio track `track_index`
/// is re-encoded. `-n` makes ffmpeg fail instead of overwriting an existing
/// output file.
///
/// # Example
///
/// ```
/// use dtsforge_av::actions::{ConvertCommand, QuoteStyle};
///
/// let cmd = ConvertCommand::new("ffmpeg", "/m/movie.mkv", "/m/movie.temp.mkv", 1);
/// assert_eq!(
///     cmd.render(QuoteStyle::Sh),
///     "ffmpeg -i /m/movie.mkv -map 0 -c copy -c:a:1 eac3 -b:a:1 640k -n /m/movie.temp.mkv"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertCommand {
    program: PathBuf,
    input: PathBuf,
    output: PathBuf,
    track_index: u32,
    bitrate: String,
}

impl ConvertCommand {
    /// Build the command for `input` → `output`, converting audio track `track_index`.
    pub fn new(
        program: impl Into<PathBuf>,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        track_index: u32,
    ) -> Self {
        Self {
            program: program.into(),
            input: input.into(),
            output: output.into(),
            track_index,
            bitrate: DEFAULT_BITRATE.to_string(),
        }
    }

    /// Override the target bitrate (ffmpeg syntax, e.g. `"768k"`).
    pub fn with_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.bitrate = bitrate.into();
        self
    }

    /// Path of the ffmpeg executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Source media file.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Output file the tool writes.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Audio track being converted.
    pub fn track_index(&self) -> u32 {
        self.track_index
    }

    /// Target bitrate.
    pub fn bitrate(&self) -> &str {
        &self.bitrate
    }

    /// Arguments passed to the program (without the program itself).
    pub fn args(&self) -> Vec<OsString> {
        let k = self.track_index;
        vec![
            "-i".into(),
            self.input.clone().into_os_string(),
            "-map".into(),
            "0".into(),
            "-c".into(),
            "copy".into(),
            format!("-c:a:{k}").into(),
            TARGET_CODEC.into(),
            format!("-b:a:{k}").into(),
            self.bitrate.clone().into(),
            "-n".into(),
            self.output.clone().into_os_string(),
        ]
    }

    /// Full argument vector, program first.
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(13);
        argv.push(self.program.clone().into_os_string());
        argv.extend(self.args());
        argv
    }

    /// Command line text, identical for logging, batch files and execution.
    pub fn render(&self, style: QuoteStyle) -> String {
        render_command_line(&self.argv(), style)
    }
}
