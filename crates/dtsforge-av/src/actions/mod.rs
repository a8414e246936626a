//! Media processing actions.
//!
//! This module provides the one processing operation dtsforge performs:
//! re-encoding a single audio track to E-AC-3 while stream-copying
//! everything else.
//!
//! - [`ConvertCommand`] builds the ffmpeg invocation
//! - [`render_command_line`] turns any argument vector into shell text
//! - [`Transcoder`] executes a command ([`FfmpegTranscoder`] spawns it)

mod eac3;
mod render;
mod transcode;

pub use eac3::{ConvertCommand, DEFAULT_BITRATE, TARGET_CODEC};
pub use render::{render_command_line, QuoteStyle};
pub use transcode::{FfmpegTranscoder, Transcoder, STDERR_TAIL_CHARS};
