//! Shared fakes for integration tests.
//!
//! [`FakeProber`] answers probe calls from a per-path table and
//! [`FakeTranscoder`] writes a stand-in output instead of running ffmpeg.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dtsforge_av::actions::{ConvertCommand, Transcoder};
use dtsforge_av::{AudioTrack, Error, MediaInfo, Result, TrackProber};

pub fn track(index: u32, format: &str, language: &str) -> AudioTrack {
    AudioTrack::new(index, format, language)
}

/// Prober backed by a mutable path → tracks table.
#[derive(Debug, Default)]
pub struct FakeProber {
    tracks: Mutex<HashMap<PathBuf, Vec<AudioTrack>>>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the tracks reported for `path`.
    pub fn set(&self, path: &Path, tracks: Vec<AudioTrack>) {
        self.tracks
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), tracks);
    }
}

impl TrackProber for FakeProber {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let tracks = self
            .tracks
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::parse_error("fake", format!("no tracks for {:?}", path)))?;
        Ok(MediaInfo {
            file_path: path.to_path_buf(),
            file_size: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
            container: "Matroska".to_string(),
            audio_tracks: tracks,
        })
    }
}

/// Transcoder that writes `output_len` zero bytes to the command's output.
#[derive(Debug)]
pub struct FakeTranscoder {
    output_len: Mutex<usize>,
    calls: Mutex<usize>,
}

impl FakeTranscoder {
    pub fn new(output_len: usize) -> Self {
        Self {
            output_len: Mutex::new(output_len),
            calls: Mutex::new(0),
        }
    }

    pub fn set_output_len(&self, len: usize) {
        *self.output_len.lock().unwrap() = len;
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Transcoder for FakeTranscoder {
    fn transcode(&self, command: &ConvertCommand) -> Result<()> {
        *self.calls.lock().unwrap() += 1;
        let len = *self.output_len.lock().unwrap();
        std::fs::write(command.output(), vec![0u8; len])?;
        Ok(())
    }
}

/// Transcoder that refuses to overwrite an existing output, like ffmpeg `-n`.
#[derive(Debug)]
pub struct NoClobberTranscoder {
    output_len: usize,
}

impl NoClobberTranscoder {
    pub fn new(output_len: usize) -> Self {
        Self { output_len }
    }
}

impl Transcoder for NoClobberTranscoder {
    fn transcode(&self, command: &ConvertCommand) -> Result<()> {
        if command.output().exists() {
            return Err(Error::tool_failed(
                "ffmpeg",
                format!("File '{}' already exists. Exiting.", command.output().display()),
            ));
        }
        std::fs::write(command.output(), vec![0u8; self.output_len])?;
        Ok(())
    }
}

/// Write `len` bytes of filler to `path`.
pub fn write_media(path: &Path, len: usize) {
    std::fs::write(path, vec![b'x'; len]).unwrap();
}
