use dtsforge_av::actions::{ConvertCommand, Transcoder};
use dtsforge_av::{AudioTrack, Error, MediaInfo, Result, TrackProber};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub fn track(index: u32, format: &str, language: &str) -> AudioTrack {
    AudioTrack::new(index, format, language)
}

/// Prober answering from a fixed path → tracks table.
#[derive(Debug, Default)]
pub struct FakeProber {
    tracks: HashMap<PathBuf, Vec<AudioTrack>>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &Path, tracks: Vec<AudioTrack>) -> Self {
        self.tracks.insert(path.to_path_buf(), tracks);
        self
    }
}

impl TrackProber for FakeProber {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let tracks = self
            .tracks
            .get(path)
            .ok_or_else(|| Error::parse_error("fake", format!("no tracks for {:?}", path)))?;
        Ok(MediaInfo {
            file_path: path.to_path_buf(),
            file_size: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
            container: "Matroska".to_string(),
            audio_tracks: tracks.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FakeRun {
    /// Write an output of this many bytes and succeed.
    Output(usize),
    /// Write a partial output and exit non-zero.
    Exit,
    /// Fail to launch.
    Missing,
}

/// Transcoder that fabricates outputs instead of running ffmpeg.
#[derive(Debug)]
pub struct FakeTranscoder {
    run: FakeRun,
    commands: Mutex<Vec<ConvertCommand>>,
}

impl FakeTranscoder {
    pub fn new(run: FakeRun) -> Self {
        Self {
            run,
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<ConvertCommand> {
        self.commands.lock().unwrap().clone()
    }
}

impl Transcoder for FakeTranscoder {
    fn transcode(&self, command: &ConvertCommand) -> Result<()> {
        self.commands.lock().unwrap().push(command.clone());
        match self.run {
            FakeRun::Output(len) => {
                std::fs::write(command.output(), vec![0u8; len])?;
                Ok(())
            }
            FakeRun::Exit => {
                std::fs::write(command.output(), b"partial")?;
                Err(Error::tool_failed("ffmpeg", "exited with exit status: 1"))
            }
            FakeRun::Missing => Err(Error::tool_not_found("ffmpeg")),
        }
    }
}
