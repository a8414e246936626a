//! Per-file processing: probe, select, then record or convert.
//!
//! Each file is handled to completion before the next one starts. Failures
//! are reported as a [`FileOutcome`] and never abort the scan.

use crate::config::Config;
use crate::conversion::{
    Baseline, BatchRecorder, ContentCheck, SizePolicy, ValidationFailure, Validator,
};
use crate::rules::{discover, DiscoveryMatch, Selection, SelectionPolicy, SkipReason};
use crate::scanner::Scanner;
use crate::state::{self, StateError};
use anyhow::Result;
use dtsforge_av::actions::{ConvertCommand, QuoteStyle, Transcoder};
use dtsforge_av::{AudioTrack, TrackProber};
use dtsforge_common::artifacts::temp_path;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// A file that would be converted, collected during dry runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionCandidate {
    pub path: PathBuf,
    pub track_index: u32,
    pub lossless: bool,
    /// Size of the original in bytes (0 if it could not be read).
    pub size: u64,
}

/// What happened to one file.
#[derive(Debug)]
pub enum FileOutcome {
    /// The probe tool failed on the original.
    ProbeFailure(String),
    /// Selection decided not to convert.
    SelectionSkip(SkipReason),
    /// Dry run: the file would be converted.
    DryRun(ConversionCandidate),
    /// ffmpeg could not be started.
    ToolLaunchFailure(String),
    /// ffmpeg ran and failed.
    ToolExecutionFailure(String),
    /// The output was rejected; `quarantined` is where it was kept.
    ValidationFailure {
        reason: ValidationFailure,
        quarantined: Option<PathBuf>,
    },
    /// Replacing the original failed part way.
    FilesystemRaceFailure(StateError),
    /// The original now carries the converted track.
    Converted,
}

/// Totals and dry-run candidates of one scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub examined: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub candidates: Vec<ConversionCandidate>,
    /// The scan was stopped before visiting every file.
    pub stopped: bool,
}

impl ScanReport {
    pub fn record(&mut self, outcome: FileOutcome) {
        self.examined += 1;
        match outcome {
            FileOutcome::Converted => self.converted += 1,
            FileOutcome::SelectionSkip(_) => self.skipped += 1,
            FileOutcome::DryRun(candidate) => self.candidates.push(candidate),
            _ => self.failed += 1,
        }
    }
}

/// Whether conversions are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Live,
    DryRun,
}

/// Settings that shape the conversion command and checks.
#[derive(Debug, Clone)]
pub struct ConversionSettings {
    pub ffmpeg: PathBuf,
    pub bitrate: String,
    pub size_tolerance: f64,
    pub policy: SelectionPolicy,
    pub style: QuoteStyle,
}

impl ConversionSettings {
    pub fn from_config(config: &Config, ffmpeg: PathBuf) -> Self {
        Self {
            ffmpeg,
            bitrate: config.conversion.bitrate.clone(),
            size_tolerance: config.conversion.size_tolerance,
            policy: config.conversion.selection_policy(),
            style: config.batch.flavor,
        }
    }
}

/// Batch script recorder used by the processor.
pub type ScriptRecorder = BatchRecorder<Box<dyn Write>>;

/// Runs the per-file pipeline.
pub struct Processor<'a> {
    prober: &'a dyn TrackProber,
    transcoder: &'a dyn Transcoder,
    settings: ConversionSettings,
    mode: Mode,
    batch: Option<ScriptRecorder>,
}

impl<'a> Processor<'a> {
    pub fn new(
        prober: &'a dyn TrackProber,
        transcoder: &'a dyn Transcoder,
        settings: ConversionSettings,
        mode: Mode,
    ) -> Self {
        Self {
            prober,
            transcoder,
            settings,
            mode,
            batch: None,
        }
    }

    /// Record commands into `recorder`. Implies a dry run.
    pub fn with_batch(mut self, recorder: ScriptRecorder) -> Self {
        self.batch = Some(recorder);
        self.mode = Mode::DryRun;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Flush the batch script, if any, returning the number of recorded commands.
    pub fn finish(self) -> std::io::Result<Option<usize>> {
        match self.batch {
            Some(recorder) => {
                let recorded = recorder.recorded();
                recorder.finish()?;
                Ok(Some(recorded))
            }
            None => Ok(None),
        }
    }

    /// Process every original under the scanner's root.
    pub fn run(&mut self, scanner: &Scanner) -> Result<ScanReport> {
        let mut report = ScanReport::default();
        let stats = scanner.walk(|artifact| {
            if !artifact.is_original() {
                debug!(file = %artifact.path.display(), "Skipping {} artifact", artifact.kind);
                return;
            }
            report.record(self.process(&artifact.path));
        })?;
        report.stopped = stats.stopped;

        info!(
            "Scan complete. Examined: {} | Converted: {} | Skipped: {} | Failed: {} | Candidates: {}",
            report.examined,
            report.converted,
            report.skipped,
            report.failed,
            report.candidates.len()
        );
        Ok(report)
    }

    /// Process one original file.
    pub fn process(&mut self, path: &Path) -> FileOutcome {
        info!(file = %path.display(), "Evaluating file");

        let info = match self.prober.probe(path) {
            Ok(info) => info,
            Err(e) => {
                warn!(file = %path.display(), "Probe failed: {}", e);
                return FileOutcome::ProbeFailure(e.to_string());
            }
        };
        summarize_tracks(path, &info.audio_tracks);

        let (index, lossless) = match self.settings.policy.select(&info.audio_tracks) {
            Selection::Convert { index, lossless } => (index, lossless),
            Selection::Skip(reason) => {
                info!(file = %path.display(), "Skip: {}", reason);
                return FileOutcome::SelectionSkip(reason);
            }
        };

        let temp = temp_path(path);
        let command = ConvertCommand::new(&self.settings.ffmpeg, path, &temp, index)
            .with_bitrate(self.settings.bitrate.clone());
        let rendered = command.render(self.settings.style);

        if let Some(batch) = self.batch.as_mut() {
            if let Err(e) = batch.record(path, &command) {
                error!(file = %path.display(), "Failed writing to batch file: {}", e);
            }
        }

        if self.mode == Mode::DryRun {
            let note = if lossless { " (lossless DTS-HD)" } else { "" };
            info!(
                file = %path.display(),
                "Would convert (audio stream index {} DTS->E-AC-3{})", index, note
            );
            info!("ffmpeg command: {}", rendered);
            return FileOutcome::DryRun(ConversionCandidate {
                path: path.to_path_buf(),
                track_index: index,
                lossless,
                size: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
            });
        }

        let original_size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(file = %path.display(), "Cannot read original size: {}", e);
                return FileOutcome::ProbeFailure(e.to_string());
            }
        };

        info!(file = %path.display(), "Converting DTS -> E-AC-3 (stream {})", index);
        info!("ffmpeg command: {}", rendered);
        self.convert(path, &info.audio_tracks, original_size, &command, lossless)
    }

    fn convert(
        &self,
        path: &Path,
        tracks: &[AudioTrack],
        original_size: u64,
        command: &ConvertCommand,
        lossless: bool,
    ) -> FileOutcome {
        let temp = command.output();

        // A temp output left by an interrupted run is not ours to delete.
        if temp.exists() {
            match state::quarantine(path, temp) {
                Ok(target) => {
                    warn!(file = %path.display(), "Stale temp output moved to {:?}", target);
                }
                Err(e) => {
                    error!(file = %path.display(), "Cannot move stale temp output aside: {}", e);
                    return FileOutcome::FilesystemRaceFailure(e);
                }
            }
        }

        if let Err(e) = self.transcoder.transcode(command) {
            error!(file = %path.display(), "ffmpeg failed: {}", e);
            if let Err(cleanup) = state::discard(temp) {
                warn!("Could not remove partial output: {}", cleanup);
            }
            return if e.is_launch_failure() {
                FileOutcome::ToolLaunchFailure(e.to_string())
            } else {
                FileOutcome::ToolExecutionFailure(e.to_string())
            };
        }

        let validation = Validator::new(self.prober).validate(
            Baseline {
                tracks,
                size: original_size,
            },
            temp,
            &ContentCheck::TargetTrack(command.track_index()),
            SizePolicy::for_source(lossless, self.settings.size_tolerance),
        );

        if let Err(reason) = validation {
            warn!(file = %path.display(), "Validation failed; original kept");
            let quarantined = match state::quarantine(path, temp) {
                Ok(target) => {
                    info!(file = %path.display(), "Bad output preserved as {:?}", target);
                    Some(target)
                }
                Err(e) => {
                    error!(file = %path.display(), "Failed to preserve bad output: {}", e);
                    None
                }
            };
            return FileOutcome::ValidationFailure {
                reason,
                quarantined,
            };
        }

        match state::promote(path, temp) {
            Ok(()) => {
                info!(file = %path.display(), "Replaced original with converted file");
                FileOutcome::Converted
            }
            Err(e) => {
                error!(file = %path.display(), "Failed to replace original: {}", e);
                FileOutcome::FilesystemRaceFailure(e)
            }
        }
    }
}

fn summarize_tracks(path: &Path, tracks: &[AudioTrack]) {
    if tracks.is_empty() {
        info!(file = %path.display(), "No audio tracks detected");
        return;
    }
    info!(file = %path.display(), "Audio tracks ({})", tracks.len());
    for track in tracks {
        info!("  {}", track);
    }
}

/// Result of a discovery listing.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub examined: usize,
    pub matches: Vec<DiscoveryMatch>,
}

/// List originals with an English DTS track and no Dolby track.
pub fn discover_library(
    scanner: &Scanner,
    prober: &dyn TrackProber,
    language: &str,
) -> Result<DiscoveryReport> {
    let mut report = DiscoveryReport::default();
    scanner.walk(|artifact| {
        if !artifact.is_original() {
            return;
        }
        report.examined += 1;
        match prober.probe(&artifact.path) {
            Ok(info) => {
                if let Some(hit) = discover(artifact.path.clone(), &info.audio_tracks, language) {
                    debug!(file = %artifact.path.display(), "Match (track {})", hit.track_index);
                    report.matches.push(hit);
                }
            }
            Err(e) => warn!(file = %artifact.path.display(), "Probe failed: {}", e),
        }
    })?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{track, FakeProber, FakeRun, FakeTranscoder};
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    fn settings() -> ConversionSettings {
        ConversionSettings::from_config(&Config::default(), PathBuf::from("ffmpeg"))
    }

    #[test]
    fn test_skip_is_reported() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.mkv");
        fs::write(&movie, vec![0u8; 100]).unwrap();

        let prober = FakeProber::new().with(&movie, vec![track(0, "DTS", "en"), track(1, "AAC", "en")]);
        let transcoder = FakeTranscoder::new(FakeRun::Output(100));
        let mut processor = Processor::new(&prober, &transcoder, settings(), Mode::Live);

        assert_matches!(
            processor.process(&movie),
            FileOutcome::SelectionSkip(SkipReason::CompatibleFormatPresent(_))
        );
        assert!(transcoder.commands().is_empty());
    }

    #[test]
    fn test_probe_failure_is_reported() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.mkv");
        fs::write(&movie, b"x").unwrap();

        let prober = FakeProber::new();
        let transcoder = FakeTranscoder::new(FakeRun::Output(1));
        let mut processor = Processor::new(&prober, &transcoder, settings(), Mode::Live);
        assert_matches!(processor.process(&movie), FileOutcome::ProbeFailure(_));
    }

    #[test]
    fn test_dry_run_collects_candidate() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.mkv");
        fs::write(&movie, vec![0u8; 4096]).unwrap();

        let prober = FakeProber::new().with(&movie, vec![track(0, "DTS", "fr"), track(1, "DTS", "en").lossless()]);
        let transcoder = FakeTranscoder::new(FakeRun::Output(1));
        let mut processor = Processor::new(&prober, &transcoder, settings(), Mode::DryRun);

        let outcome = processor.process(&movie);
        assert_matches!(
            outcome,
            FileOutcome::DryRun(ConversionCandidate { track_index: 1, lossless: true, size: 4096, .. })
        );
        assert!(transcoder.commands().is_empty());
        assert!(!temp_path(&movie).exists());
    }

    #[test]
    fn test_launch_failure_leaves_original() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.mkv");
        fs::write(&movie, b"dts").unwrap();

        let prober = FakeProber::new().with(&movie, vec![track(0, "DTS", "en")]);
        let transcoder = FakeTranscoder::new(FakeRun::Missing);
        let mut processor = Processor::new(&prober, &transcoder, settings(), Mode::Live);

        assert_matches!(processor.process(&movie), FileOutcome::ToolLaunchFailure(_));
        assert_eq!(fs::read(&movie).unwrap(), b"dts");
    }

    #[test]
    fn test_tool_failure_removes_partial_output() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.mkv");
        fs::write(&movie, b"dts").unwrap();

        let prober = FakeProber::new().with(&movie, vec![track(0, "DTS", "en")]);
        let transcoder = FakeTranscoder::new(FakeRun::Exit);
        let mut processor = Processor::new(&prober, &transcoder, settings(), Mode::Live);

        assert_matches!(processor.process(&movie), FileOutcome::ToolExecutionFailure(_));
        assert!(!temp_path(&movie).exists());
        assert_eq!(fs::read(&movie).unwrap(), b"dts");
    }

    #[test]
    fn test_tool_failure_spares_stale_temp() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.mkv");
        fs::write(&movie, b"dts").unwrap();
        fs::write(temp_path(&movie), b"earlier run").unwrap();

        let prober = FakeProber::new().with(&movie, vec![track(0, "DTS", "en")]);
        let transcoder = FakeTranscoder::new(FakeRun::Exit);
        let mut processor = Processor::new(&prober, &transcoder, settings(), Mode::Live);

        assert_matches!(processor.process(&movie), FileOutcome::ToolExecutionFailure(_));
        assert!(!temp_path(&movie).exists());
        let kept = dir.path().join("movie.BAD_CONVERT.mkv");
        assert_eq!(fs::read(kept).unwrap(), b"earlier run");
        assert_eq!(fs::read(&movie).unwrap(), b"dts");
    }

    #[test]
    fn test_command_uses_configured_bitrate() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.mkv");
        fs::write(&movie, vec![0u8; 1000]).unwrap();

        let prober = FakeProber::new()
            .with(&movie, vec![track(0, "DTS", "en")])
            .with(&temp_path(&movie), vec![track(0, "E-AC-3", "en")]);
        let transcoder = FakeTranscoder::new(FakeRun::Output(1000));
        let mut s = settings();
        s.bitrate = "768k".to_string();
        let mut processor = Processor::new(&prober, &transcoder, s, Mode::Live);

        assert_matches!(processor.process(&movie), FileOutcome::Converted);
        let commands = transcoder.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].bitrate(), "768k");
        assert_eq!(commands[0].output(), temp_path(&movie));
    }

    #[test]
    fn test_run_skips_artifacts() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.mkv");
        let bad = dir.path().join("movie.BAD_CONVERT.mkv");
        fs::write(&movie, vec![0u8; 10]).unwrap();
        fs::write(&bad, vec![0u8; 10]).unwrap();

        let prober = FakeProber::new().with(&movie, vec![track(0, "AC-3", "en")]);
        let transcoder = FakeTranscoder::new(FakeRun::Output(1));
        let mut processor = Processor::new(&prober, &transcoder, settings(), Mode::Live);
        let scanner = Scanner::new(dir.path(), &["mkv"]);

        let report = processor.run(&scanner).unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_discover_library() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.mkv");
        let b = dir.path().join("b.mkv");
        let c = dir.path().join("c.mkv");
        for p in [&a, &b, &c] {
            fs::write(p, b"x").unwrap();
        }
        let prober = FakeProber::new()
            .with(&a, vec![track(0, "DTS", "en"), track(1, "AAC", "en")])
            .with(&b, vec![track(0, "DTS", "en"), track(1, "AC-3", "en")]);

        let report = discover_library(&Scanner::new(dir.path(), &["mkv"]), &prober, "en").unwrap();
        assert_eq!(report.examined, 3);
        assert_eq!(report.matches.len(), 1);
        assert!(report.matches[0].has_aac);
    }
}
