//! Batch script recording.
//!
//! Instead of running ffmpeg, dry runs can append each conversion command to
//! a script the operator reviews and runs later.

use dtsforge_av::actions::{render_command_line, ConvertCommand, QuoteStyle};
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const HEADER_TEXT: &str = "Auto-generated ffmpeg commands for DTS->E-AC-3 conversion";

/// Writes conversion commands into a `.bat`/`.cmd` or `sh` script.
pub struct BatchRecorder<W: Write> {
    writer: W,
    style: QuoteStyle,
    inspector: PathBuf,
    recorded: usize,
}

impl BatchRecorder<Box<dyn Write>> {
    /// Create (or truncate) the script at `path`, creating parent directories.
    pub fn create(path: &Path, style: QuoteStyle, inspector: impl Into<PathBuf>) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Self::new(Box::new(BufWriter::new(file)), style, inspector)
    }
}

impl<W: Write> BatchRecorder<W> {
    /// Wrap `writer` and write the script header.
    ///
    /// `inspector` is the media inspection tool named in each block's sample line.
    pub fn new(mut writer: W, style: QuoteStyle, inspector: impl Into<PathBuf>) -> io::Result<Self> {
        match style {
            QuoteStyle::Cmd => write!(writer, "@echo off\nREM {HEADER_TEXT}\n")?,
            QuoteStyle::Sh => write!(writer, "#!/bin/sh\n# {HEADER_TEXT}\n")?,
        }
        Ok(Self {
            writer,
            style,
            inspector: inspector.into(),
            recorded: 0,
        })
    }

    fn comment(&self) -> &'static str {
        match self.style {
            QuoteStyle::Cmd => "REM",
            QuoteStyle::Sh => "#",
        }
    }

    /// Append one block for `source`.
    pub fn record(&mut self, source: &Path, command: &ConvertCommand) -> io::Result<()> {
        let rem = self.comment();
        let sample = render_command_line(
            &[
                self.inspector.clone().into_os_string(),
                OsString::from(source.as_os_str()),
            ],
            self.style,
        );

        writeln!(self.writer, "{rem} File: {}", source.display())?;
        writeln!(
            self.writer,
            "{rem} Target audio stream index: {}",
            command.track_index()
        )?;
        writeln!(self.writer, "{rem} MediaInfo GUI sample: {sample}")?;
        writeln!(self.writer, "{}", command.render(self.style))?;
        writeln!(self.writer)?;
        self.writer.flush()?;

        self.recorded += 1;
        Ok(())
    }

    /// Number of commands recorded so far.
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    pub fn style(&self) -> QuoteStyle {
        self.style
    }

    /// Flush and hand back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
