//! Locating ffmpeg, ffprobe and mediainfo.
//!
//! Every tool can be pinned to an explicit path in the configuration; an
//! unset or missing path falls back to a `PATH` lookup.

use crate::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// An external program dtsforge shells out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
    MediaInfo,
}

impl Tool {
    /// Every tool, in report order.
    pub const ALL: [Tool; 3] = [Tool::Ffmpeg, Tool::Ffprobe, Tool::MediaInfo];

    /// Executable name looked up on `PATH`.
    pub fn binary(self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
            Tool::MediaInfo => "mediainfo",
        }
    }

    fn version_flag(self) -> &'static str {
        match self {
            Tool::Ffmpeg | Tool::Ffprobe => "-version",
            Tool::MediaInfo => "--version",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Configured tool locations. `None` means "whatever `PATH` finds".
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolLocations<'a> {
    pub ffmpeg: Option<&'a Path>,
    pub ffprobe: Option<&'a Path>,
    pub mediainfo: Option<&'a Path>,
}

impl<'a> ToolLocations<'a> {
    fn get(&self, tool: Tool) -> Option<&'a Path> {
        match tool {
            Tool::Ffmpeg => self.ffmpeg,
            Tool::Ffprobe => self.ffprobe,
            Tool::MediaInfo => self.mediainfo,
        }
    }
}

/// Result of running one tool's version query.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub tool: Tool,
    pub available: bool,
    /// First non-empty line of the version output.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Run `program --version` (or `-version`) and report what came back.
fn check_program(tool: Tool, program: &Path) -> ToolInfo {
    let output = Command::new(program).arg(tool.version_flag()).output();

    let version = match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string),
        _ => {
            return ToolInfo {
                tool,
                available: false,
                version: None,
                path: None,
            }
        }
    };

    ToolInfo {
        tool,
        available: true,
        version,
        path: which::which(program).ok(),
    }
}

/// Query every tool at its configured location.
pub fn check_tools(locations: &ToolLocations<'_>) -> Vec<ToolInfo> {
    Tool::ALL
        .iter()
        .map(|&tool| {
            let program = locations
                .get(tool)
                .map_or_else(|| PathBuf::from(tool.binary()), Path::to_path_buf);
            check_program(tool, &program)
        })
        .collect()
}

/// Whether `report` has ffmpeg plus at least one probe tool.
pub fn can_convert(report: &[ToolInfo]) -> bool {
    let has = |wanted: Tool| report.iter().any(|t| t.tool == wanted && t.available);
    has(Tool::Ffmpeg) && (has(Tool::MediaInfo) || has(Tool::Ffprobe))
}

/// Look `name` up on `PATH`.
pub fn find_on_path(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Use the configured path when it points at a file, otherwise search `PATH`.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        #[cfg(feature = "tracing")]
        tracing::warn!("Configured {} not found at {:?}, searching PATH", name, path);
    }

    find_on_path(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(tool: Tool, available: bool) -> ToolInfo {
        ToolInfo {
            tool,
            available,
            version: None,
            path: None,
        }
    }

    #[test]
    fn test_check_program_missing_binary() {
        let info = check_program(Tool::MediaInfo, Path::new("/nonexistent/bin/mediainfo"));
        assert_eq!(info.tool, Tool::MediaInfo);
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn test_check_tools_uses_configured_locations() {
        let missing = Path::new("/nonexistent/bin/tool");
        let report = check_tools(&ToolLocations {
            ffmpeg: Some(missing),
            ffprobe: Some(missing),
            mediainfo: Some(missing),
        });

        let tools: Vec<Tool> = report.iter().map(|t| t.tool).collect();
        assert_eq!(tools, Tool::ALL);
        assert!(report.iter().all(|t| !t.available));
        assert!(!can_convert(&report));
    }

    #[test]
    fn test_can_convert_needs_ffmpeg_and_a_probe_tool() {
        use Tool::*;
        assert!(can_convert(&[info(Ffmpeg, true), info(MediaInfo, true)]));
        assert!(can_convert(&[info(Ffmpeg, true), info(Ffprobe, true), info(MediaInfo, false)]));
        assert!(!can_convert(&[info(Ffmpeg, true), info(Ffprobe, false), info(MediaInfo, false)]));
        assert!(!can_convert(&[info(Ffmpeg, false), info(Ffprobe, true), info(MediaInfo, true)]));
    }

    #[test]
    fn test_find_on_path_not_found() {
        let err = find_on_path("nonexistent_tool_12345").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_get_tool_path_prefers_existing_config() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = get_tool_path("nonexistent_tool_12345", Some(file.path())).unwrap();
        assert_eq!(path, file.path());
    }

    #[test]
    fn test_get_tool_path_missing_config_falls_back() {
        let result = get_tool_path(
            "nonexistent_tool_12345",
            Some(Path::new("/nonexistent/bin/tool")),
        );
        assert!(result.is_err());
    }
}
