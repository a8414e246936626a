//! Path utilities for deciding which files a scan looks at.
//!
//! Only the container formats ffmpeg can stream-copy every track of without
//! surprises are considered video files here. Callers that want a different
//! set pass their own list to [`has_extension`].

use regex::Regex;
use std::path::Path;

/// Default container extensions considered for conversion.
const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "m4v", "mov"];

/// Check if a path has one of the given extensions (case-insensitive, no dot).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use dtsforge_common::paths::{has_extension, video_extensions};
///
/// assert!(has_extension(Path::new("/path/to/video.MP4"), video_extensions()));
/// assert!(!has_extension(Path::new("movie.avi"), video_extensions()));
/// ```
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|candidate| candidate.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Get the list of default video file extensions.
#[must_use]
pub fn video_extensions() -> &'static [&'static str] {
    VIDEO_EXTENSIONS
}

/// Basename wildcard filter (`*` and `?`), matched case-insensitively.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use dtsforge_common::NameFilter;
///
/// let filter = NameFilter::new("*(2023)*")?;
/// assert!(filter.matches(Path::new("/movies/Film (2023).mkv")));
/// assert!(!filter.matches(Path::new("/movies/Film (2021).mkv")));
/// # Ok::<(), regex::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct NameFilter {
    pattern: String,
    regex: Option<Regex>,
}

impl NameFilter {
    /// Compile a wildcard pattern. Every other character matches literally.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        if pattern.is_empty() || pattern == "*" {
            return Ok(Self::any());
        }

        let mut source = String::with_capacity(pattern.len() + 8);
        source.push_str("(?is)^");
        let mut literal = [0u8; 4];
        for ch in pattern.chars() {
            match ch {
                '*' => source.push_str(".*"),
                '?' => source.push('.'),
                other => source.push_str(&regex::escape(other.encode_utf8(&mut literal))),
            }
        }
        source.push('$');

        Ok(Self {
            pattern: pattern.to_string(),
            regex: Some(Regex::new(&source)?),
        })
    }

    /// A filter that accepts every file name.
    pub fn any() -> Self {
        Self {
            pattern: "*".to_string(),
            regex: None,
        }
    }

    /// The original wildcard pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check whether the file name (not the full path) matches.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        match &self.regex {
            Some(regex) => regex.is_match(&name.to_string_lossy()),
            None => true,
        }
    }
}

impl Default for NameFilter {
    fn default() -> Self {
        Self::any()
    }
}
