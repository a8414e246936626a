//! Lossless DTS detection.
//!
//! Neither probe tool has a single field that says "this DTS track is
//! lossless". MediaInfo spreads the information over the commercial name,
//! profile and additional-features fields; ffprobe puts it in the profile.
//! Detection is a case-insensitive substring search over those fields.

use serde::{Deserialize, Serialize};

use super::types::formats;

/// Keywords that mark a DTS track as lossless by default.
pub const DEFAULT_LOSSLESS_KEYWORDS: &[&str] = &["ma", "master audio", "xll", "dts:x"];

/// Configurable keyword matcher for lossless DTS variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LosslessDetector {
    keywords: Vec<String>,
}

impl LosslessDetector {
    /// Create a detector from a keyword list. Keywords are matched case-insensitively.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// The normalised keyword list.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Decide whether a track is lossless DTS.
    ///
    /// Only tracks whose format is DTS can be lossless; `descriptors` are the
    /// free-text profile fields reported by the probe tool.
    ///
    /// # Example
    ///
    /// ```
    /// use dtsforge_av::probe::LosslessDetector;
    ///
    /// let detector = LosslessDetector::default();
    /// assert!(detector.is_lossless("DTS", &["DTS-HD Master Audio"]));
    /// assert!(!detector.is_lossless("DTS", &["Core"]));
    /// assert!(!detector.is_lossless("TrueHD", &["Master Audio"]));
    /// ```
    pub fn is_lossless<S: AsRef<str>>(&self, format: &str, descriptors: &[S]) -> bool {
        if !format.eq_ignore_ascii_case(formats::DTS) {
            return false;
        }

        let blob = descriptors
            .iter()
            .map(|d| d.as_ref().trim())
            .filter(|d| !d.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        self.keywords.iter().any(|k| blob.contains(k.as_str()))
    }
}

impl Default for LosslessDetector {
    fn default() -> Self {
        Self::new(DEFAULT_LOSSLESS_KEYWORDS)
    }
}
