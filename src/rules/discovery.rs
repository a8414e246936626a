//! Discovery listing: English DTS files without Dolby audio.
//!
//! Deliberately looser than [`SelectionPolicy`](super::SelectionPolicy):
//! AAC does not exclude a file, it is only noted, so the listing shows
//! what would become convertible if AAC were not treated as compatible.

use dtsforge_av::probe::{formats, normalize_language};
use dtsforge_av::AudioTrack;
use std::path::PathBuf;

/// A file reported by the discovery listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryMatch {
    pub path: PathBuf,
    /// First English DTS track.
    pub track_index: u32,
    /// An AAC track is present as well.
    pub has_aac: bool,
}

/// Check one file's tracks against the discovery criteria.
///
/// Matches when an English DTS track exists and no AC-3/E-AC-3 track does.
pub fn discover(path: PathBuf, tracks: &[AudioTrack], language: &str) -> Option<DiscoveryMatch> {
    let language = normalize_language(Some(language));

    let dts = tracks
        .iter()
        .find(|t| t.is_dts() && t.is_language(&language))?;

    if tracks
        .iter()
        .any(|t| t.is_format(formats::AC3) || t.is_format(formats::EAC3))
    {
        return None;
    }

    Some(DiscoveryMatch {
        path,
        track_index: dts.index,
        has_aac: tracks.iter().any(|t| t.is_format(formats::AAC)),
    })
}
