//! Dtsforge-Common: filename conventions shared across dtsforge.
//!
//! This crate provides:
//!
//! - **Path Utilities**: extension checks and basename wildcard filters
//! - **Artifacts**: classification of the sibling files a conversion leaves
//!   behind (`.temp`, `.BAD_CONVERT`, `.ORIG_BACKUP`) and derivation of
//!   collision-free names for them
//!
//! # Examples
//!
//! ```
//! use dtsforge_common::artifacts::{Artifact, ArtifactKind};
//! use dtsforge_common::paths::{has_extension, video_extensions};
//! use std::path::Path;
//!
//! assert!(has_extension(Path::new("movie.mkv"), video_extensions()));
//!
//! let artifact = Artifact::classify(Path::new("/media/Movie.BAD_CONVERT_2.mkv"));
//! assert_eq!(artifact.kind, ArtifactKind::Quarantined { serial: Some(2) });
//! assert_eq!(artifact.canonical, Path::new("/media/Movie.mkv"));
//! ```

pub mod artifacts;
pub mod paths;

pub use artifacts::{Artifact, ArtifactKind};
pub use paths::NameFilter;
