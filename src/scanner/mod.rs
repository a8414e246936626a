//! Directory traversal.
//!
//! Walks a library root and hands every media file that passes the
//! extension and name filters to a visitor, one at a time.

use anyhow::{bail, Result};
use dtsforge_common::paths::has_extension;
use dtsforge_common::{Artifact, NameFilter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Totals of one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Files handed to the visitor.
    pub visited: usize,
    /// The stop flag ended the walk early.
    pub stopped: bool,
}

/// Walks a directory tree for media files.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    extensions: Vec<String>,
    filter: NameFilter,
    stop: Arc<AtomicBool>,
}

impl Scanner {
    /// Create a scanner for `root` accepting the given extensions (without dot).
    pub fn new<S: AsRef<str>>(root: impl Into<PathBuf>, extensions: &[S]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect(),
            filter: NameFilter::any(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Only visit files whose name matches `filter`.
    pub fn with_filter(mut self, filter: NameFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filter(&self) -> &NameFilter {
        &self.filter
    }

    /// Shared flag that stops the walk before the next file when set.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Fail if the root is missing or not a directory.
    pub fn check_root(&self) -> Result<()> {
        if !self.root.exists() {
            bail!("Directory does not exist: {:?}", self.root);
        }
        if !self.root.is_dir() {
            bail!("Not a directory: {:?}", self.root);
        }
        Ok(())
    }

    fn accepts(&self, path: &Path) -> bool {
        has_extension(path, &self.extensions) && self.filter.matches(path)
    }

    /// Visit every matching file, classified by its artifact name.
    ///
    /// Entries that cannot be read are logged and skipped. Directories are
    /// visited in file-name order.
    pub fn walk<F>(&self, mut visit: F) -> Result<WalkStats>
    where
        F: FnMut(&Artifact),
    {
        self.check_root()?;
        info!(
            "Scanning {:?} (pattern '{}')",
            self.root,
            self.filter.pattern()
        );

        let mut stats = WalkStats::default();
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
        {
            if self.stop.load(Ordering::Relaxed) {
                info!("Scan stopped after {} files", stats.visited);
                stats.stopped = true;
                break;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.accepts(entry.path()) {
                continue;
            }

            let artifact = Artifact::classify(entry.path());
            debug!(file = %artifact.path.display(), kind = %artifact.kind, "Visiting");
            stats.visited += 1;
            visit(&artifact);
        }

        Ok(stats)
    }
}
