//! Resolving temp outputs left behind by interrupted runs.

use super::{quarantine, rename, Result};
use crate::scanner::Scanner;
use dtsforge_common::{Artifact, ArtifactKind};
use std::path::PathBuf;
use tracing::{error, info};

/// What happened to a leftover temp output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TempResolution {
    /// The canonical file was missing; the temp output took its name.
    Promoted { to: PathBuf },
    /// The canonical file exists; the temp output was quarantined.
    Quarantined { to: PathBuf },
}

/// Resolve one `<stem>.temp<ext>` artifact.
///
/// Returns `Ok(None)` for artifacts that are not temp outputs.
pub fn reconcile_temp(artifact: &Artifact) -> Result<Option<TempResolution>> {
    if artifact.kind != ArtifactKind::Temporary {
        return Ok(None);
    }

    if artifact.canonical.exists() {
        let to = quarantine(&artifact.canonical, &artifact.path)?;
        info!(file = %artifact.path.display(), "Marked temp output as bad: {:?}", to.file_name().unwrap_or_default());
        return Ok(Some(TempResolution::Quarantined { to }));
    }

    rename(&artifact.path, &artifact.canonical)?;
    info!(file = %artifact.path.display(), "Promoted temp output to {:?}", artifact.canonical.file_name().unwrap_or_default());
    Ok(Some(TempResolution::Promoted {
        to: artifact.canonical.clone(),
    }))
}

/// Totals for a `clean-temp` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub candidates: usize,
    pub promoted: usize,
    pub quarantined: usize,
    pub failed: usize,
}

/// Resolve every temp output under the scanner's root.
pub fn reconcile_tree(scanner: &Scanner) -> anyhow::Result<ReconcileReport> {
    let mut report = ReconcileReport::default();
    scanner.walk(|artifact| {
        if artifact.kind != ArtifactKind::Temporary {
            return;
        }
        report.candidates += 1;
        match reconcile_temp(artifact) {
            Ok(Some(TempResolution::Promoted { .. })) => report.promoted += 1,
            Ok(Some(TempResolution::Quarantined { .. })) => report.quarantined += 1,
            Ok(None) => {}
            Err(e) => {
                error!(file = %artifact.path.display(), "{}", e);
                report.failed += 1;
            }
        }
    })?;

    info!(
        "Temp cleanup complete. Candidates: {} | Promoted: {} | Marked bad: {} | Failed: {}",
        report.candidates, report.promoted, report.quarantined, report.failed
    );
    Ok(report)
}
