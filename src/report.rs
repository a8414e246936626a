//! Operator-facing reports printed after a run.

use crate::processor::{ConversionCandidate, DiscoveryReport};
use std::fmt::Write;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable size with two decimals, in 1024 steps up to TB.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for (i, unit) in UNITS.iter().enumerate() {
        if size < 1024.0 || i == UNITS.len() - 1 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{bytes} B")
}

fn sorted_by_path<T>(items: &[T], path: impl Fn(&T) -> String) -> Vec<&T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by_cached_key(|item| path(item).to_lowercase());
    sorted
}

/// Dry-run summary: one line per candidate, then totals.
pub fn render_summary(candidates: &[ConversionCandidate]) -> String {
    if candidates.is_empty() {
        return "No files require conversion.\n".to_string();
    }

    let total = candidates.len();
    let total_bytes: u64 = candidates.iter().map(|c| c.size).sum();
    let lossless = candidates.iter().filter(|c| c.lossless).count();

    let mut out = String::new();
    let _ = writeln!(out, "\n========== DRY RUN CONVERSION SUMMARY ==========");
    for c in sorted_by_path(candidates, |c| c.path.display().to_string()) {
        let _ = writeln!(
            out,
            "track={} lossless={} size={} :: {}",
            c.track_index,
            if c.lossless { "yes" } else { "no" },
            format_size(c.size),
            c.path.display()
        );
    }
    let _ = writeln!(out, "------------------------------------------------");
    let _ = writeln!(out, "Files to convert: {total}");
    let _ = writeln!(out, "Total size of candidates: {}", format_size(total_bytes));
    let _ = writeln!(
        out,
        "Lossless DTS candidates: {} ({:.1}%)",
        lossless,
        lossless as f64 / total as f64 * 100.0
    );
    let _ = writeln!(
        out,
        "Average file size: {}",
        format_size(total_bytes / total as u64)
    );
    let _ = writeln!(out, "================================================");
    out
}

/// Discovery listing of English DTS files without Dolby audio.
pub fn render_discovery(report: &DiscoveryReport, pattern: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n========== DTS (EN) WITHOUT DOLBY DIGITAL LIST ==========");
    if report.matches.is_empty() {
        let _ = writeln!(
            out,
            "No files found meeting criteria (English DTS present, no AC-3/E-AC-3)."
        );
    } else {
        for m in sorted_by_path(&report.matches, |m| m.path.display().to_string()) {
            let note = if m.has_aac { " +AAC" } else { "" };
            let _ = writeln!(out, "{}{}", m.path.display(), note);
        }
    }
    let _ = writeln!(out, "--------------------------------------------------------");
    let _ = writeln!(out, "Examined video files (pattern '{pattern}'): {}", report.examined);
    let _ = writeln!(out, "Matches: {}", report.matches.len());
    let _ = writeln!(out, "========================================================");
    out
}
