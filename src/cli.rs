use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dtsforge")]
#[command(author, version, about = "Convert DTS audio tracks in media libraries to E-AC-3")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert English DTS tracks to E-AC-3 under a directory
    Convert {
        /// Directory to scan recursively
        #[arg(required = true)]
        directory: PathBuf,

        /// Show what would be converted without running ffmpeg
        #[arg(long)]
        dry_run: bool,

        /// Write ffmpeg commands to this script instead of running them (implies --dry-run)
        #[arg(long, value_name = "FILE")]
        batch: Option<PathBuf>,

        /// Only consider files whose name matches this wildcard pattern
        #[arg(long, default_value = "*", value_name = "PATTERN")]
        filter: String,
    },

    /// List files with English DTS and no Dolby Digital track
    List {
        /// Directory to scan recursively
        #[arg(required = true)]
        directory: PathBuf,

        /// Only consider files whose name matches this wildcard pattern
        #[arg(long, default_value = "*", value_name = "PATTERN")]
        filter: String,
    },

    /// Re-check quarantined conversions and promote those that now pass
    Reverify {
        /// Directory to scan recursively
        #[arg(required = true)]
        directory: PathBuf,

        /// Allowed size variance, e.g. 25 or 25%
        #[arg(long, value_parser = dtsforge::config::parse_percent, value_name = "PERCENT")]
        variance: f64,
    },

    /// Promote or quarantine leftover temp outputs
    CleanTemp {
        /// Directory to scan recursively
        #[arg(required = true)]
        directory: PathBuf,
    },

    /// Probe a media file and display its audio tracks
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
