mod cli;

use dtsforge::{
    config,
    conversion::BatchRecorder,
    probe,
    processor::{self, ConversionSettings, Mode, Processor},
    report,
    reverify::Reverifier,
    rules::Selection,
    scanner::Scanner,
    state,
};
use dtsforge_av::actions::FfmpegTranscoder;
use dtsforge_common::paths::NameFilter;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Required external tools could not be found.
const EXIT_TOOLS_MISSING: u8 = 2;
/// The batch script could not be created.
const EXIT_BATCH_INIT: u8 = 3;

/// Print `err` the way `main` does for other errors and exit with `code`.
fn report_failure(code: u8, err: anyhow::Error) -> ExitCode {
    eprintln!("Error: {:?}", err);
    ExitCode::from(code)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "dtsforge=trace,dtsforge_av=debug,dtsforge_common=debug".to_string()
        } else {
            "dtsforge=info,dtsforge_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Convert {
            directory,
            dry_run,
            batch,
            filter,
        } => convert(&directory, config_path, dry_run, batch.as_deref(), &filter),
        Commands::List { directory, filter } => list(&directory, config_path, &filter),
        Commands::Reverify {
            directory,
            variance,
        } => reverify(&directory, config_path, variance),
        Commands::CleanTemp { directory } => clean_temp(&directory, config_path),
        Commands::Probe { file, json } => probe_file(&file, config_path, json),
        Commands::CheckTools => check_tools(config_path),
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

fn load(config_path: Option<&Path>) -> Result<config::Config> {
    let config = config::load_config_or_default(config_path)?;
    config::validate_config(&config)?;
    Ok(config)
}

fn scanner_for(directory: &Path, config: &config::Config, filter: &str) -> Result<Scanner> {
    let filter =
        NameFilter::new(filter).with_context(|| format!("Invalid filter pattern {:?}", filter))?;
    let scanner = Scanner::new(directory, &config.conversion.extensions).with_filter(filter);
    scanner.check_root()?;
    Ok(scanner)
}

fn convert(
    directory: &Path,
    config_path: Option<&Path>,
    dry_run: bool,
    batch: Option<&Path>,
    filter: &str,
) -> Result<ExitCode> {
    let config = load(config_path)?;
    let scanner = scanner_for(directory, &config, filter)?;

    let mode = if dry_run || batch.is_some() {
        Mode::DryRun
    } else {
        Mode::Live
    };

    let ffmpeg = match mode {
        Mode::Live => {
            let resolved = probe::require_probe_tools(&config.tools)
                .and_then(|()| probe::resolve_ffmpeg(&config.tools));
            match resolved {
                Ok(path) => path,
                Err(e) => return Ok(report_failure(EXIT_TOOLS_MISSING, e)),
            }
        }
        // Dry runs only need the path for display
        Mode::DryRun => probe::get_tool_path("ffmpeg", config.tools.ffmpeg.as_deref())
            .unwrap_or_else(|_| PathBuf::from("ffmpeg")),
    };

    tracing::info!("Scanning {:?} (filter: {})", directory, filter);
    if mode == Mode::DryRun {
        tracing::info!("Dry run: no files will be modified");
    }

    let prober = probe::build_prober(&config);
    let transcoder = FfmpegTranscoder;
    let settings = ConversionSettings::from_config(&config, ffmpeg);
    let mut processor = Processor::new(prober.as_ref(), &transcoder, settings, mode);

    if let Some(path) = batch {
        let recorder = match BatchRecorder::create(
            path,
            config.batch.flavor,
            probe::inspector_path(&config.tools),
        )
        .with_context(|| format!("Failed to create batch file {:?}", path))
        {
            Ok(recorder) => recorder,
            Err(e) => return Ok(report_failure(EXIT_BATCH_INIT, e)),
        };
        tracing::info!("Writing {} commands to {:?}", config.batch.flavor, path);
        processor = processor.with_batch(recorder);
    }

    let scan = processor.run(&scanner)?;

    if processor.mode() == Mode::DryRun {
        print!("{}", report::render_summary(&scan.candidates));
    }

    if let Some(recorded) = processor
        .finish()
        .context("Failed to finalize batch file")?
    {
        println!("Batch file contains {} command(s)", recorded);
    }

    Ok(ExitCode::SUCCESS)
}

fn list(directory: &Path, config_path: Option<&Path>, filter: &str) -> Result<ExitCode> {
    let config = load(config_path)?;
    let scanner = scanner_for(directory, &config, filter)?;
    let prober = probe::build_prober(&config);

    let found = processor::discover_library(
        &scanner,
        prober.as_ref(),
        &config.conversion.target_language,
    )?;
    print!("{}", report::render_discovery(&found, filter));
    Ok(ExitCode::SUCCESS)
}

fn reverify(directory: &Path, config_path: Option<&Path>, variance: f64) -> Result<ExitCode> {
    let config = load(config_path)?;
    let scanner = scanner_for(directory, &config, "*")?;
    let prober = probe::build_prober(&config);

    tracing::info!(
        "Re-verifying quarantined outputs under {:?} (variance ±{:.1}%)",
        directory,
        variance * 100.0
    );
    let reverifier = Reverifier::new(
        prober.as_ref(),
        variance,
        config.conversion.target_language.clone(),
    );
    let result = reverifier.run(&scanner)?;

    println!(
        "Re-verified: {} | Replaced: {} | Skipped: {}",
        result.examined, result.replaced, result.skipped
    );
    Ok(ExitCode::from(result.exit_code()))
}

fn clean_temp(directory: &Path, config_path: Option<&Path>) -> Result<ExitCode> {
    let config = load(config_path)?;
    let scanner = scanner_for(directory, &config, "*")?;

    let result = state::reconcile_tree(&scanner)?;
    println!(
        "Temp files: {} | Promoted: {} | Marked bad: {} | Failed: {}",
        result.candidates, result.promoted, result.quarantined, result.failed
    );
    Ok(ExitCode::SUCCESS)
}

fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<ExitCode> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let media_info = probe::probe_file(&config, file)?;

    if json {
        let json_str = serde_json::to_string_pretty(&media_info)?;
        println!("{}", json_str);
        return Ok(ExitCode::SUCCESS);
    }

    println!("File: {}", media_info.file_path.display());
    if !media_info.container.is_empty() {
        println!("Container: {}", media_info.container);
    }
    println!("Size: {}", report::format_size(media_info.file_size));

    println!("\nAudio Tracks: {}", media_info.audio_tracks.len());
    for track in &media_info.audio_tracks {
        println!("  {}", track);
    }

    let verdict = match config.conversion.selection_policy().select(&media_info.audio_tracks) {
        Selection::Convert { index, lossless } => format!(
            "convert track {} ({})",
            index,
            if lossless { "lossless" } else { "lossy" }
        ),
        Selection::Skip(reason) => format!("skip ({})", reason),
    };
    println!("\nSelection: {}", verdict);

    Ok(ExitCode::SUCCESS)
}

fn check_tools(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = config::load_config_or_default(config_path)?;
    println!("Checking external tools...\n");

    let tools = probe::check_tools(&probe::tool_locations(&config.tools));

    for tool in &tools {
        let status = if tool.available { "✓" } else { "✗" };
        print!("{} {}", status, tool.tool);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if probe::can_convert(&tools) {
        println!("All required tools are available!");
    } else {
        println!("ffmpeg and one of mediainfo/ffprobe are required for conversion.");
    }

    Ok(ExitCode::SUCCESS)
}

fn validate_config(path: Option<&Path>) -> Result<ExitCode> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };
    config::validate_config(&config)?;

    let conversion = &config.conversion;
    println!("✓ Configuration is valid");
    println!("  Probe backend: {}", config.tools.probe_backend);
    println!("  Bitrate: {}", conversion.bitrate);
    println!("  Target language: {}", conversion.target_language);
    println!(
        "  Size tolerance: ±{:.1}%",
        conversion.size_tolerance * 100.0
    );
    println!(
        "  Compatible formats: {}",
        conversion.compatible_formats.join(", ")
    );
    println!(
        "  Lossless keywords: {}",
        conversion.lossless_keywords.join(", ")
    );
    println!("  Extensions: {}", conversion.extensions.join(", "));
    println!("  Batch flavor: {}", config.batch.flavor);

    Ok(ExitCode::SUCCESS)
}
