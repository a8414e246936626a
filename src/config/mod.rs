mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./dtsforge.toml",
        "./config.toml",
        "~/.config/dtsforge/config.toml",
        "/etc/dtsforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let conversion = &config.conversion;

    if !(conversion.size_tolerance > 0.0 && conversion.size_tolerance <= 1.0) {
        anyhow::bail!(
            "conversion.size_tolerance must be in (0, 1], got {}",
            conversion.size_tolerance
        );
    }

    if conversion.bitrate.trim().is_empty() {
        anyhow::bail!("conversion.bitrate cannot be empty");
    }

    if conversion.target_language.trim().is_empty() {
        anyhow::bail!("conversion.target_language cannot be empty");
    }

    if conversion.extensions.iter().all(|e| e.trim().is_empty()) {
        anyhow::bail!("conversion.extensions must name at least one extension");
    }

    if conversion.lossless_keywords.is_empty() {
        tracing::warn!("No lossless keywords configured; every DTS track will be size-checked");
    }

    for (name, path) in [
        ("ffmpeg", &config.tools.ffmpeg),
        ("mediainfo", &config.tools.mediainfo),
        ("ffprobe", &config.tools.ffprobe),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!("Configured {} does not exist: {:?}", name, path);
            }
        }
    }

    Ok(())
}

/// Parse a size variance given as `"20"` or `"20%"` into a fraction (`0.20`).
///
/// Used for the `reverify --variance` argument.
pub fn parse_percent(value: &str) -> std::result::Result<f64, String> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    let percent: f64 = number
        .parse()
        .map_err(|_| format!("invalid percentage: {:?}", value))?;
    if !percent.is_finite() || percent <= 0.0 {
        return Err(format!("percentage must be greater than 0, got {}", value));
    }
    Ok(percent / 100.0)
}
