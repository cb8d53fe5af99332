//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::GlobalOpts;
use crate::core::geometry::Point;
use crate::core::Config;

/// Parse an `x,y` pixel coordinate (used as a clap value parser)
pub fn parse_point(s: &str) -> std::result::Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected 'x,y', got '{}'", s))?;
    let x: f64 = x
        .trim()
        .parse()
        .map_err(|_| format!("invalid x coordinate '{}'", x.trim()))?;
    let y: f64 = y
        .trim()
        .parse()
        .map_err(|_| format!("invalid y coordinate '{}'", y.trim()))?;
    let point = Point::new(x, y);
    if !point.is_finite() {
        return Err(format!("coordinates must be finite numbers, got '{}'", s));
    }
    Ok(point)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a signed difference with an explicit sign
pub fn signed(value: f64, decimals: usize) -> String {
    format!("{:+.*}", decimals, value)
}

/// Install the stderr log subscriber; `RUST_LOG` wins over `--verbose`
pub fn init_logging(verbose: bool) {
    let default = if verbose { "mq=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load the layered config honouring `--config`
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    Config::load(global.config.as_deref()).into_diagnostic()
}

/// Questions file from the command line, falling back to config
pub fn questions_path(arg: Option<PathBuf>, config: &Config) -> Option<PathBuf> {
    arg.or_else(|| config.questions_file.clone())
}
