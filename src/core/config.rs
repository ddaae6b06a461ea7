//! Runtime configuration: environment (and `.env`) values, overridden by CLI flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use thiserror::Error;

use crate::cli::Args;
use crate::orb::ColorProfile;

pub const DEFAULT_ENDPOINT: &str = "https://orb.ponder.guru/";
pub const DEFAULT_TRANSCRIPT: &str = "orb_log.txt";
pub const DEFAULT_LISTEN: &str = "0.0.0.0:2222";

#[derive(Debug, Clone)]
pub struct Config {
    /// Answer service URL; questions are POSTed here.
    pub endpoint: String,
    /// Append-only file receiving each submitted question.
    pub transcript: PathBuf,
    /// Listen address for server mode.
    pub listen: String,
    /// Per-request timeout for the answer service. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Explicit color profile. `None` = detect locally, truecolor for remote sessions.
    pub color: Option<ColorProfile>,
    /// Starting frame for every session. `None` = random per session.
    pub start_frame: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid answer endpoint {0:?}: expected an http:// or https:// URL")]
    InvalidEndpoint(String),
    #[error("invalid timeout {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),
    #[error("invalid PONDER_COLOR {0:?}: expected truecolor or ansi256")]
    InvalidColor(String),
}

/// Load configuration from the environment and CLI flags (flags win).
pub fn load(args: &Args) -> Result<Config, ConfigError> {
    resolve(args, |name| std::env::var(name).ok())
}

fn resolve(args: &Args, env: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
    let endpoint = args
        .endpoint
        .clone()
        .or_else(|| env("PONDER_ENDPOINT"))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(ConfigError::InvalidEndpoint(endpoint));
    }

    let transcript = args
        .transcript
        .clone()
        .or_else(|| env("PONDER_TRANSCRIPT").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TRANSCRIPT));

    let listen = args
        .listen
        .clone()
        .or_else(|| env("PONDER_LISTEN"))
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());

    let timeout_secs = match args.timeout {
        Some(secs) => Some(secs),
        None => env("PONDER_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(raw))
            })
            .transpose()?,
    };
    let timeout = match timeout_secs {
        Some(0) => return Err(ConfigError::InvalidTimeout("0".to_string())),
        Some(secs) => Some(Duration::from_secs(secs)),
        None => None,
    };

    let color = match args.color {
        Some(profile) => Some(profile),
        None => env("PONDER_COLOR")
            .map(|raw| ColorProfile::from_str(raw.trim(), true).map_err(|_| ConfigError::InvalidColor(raw)))
            .transpose()?,
    };

    Ok(Config {
        endpoint,
        transcript,
        listen,
        timeout,
        color,
        start_frame: args.start_frame,
    })
}
