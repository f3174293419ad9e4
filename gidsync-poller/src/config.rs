//! Poller configuration
//!
//! Settings are read from environment variables, which `main` may first
//! populate from a dotenv file. Any missing or unparseable required value is
//! fatal at startup.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::time::Duration;

use gidsync_client::ReqwestTransport;

/// Poller configuration
#[derive(Clone)]
pub struct Config {
    /// Static bearer credential for the API
    pub api_token: String,

    /// API base URL (e.g., "https://app.asana.com/api/1.0")
    pub base_url: String,

    /// Cadence of the short-interval schedule
    pub short_interval: Duration,

    /// Cadence of the long-interval schedule
    pub long_interval: Duration,

    /// Per-request timeout of the HTTP transport
    pub request_timeout: Duration,

    /// Directory the snapshot files are written into
    pub output_dir: PathBuf,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - API_TOKEN (required)
    /// - BASE_URL (required)
    /// - SHORT_INTERVAL (required, duration such as "30s" or "1m30s")
    /// - LONG_INTERVAL (required, duration)
    /// - REQUEST_TIMEOUT (optional, duration, default: 10s)
    /// - OUTPUT_DIR (optional, default: current directory)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates and validates configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => bail!("{} is not set in the environment", key),
            }
        };

        let api_token = required("API_TOKEN")?;
        let base_url = required("BASE_URL")?;

        let short_interval = parse_duration(&required("SHORT_INTERVAL")?)
            .context("invalid SHORT_INTERVAL")?;
        let long_interval =
            parse_duration(&required("LONG_INTERVAL")?).context("invalid LONG_INTERVAL")?;

        let request_timeout = match lookup("REQUEST_TIMEOUT") {
            Some(value) => parse_duration(&value).context("invalid REQUEST_TIMEOUT")?,
            None => ReqwestTransport::DEFAULT_TIMEOUT,
        };

        let output_dir = lookup("OUTPUT_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let config = Self {
            api_token,
            base_url: base_url.trim().to_string(),
            short_interval,
            long_interval,
            request_timeout,
            output_dir,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_token.is_empty() {
            bail!("api_token cannot be empty");
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            bail!("base_url must start with http:// or https://");
        }

        if self.short_interval.is_zero() {
            bail!("short_interval must be greater than 0");
        }

        if self.long_interval.is_zero() {
            bail!("long_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("short_interval", &self.short_interval)
            .field("long_interval", &self.long_interval)
            .field("request_timeout", &self.request_timeout)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

/// Parses a duration such as "300ms", "1.5h" or "2h45m"
///
/// Accepts a sequence of decimal numbers each followed by a unit
/// (`ns`, `us`/`µs`, `ms`, `s`, `m`, `h`). A bare "0" is zero.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let text = input.trim();
    if text.is_empty() {
        bail!("empty duration");
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut rest = text;
    let mut total = Duration::ZERO;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        if number.is_empty() {
            bail!("invalid duration {:?}: expected a number", input);
        }
        let value: f64 = number
            .parse()
            .with_context(|| format!("invalid duration {:?}", input))?;

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);
        let nanos_per_unit = match unit {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => bail!("invalid duration {:?}: missing unit", input),
            other => bail!("invalid duration {:?}: unknown unit {:?}", input, other),
        };

        let nanos = (value * nanos_per_unit).round();
        if !nanos.is_finite() || nanos >= u64::MAX as f64 {
            bail!("duration {:?} is too large", input);
        }
        total = total
            .checked_add(Duration::from_nanos(nanos as u64))
            .with_context(|| format!("duration {:?} is too large", input))?;
        rest = next;
    }

    Ok(total)
}
