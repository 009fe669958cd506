// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by the beacon client. Configuration is loaded from the environment with
//! [`BeaconConfig::from_env`], or built directly in code.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `BEACON_BASE_URL` | Beacon service root URL | `https://beacon.nist.gov` |
//! | `BEACON_HTTP_TIMEOUT_SECS` | HTTP request timeout | `10` |
//! | `BEACON_STALENESS_SECS` | Maximum age of a "current" record | `60` |
//! | `BEACON_REFRESH_SECS` | Generator reseed interval | `60` |
//! | `BEACON_ENFORCE_HISTORY_FRESHNESS` | Apply staleness check to historical lookups | `false` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::time::Duration;

use url::Url;

use crate::error::BeaconError;
use crate::telemetry::LogFormat;

/// Environment variable name for the beacon service root URL.
pub const BASE_URL_ENV: &str = "BEACON_BASE_URL";

/// Environment variable name for the HTTP timeout in seconds.
pub const HTTP_TIMEOUT_ENV: &str = "BEACON_HTTP_TIMEOUT_SECS";

/// Environment variable name for the staleness window in seconds.
pub const STALENESS_ENV: &str = "BEACON_STALENESS_SECS";

/// Environment variable name for the generator refresh interval in seconds.
pub const REFRESH_ENV: &str = "BEACON_REFRESH_SECS";

/// Environment variable name for the historical freshness switch.
///
/// Historical lookups (previous, next, start-chain, nearest) legitimately
/// return old records, so they skip the staleness check unless this is set.
pub const ENFORCE_HISTORY_FRESHNESS_ENV: &str = "BEACON_ENFORCE_HISTORY_FRESHNESS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default beacon service root URL.
pub const DEFAULT_BASE_URL: &str = "https://beacon.nist.gov";

/// Default HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default staleness window: one publication interval.
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(60);

/// Default generator refresh interval.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Beacon client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconConfig {
    /// Service root, endpoint paths are appended to it
    pub base_url: String,
    /// Timeout handed to the default HTTP transport
    pub http_timeout: Duration,
    /// Records older than this are rejected as stale
    pub staleness_window: Duration,
    /// Auto-updating generators reseed once this has elapsed
    pub refresh_interval: Duration,
    /// Apply the staleness check to historical lookups as well
    pub enforce_freshness_on_history: bool,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            staleness_window: DEFAULT_STALENESS_WINDOW,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            enforce_freshness_on_history: false,
            log_format: LogFormat::Pretty,
        }
    }
}

impl BeaconConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, BeaconError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BeaconError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();

        let base_url = get(BASE_URL_ENV).unwrap_or(defaults.base_url);
        let http_timeout = match get(HTTP_TIMEOUT_ENV) {
            Some(raw) => parse_secs(HTTP_TIMEOUT_ENV, &raw)?,
            None => defaults.http_timeout,
        };
        let staleness_window = match get(STALENESS_ENV) {
            Some(raw) => parse_secs(STALENESS_ENV, &raw)?,
            None => defaults.staleness_window,
        };
        let refresh_interval = match get(REFRESH_ENV) {
            Some(raw) => parse_secs(REFRESH_ENV, &raw)?,
            None => defaults.refresh_interval,
        };
        let enforce_freshness_on_history = match get(ENFORCE_HISTORY_FRESHNESS_ENV) {
            Some(raw) => parse_bool(ENFORCE_HISTORY_FRESHNESS_ENV, &raw)?,
            None => defaults.enforce_freshness_on_history,
        };
        let log_format = match get(LOG_FORMAT_ENV) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e: String| BeaconError::Config(format!("{LOG_FORMAT_ENV}: {e}")))?,
            None => defaults.log_format,
        };

        let config = Self {
            base_url,
            http_timeout,
            staleness_window,
            refresh_interval,
            enforce_freshness_on_history,
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), BeaconError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| BeaconError::Config(format!("{BASE_URL_ENV}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(BeaconError::Config(format!(
                "{BASE_URL_ENV}: unsupported scheme `{other}`"
            ))),
        }
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<Duration, BeaconError> {
    raw.parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| BeaconError::Config(format!("{name}: expected seconds, got `{raw}` ({e})")))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, BeaconError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(BeaconError::Config(format!(
            "{name}: expected a boolean, got `{raw}`"
        ))),
    }
}
