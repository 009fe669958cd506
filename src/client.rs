// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Beacon record fetcher.
//!
//! Every lookup goes through [`BeaconClient::fetch`]:
//!
//! 1. GET the endpoint through the injected [`Transport`]
//! 2. Decode the body, check mandatory fields, normalize
//! 3. Verify the signature against the [`TrustAnchor`]
//! 4. Apply the freshness policy (default: latest record only)
//!
//! ## Freshness
//!
//! Historical lookups return old records by design, so only
//! [`Endpoint::Last`] is checked against the staleness window unless
//! `enforce_freshness_on_history` is set.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::BeaconConfig;
use crate::error::BeaconError;
use crate::record::{self, Record};
use crate::transport::{ReqwestTransport, Transport};
use crate::verify::{self, CertificateAnchor, TrustAnchor};

/// Beacon lookup endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Most recent record
    Last,
    /// Record closest to the timestamp
    Nearest(DateTime<Utc>),
    /// Record immediately before the timestamp
    Previous(DateTime<Utc>),
    /// Record immediately after the timestamp
    Next(DateTime<Utc>),
    /// First record of the chain covering the timestamp
    StartChain(DateTime<Utc>),
}

impl Endpoint {
    /// Path relative to the service root.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Last => "/rest/record/last".to_string(),
            Endpoint::Nearest(t) => format!("/rest/record/{}", t.timestamp()),
            Endpoint::Previous(t) => format!("/rest/record/previous/{}", t.timestamp()),
            Endpoint::Next(t) => format!("/rest/record/next/{}", t.timestamp()),
            Endpoint::StartChain(t) => format!("/rest/record/start-chain/{}", t.timestamp()),
        }
    }

    /// Full URL under `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }

    pub fn is_historical(&self) -> bool {
        !matches!(self, Endpoint::Last)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Last => write!(f, "last"),
            Endpoint::Nearest(_) => write!(f, "nearest"),
            Endpoint::Previous(_) => write!(f, "previous"),
            Endpoint::Next(_) => write!(f, "next"),
            Endpoint::StartChain(_) => write!(f, "start-chain"),
        }
    }
}

/// Whether a fetch applies the staleness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Enforce,
    Skip,
}

/// Client for the randomness beacon.
///
/// Cheap to clone; clones share transport, anchor and clock.
#[derive(Clone)]
pub struct BeaconClient {
    config: BeaconConfig,
    transport: Arc<dyn Transport>,
    anchor: Arc<dyn TrustAnchor>,
    clock: Arc<dyn Clock>,
}

impl BeaconClient {
    /// Create a client with the default HTTP transport, the embedded beacon
    /// certificate and the system clock.
    pub fn new(config: BeaconConfig) -> Result<Self, BeaconError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.http_timeout)?;
        Ok(Self {
            config,
            transport: Arc::new(transport),
            anchor: Arc::new(CertificateAnchor::embedded().clone()),
            clock: Arc::new(SystemClock),
        })
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Result<Self, BeaconError> {
        Self::new(BeaconConfig::from_env()?)
    }

    /// Replace the HTTP transport (proxies, custom TLS, tests).
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Replace the trust anchor.
    pub fn with_trust_anchor(mut self, anchor: impl TrustAnchor + 'static) -> Self {
        self.anchor = Arc::new(anchor);
        self
    }

    /// Replace the clock used for staleness and refresh decisions.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &BeaconConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fetch the most recent record. Always freshness-checked.
    pub fn fetch_latest(&self) -> Result<Record, BeaconError> {
        self.fetch(Endpoint::Last)
    }

    /// Fetch the record closest to `at`.
    pub fn fetch_nearest(&self, at: DateTime<Utc>) -> Result<Record, BeaconError> {
        self.fetch(Endpoint::Nearest(at))
    }

    /// Fetch the record immediately before `at`.
    pub fn fetch_previous(&self, at: DateTime<Utc>) -> Result<Record, BeaconError> {
        self.fetch(Endpoint::Previous(at))
    }

    /// Fetch the record immediately after `at`.
    pub fn fetch_next(&self, at: DateTime<Utc>) -> Result<Record, BeaconError> {
        self.fetch(Endpoint::Next(at))
    }

    /// Fetch the first record of the chain covering `at`.
    pub fn fetch_chain_start(&self, at: DateTime<Utc>) -> Result<Record, BeaconError> {
        self.fetch(Endpoint::StartChain(at))
    }

    /// Fetch `endpoint` with the configured freshness policy.
    pub fn fetch(&self, endpoint: Endpoint) -> Result<Record, BeaconError> {
        self.fetch_with(endpoint, self.freshness_for(&endpoint))
    }

    /// Fetch `endpoint` with an explicit freshness policy.
    pub fn fetch_with(
        &self,
        endpoint: Endpoint,
        freshness: Freshness,
    ) -> Result<Record, BeaconError> {
        let url = endpoint.url(&self.config.base_url);
        debug!(endpoint = %endpoint, url = %url, "Fetching beacon record");

        let response = self.transport.get(&url)?;
        if !response.status.is_success() {
            return Err(BeaconError::HttpStatus {
                status: response.status.as_u16(),
                url,
            });
        }

        let raw = record::decode(&response.body)?;
        raw.require_mandatory()?;
        let record = record::normalize(&raw);

        if let Err(e) = verify::verify_record(&raw, self.anchor.as_ref()) {
            warn!(
                endpoint = %endpoint,
                timestamp = %raw.time_stamp,
                error = %e,
                "Beacon record failed verification"
            );
            return Err(e);
        }

        if freshness == Freshness::Enforce {
            self.check_fresh(&record)?;
        }

        debug!(
            endpoint = %endpoint,
            timestamp = %record.timestamp,
            "Beacon record verified"
        );
        Ok(record)
    }

    fn freshness_for(&self, endpoint: &Endpoint) -> Freshness {
        if !endpoint.is_historical() || self.config.enforce_freshness_on_history {
            Freshness::Enforce
        } else {
            Freshness::Skip
        }
    }

    fn check_fresh(&self, record: &Record) -> Result<(), BeaconError> {
        let age_secs = record.age(self.clock.now()).num_seconds();
        let max_age_secs = i64::try_from(self.config.staleness_window.as_secs()).unwrap_or(i64::MAX);

        if age_secs > max_age_secs {
            warn!(
                timestamp = %record.timestamp,
                age_secs,
                max_age_secs,
                "Beacon record is stale"
            );
            return Err(BeaconError::StaleRecord {
                age_secs,
                max_age_secs,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for BeaconClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeaconClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
