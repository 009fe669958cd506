// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Beacon client errors.
//!
//! Every failure is returned to the immediate caller. Nothing is retried and
//! nothing is swallowed, except the per-field sentinel substitution done by
//! the record normalizer.

/// Broad category of a [`BeaconError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or HTTP failure
    Transport,
    /// Response body is not a well-formed record document
    Decode,
    /// A mandatory record field is absent
    Normalize,
    /// Signature or signed payload rejected
    Verification,
    /// Record is older than the staleness window
    Stale,
    /// Generator could not reseed from the latest record
    Refresh,
    /// Invalid configuration
    Config,
}

/// Beacon client error type.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error("Beacon request failed: {0}")]
    Transport(String),

    #[error("Beacon returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Beacon response could not be decoded: {0}")]
    Decode(String),

    #[error("Beacon record is missing mandatory field `{0}`")]
    MissingField(&'static str),

    #[error("Beacon record field `{field}` is malformed: {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("Beacon record signature is invalid")]
    InvalidSignature,

    #[error("Trust anchor is unusable: {0}")]
    TrustAnchor(String),

    #[error("Beacon record is stale ({age_secs}s old, max {max_age_secs}s)")]
    StaleRecord { age_secs: i64, max_age_secs: i64 },

    #[error("Couldn't update to the latest record: {0}")]
    Refresh(#[source] Box<BeaconError>),

    #[error("Beacon configuration invalid: {0}")]
    Config(String),
}

impl BeaconError {
    /// Get the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BeaconError::Transport(_) | BeaconError::HttpStatus { .. } => ErrorKind::Transport,
            BeaconError::Decode(_) => ErrorKind::Decode,
            BeaconError::MissingField(_) => ErrorKind::Normalize,
            BeaconError::MalformedField { .. }
            | BeaconError::InvalidSignature
            | BeaconError::TrustAnchor(_) => ErrorKind::Verification,
            BeaconError::StaleRecord { .. } => ErrorKind::Stale,
            BeaconError::Refresh(_) => ErrorKind::Refresh,
            BeaconError::Config(_) => ErrorKind::Config,
        }
    }

    /// Get the stable error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            BeaconError::Transport(_) => "transport_error",
            BeaconError::HttpStatus { .. } => "http_status",
            BeaconError::Decode(_) => "decode_error",
            BeaconError::MissingField(_) => "missing_field",
            BeaconError::MalformedField { .. } => "malformed_field",
            BeaconError::InvalidSignature => "invalid_signature",
            BeaconError::TrustAnchor(_) => "trust_anchor",
            BeaconError::StaleRecord { .. } => "stale_record",
            BeaconError::Refresh(_) => "refresh_failed",
            BeaconError::Config(_) => "config_error",
        }
    }
}
