// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Beacon Records
//!
//! A beacon record is one periodic output of the randomness beacon: a
//! 512-bit seed, the previous output, an RSA signature over both and the
//! resulting output value, stamped with the time it was generated.
//!
//! ## Pipeline
//!
//! 1. [`wire::decode`] turns the response body into an untrusted [`RawRecord`]
//! 2. [`normalize::normalize`] converts it into a typed [`Record`]
//! 3. The verifier checks the raw fields before the record is handed out
//!
//! ## Sentinels
//!
//! Fields that fail to parse hold `-1` ([`INVALID`]). A verified record never
//! carries a sentinel in a signed field, since the signature check parses
//! those fields strictly.

pub mod normalize;
pub mod wire;

use chrono::{DateTime, Duration, Utc};
use num_bigint::{BigInt, Sign};

pub use normalize::normalize;
pub use wire::{decode, RawRecord};

/// Sentinel for a field that could not be parsed.
pub const INVALID: i64 = -1;

/// Size of the seed, previous output and output values.
pub const VALUE_BYTES: usize = 64;

/// Size of the beacon's RSA-2048 signature.
pub const SIGNATURE_BYTES: usize = 256;

/// Beacon status code carried by each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// Regular record chained to its predecessor
    Regular,
    /// First record of a new chain
    ChainStart,
    /// Record following a gap in publication
    TimeGap,
    /// Any other code, or the sentinel
    Unknown(i64),
}

impl From<i64> for RecordStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => RecordStatus::Regular,
            1 => RecordStatus::ChainStart,
            2 => RecordStatus::TimeGap,
            other => RecordStatus::Unknown(other),
        }
    }
}

/// Verified, typed beacon record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Format version announced by the beacon
    pub version: String,
    /// Seconds between records, or [`INVALID`]
    pub frequency: i64,
    /// Generation time
    pub timestamp: DateTime<Utc>,
    pub seed_value: BigInt,
    pub previous_output_value: BigInt,
    pub signature_value: BigInt,
    pub output_value: BigInt,
    /// Raw status code, or [`INVALID`]
    pub status_code: i64,
}

impl Record {
    pub fn status(&self) -> RecordStatus {
        RecordStatus::from(self.status_code)
    }

    /// Age of the record at `now`. Negative for records from the future.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    pub fn seed_hex(&self) -> Option<String> {
        encode_hex(&self.seed_value, VALUE_BYTES)
    }

    pub fn previous_output_hex(&self) -> Option<String> {
        encode_hex(&self.previous_output_value, VALUE_BYTES)
    }

    pub fn output_hex(&self) -> Option<String> {
        encode_hex(&self.output_value, VALUE_BYTES)
    }

    /// Signature as published, i.e. in the beacon's reversed byte order.
    pub fn signature_hex(&self) -> Option<String> {
        encode_hex(&self.signature_value, SIGNATURE_BYTES)
    }
}

/// Render a non-negative value as upper-case hex, left-padded to `width`
/// bytes. Returns `None` for the sentinel or any negative value.
///
/// The beacon publishes upper-case hex, so published values round-trip
/// exactly. Lower-case input round-trips only up to ASCII case.
pub fn encode_hex(value: &BigInt, width: usize) -> Option<String> {
    let (sign, bytes) = value.to_bytes_be();
    if sign == Sign::Minus {
        return None;
    }
    let bytes = if bytes == [0] { Vec::new() } else { bytes };

    let mut padded = vec![0u8; width.saturating_sub(bytes.len())];
    padded.extend_from_slice(&bytes);
    Some(hex::encode_upper(padded))
}
