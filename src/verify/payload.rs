// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reconstruction of the byte sequence the beacon signed.

use crate::error::BeaconError;
use crate::record::RawRecord;

/// Signed bytes and the signature over them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationPayload {
    /// version ++ frequency (u32 BE) ++ timestamp (i64 BE) ++ seed ++
    /// previous output ++ status code (u32 BE)
    pub signed: Vec<u8>,
    /// Signature in the byte order the verification primitive expects
    pub signature: Vec<u8>,
}

impl VerificationPayload {
    /// Build the payload from the raw record strings.
    ///
    /// Works on the raw fields rather than the normalized record so that a
    /// field the normalizer degraded to a sentinel can never verify.
    /// Numeric and hex fields are trimmed before decoding; `version` is
    /// signed exactly as received.
    pub fn from_raw(raw: &RawRecord) -> Result<Self, BeaconError> {
        let mut signature = decode_hex("signatureValue", &raw.signature_value)?;
        // The beacon publishes the signature least-significant byte first.
        signature.reverse();

        let frequency: u32 = parse_int("frequency", &raw.frequency)?;
        let timestamp: i64 = parse_int("timeStamp", &raw.time_stamp)?;
        let seed = decode_hex("seedValue", &raw.seed_value)?;
        let previous = decode_hex("previousOutputValue", &raw.previous_output_value)?;
        let status_code: u32 = parse_int("statusCode", &raw.status_code)?;

        let mut signed = Vec::with_capacity(
            raw.version.len() + 4 + 8 + seed.len() + previous.len() + 4,
        );
        signed.extend_from_slice(raw.version.as_bytes());
        signed.extend_from_slice(&frequency.to_be_bytes());
        signed.extend_from_slice(&timestamp.to_be_bytes());
        signed.extend_from_slice(&seed);
        signed.extend_from_slice(&previous);
        signed.extend_from_slice(&status_code.to_be_bytes());

        Ok(Self { signed, signature })
    }
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, BeaconError> {
    hex::decode(value.trim()).map_err(|e| BeaconError::MalformedField {
        field,
        reason: e.to_string(),
    })
}

fn parse_int<T>(field: &'static str, value: &str) -> Result<T, BeaconError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| BeaconError::MalformedField {
        field,
        reason: format!("`{value}`: {e}"),
    })
}
