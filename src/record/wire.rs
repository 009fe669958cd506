// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wire format decoding.
//!
//! The beacon answers with an XML document:
//!
//! ```text
//! <record>
//!   <version/> <frequency/> <timeStamp/> <seedValue/>
//!   <previousOutputValue/> <signatureValue/> <outputValue/> <statusCode/>
//! </record>
//! ```
//!
//! Decoding keeps every field as the exact string received, surrounding
//! whitespace included. Trimming is left to the consumers: the normalizer
//! and the payload builder trim numeric and hex fields, while `version` is
//! signed byte for byte. Nothing here is trusted until the verifier has
//! checked the signature.

use serde::Deserialize;

use crate::error::BeaconError;

/// Untrusted record, fields exactly as received.
///
/// Absent elements decode to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRecord {
    pub version: String,
    pub frequency: String,
    pub time_stamp: String,
    pub seed_value: String,
    pub previous_output_value: String,
    pub signature_value: String,
    pub output_value: String,
    pub status_code: String,
}

impl RawRecord {
    /// Reject records missing a field needed to verify or date them.
    ///
    /// Error pages served with a success status decode to an all-empty
    /// record; this is where they are caught.
    pub fn require_mandatory(&self) -> Result<(), BeaconError> {
        let mandatory = [
            ("version", &self.version),
            ("timeStamp", &self.time_stamp),
            ("signatureValue", &self.signature_value),
        ];
        for (name, value) in mandatory {
            if value.trim().is_empty() {
                return Err(BeaconError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// Decode a response body into a [`RawRecord`].
pub fn decode(body: &[u8]) -> Result<RawRecord, BeaconError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| BeaconError::Decode(format!("body is not UTF-8: {e}")))?;

    quick_xml::de::from_str(text).map_err(|e| BeaconError::Decode(e.to_string()))
}
