// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversion of untrusted string fields into typed values.
//!
//! Normalization is total. A field that fails to parse is replaced by the
//! `-1` sentinel instead of aborting the record: the signature check runs
//! on the raw strings and rejects corrupt records on its own.

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use num_traits::Num;

use super::wire::RawRecord;
use super::{Record, INVALID};

/// Parse a base-10 integer, or [`INVALID`].
pub fn parse_decimal(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(INVALID)
}

/// Parse a base-16 big integer, or the `-1` sentinel.
///
/// Only hex digits are accepted: no sign, no `_` separators.
pub fn parse_hex(raw: &str) -> BigInt {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return BigInt::from(INVALID);
    }
    BigInt::from_str_radix(digits, 16).unwrap_or_else(|_| BigInt::from(INVALID))
}

/// Convert epoch seconds into a UTC timestamp.
///
/// Values chrono cannot represent map to the Unix epoch.
pub fn timestamp_from_secs(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Build a typed [`Record`] from its raw form.
pub fn normalize(raw: &RawRecord) -> Record {
    Record {
        version: raw.version.trim().to_string(),
        frequency: parse_decimal(&raw.frequency),
        timestamp: timestamp_from_secs(parse_decimal(&raw.time_stamp)),
        seed_value: parse_hex(&raw.seed_value),
        previous_output_value: parse_hex(&raw.previous_output_value),
        signature_value: parse_hex(&raw.signature_value),
        output_value: parse_hex(&raw.output_value),
        status_code: parse_decimal(&raw.status_code),
    }
}
