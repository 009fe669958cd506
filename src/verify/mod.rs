// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Record Signature Verification
//!
//! ## Flow
//!
//! 1. Hex-decode the published signature and reverse its bytes
//! 2. Rebuild the signed payload from the raw record fields
//! 3. Check it against the trust anchor (RSA PKCS#1 v1.5, SHA-512)
//!
//! Verification always runs on the untrusted [`RawRecord`], before the
//! typed record is released to callers.

pub mod anchor;
pub mod payload;

pub use anchor::{CertificateAnchor, TrustAnchor, BEACON_CERTIFICATE_PEM};
pub use payload::VerificationPayload;

use crate::error::BeaconError;
use crate::record::RawRecord;

/// Verify a raw record's signature against `anchor`.
pub fn verify_record(raw: &RawRecord, anchor: &dyn TrustAnchor) -> Result<(), BeaconError> {
    let payload = VerificationPayload::from_raw(raw)?;
    anchor.verify(&payload)
}
