// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trust anchors for record signatures.
//!
//! ## Security
//!
//! - Production trust is the beacon certificate compiled into the binary
//! - There is no runtime configuration of trust; tests inject their own
//!   anchor through [`TrustAnchor`]
//! - Only the certificate's public key is used. Validity dates and the
//!   issuing chain are not checked (the beacon certificate is long expired
//!   but still signs archived records)

use std::sync::OnceLock;

use ring::signature::{UnparsedPublicKey, RSA_PKCS1_2048_8192_SHA512};
use x509_parser::public_key::PublicKey;

use super::payload::VerificationPayload;
use crate::error::BeaconError;

/// PEM tag expected for the anchor certificate.
const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// Beacon signing certificate (CN=beacon.nist.gov).
pub const BEACON_CERTIFICATE_PEM: &str = include_str!("../../certs/beacon.nist.gov.pem");

static EMBEDDED: OnceLock<CertificateAnchor> = OnceLock::new();

/// Capability that decides whether a payload was signed by the beacon.
pub trait TrustAnchor: Send + Sync {
    fn verify(&self, payload: &VerificationPayload) -> Result<(), BeaconError>;
}

/// RSA public key taken from an X.509 certificate, checked with
/// PKCS#1 v1.5 and SHA-512.
#[derive(Debug, Clone)]
pub struct CertificateAnchor {
    /// DER `RSAPublicKey` from the certificate's SubjectPublicKeyInfo
    public_key: Vec<u8>,
    subject: String,
}

impl CertificateAnchor {
    /// Parse a PEM file holding exactly one certificate.
    pub fn from_pem(pem_text: &str) -> Result<Self, BeaconError> {
        let blocks = pem::parse_many(pem_text)
            .map_err(|e| BeaconError::TrustAnchor(format!("Invalid PEM: {e}")))?;

        let [block] = blocks.as_slice() else {
            return Err(BeaconError::TrustAnchor(format!(
                "expected exactly one certificate, found {} PEM blocks",
                blocks.len()
            )));
        };
        if block.tag() != CERTIFICATE_TAG {
            return Err(BeaconError::TrustAnchor(format!(
                "expected a {CERTIFICATE_TAG} block, found {}",
                block.tag()
            )));
        }

        Self::from_der(block.contents())
    }

    /// Parse a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, BeaconError> {
        let (remainder, cert) = x509_parser::parse_x509_certificate(der)
            .map_err(|e| BeaconError::TrustAnchor(format!("Invalid certificate: {e}")))?;
        if !remainder.is_empty() {
            return Err(BeaconError::TrustAnchor(format!(
                "{} trailing bytes after certificate",
                remainder.len()
            )));
        }

        let spki = cert.public_key();
        match spki.parsed() {
            Ok(PublicKey::RSA(_)) => {}
            Ok(_) => {
                return Err(BeaconError::TrustAnchor(
                    "certificate key is not RSA".to_string(),
                ))
            }
            Err(e) => {
                return Err(BeaconError::TrustAnchor(format!(
                    "Invalid public key: {e}"
                )))
            }
        }

        Ok(Self {
            public_key: spki.subject_public_key.data.to_vec(),
            subject: cert.subject().to_string(),
        })
    }

    /// The anchor built from [`BEACON_CERTIFICATE_PEM`], parsed on first use.
    ///
    /// # Panics
    ///
    /// If the embedded certificate is malformed, which is a build defect.
    pub fn embedded() -> &'static CertificateAnchor {
        EMBEDDED.get_or_init(|| {
            CertificateAnchor::from_pem(BEACON_CERTIFICATE_PEM)
                .expect("embedded beacon certificate must parse")
        })
    }

    /// Certificate subject, for logging.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl TrustAnchor for CertificateAnchor {
    fn verify(&self, payload: &VerificationPayload) -> Result<(), BeaconError> {
        UnparsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA512, &self.public_key)
            .verify(&payload.signed, &payload.signature)
            .map_err(|_| BeaconError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::decode;
    use crate::test_support::{
        test_anchor, OTHER_CERT_PEM, RECORD_1700000000, TEST_CERT_PEM, TEST_KEY_PEM,
    };

    fn published_payload() -> VerificationPayload {
        let raw = decode(RECORD_1700000000.as_bytes()).unwrap();
        VerificationPayload::from_raw(&raw).unwrap()
    }

    #[test]
    fn embedded_certificate_parses() {
        let anchor = CertificateAnchor::embedded();
        assert!(anchor.subject().contains("beacon.nist.gov"));
        assert!(std::ptr::eq(anchor, CertificateAnchor::embedded()));
    }

    #[test]
    fn accepts_record_signed_by_anchor_key() {
        assert!(test_anchor().verify(&published_payload()).is_ok());
    }

    #[test]
    fn rejects_record_under_foreign_certificate() {
        let other = CertificateAnchor::from_pem(OTHER_CERT_PEM).unwrap();
        assert!(matches!(
            other.verify(&published_payload()),
            Err(BeaconError::InvalidSignature)
        ));
        assert!(matches!(
            CertificateAnchor::embedded().verify(&published_payload()),
            Err(BeaconError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_unreversed_signature() {
        let mut payload = published_payload();
        payload.signature.reverse();
        assert!(matches!(
            test_anchor().verify(&payload),
            Err(BeaconError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_tampered_payload() {
        let mut payload = published_payload();
        let last = payload.signed.len() - 1;
        payload.signed[last] ^= 0x01;
        assert!(test_anchor().verify(&payload).is_err());
    }

    #[test]
    fn rejects_non_certificate_pem() {
        let err = CertificateAnchor::from_pem(TEST_KEY_PEM).unwrap_err();
        assert_eq!(err.error_code(), "trust_anchor");

        let two = format!("{TEST_CERT_PEM}\n{OTHER_CERT_PEM}");
        let err = CertificateAnchor::from_pem(&two).unwrap_err();
        assert!(err.to_string().contains("exactly one certificate"));

        assert!(CertificateAnchor::from_pem("not a pem").is_err());
    }
}
