// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Beacon - Verified Randomness Beacon Client
//!
//! This crate fetches signed, timestamped randomness records from the NIST
//! randomness beacon, verifies each one against the embedded beacon
//! certificate and its freshness, and derives reproducible pseudo-random
//! generators from verified records.
//!
//! Beacon output is public. Nothing here is suitable as a secret key.
//!
//! ## Modules
//!
//! - `client` - Record fetcher and lookup endpoints
//! - `record` - Wire decoding and typed records
//! - `verify` - Signature payload reconstruction and trust anchors
//! - `generator` - Seeded, optionally self-refreshing generator
//! - `transport` - Pluggable HTTP capability (reqwest by default)
//! - `config` - Environment-driven configuration
//!
//! ## Usage
//!
//! ```rust,no_run
//! use relational_beacon::{BeaconClient, SeededGenerator};
//!
//! let client = BeaconClient::from_env()?;
//! let record = client.fetch_latest()?;
//! let mut generator = SeededGenerator::from_record(&record);
//! let value = generator.next_int()?;
//! println!("{value}");
//! # Ok::<(), relational_beacon::BeaconError>(())
//! ```

pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod generator;
pub mod record;
pub mod telemetry;
pub mod transport;
pub mod verify;

#[cfg(test)]
mod test_support;

pub use client::{BeaconClient, Endpoint, Freshness};
pub use clock::{Clock, SystemClock};
pub use config::BeaconConfig;
pub use error::{BeaconError, ErrorKind};
pub use generator::{seed_from_value, SeededGenerator};
pub use record::{Record, RecordStatus};
pub use transport::{HttpResponse, ReqwestTransport, Transport};
pub use verify::{CertificateAnchor, TrustAnchor};
