// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Seeded Generator
//!
//! A pseudo-random generator whose state is derived from a verified beacon
//! record. Anyone holding the same record can reproduce the sequence.
//!
//! **Not a secret source.** Beacon values are public; never use generator
//! output as key material.
//!
//! ## Seed Derivation
//!
//! The 512-bit seed value is shifted right by 448 bits and the remaining
//! most-significant 64 bits are taken as a signed integer, which seeds a
//! ChaCha20 engine.
//!
//! ## Auto-Update
//!
//! A generator built with [`SeededGenerator::from_latest`] checks on each
//! [`SeededGenerator::next_int`] call whether the refresh interval has passed
//! since its last check. If so it fetches the latest record and reseeds
//! before producing the value, but only when that record is newer than the
//! one it already holds. There is no background task.

use chrono::{DateTime, Utc};
use num_bigint::{BigInt, Sign};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};

use crate::client::BeaconClient;
use crate::error::BeaconError;
use crate::record::Record;

/// Bits dropped from the seed value before truncation.
const SEED_SHIFT: u32 = 448;

/// Derive the engine seed from a record's seed value.
///
/// Takes the low 64 bits of `value >> 448` and applies the sign, so the
/// `-1` sentinel maps to `-1`.
pub fn seed_from_value(value: &BigInt) -> i64 {
    let shifted = value >> SEED_SHIFT;
    let (sign, digits) = shifted.to_u64_digits();
    let low = digits.first().copied().unwrap_or(0) as i64;
    match sign {
        Sign::Minus => low.wrapping_neg(),
        _ => low,
    }
}

/// Reseeding state of an auto-updating generator.
struct Refresher {
    client: BeaconClient,
    /// Timestamp of the record the engine was seeded from
    seeded_at: DateTime<Utc>,
    /// Start of the current refresh interval
    checked_at: DateTime<Utc>,
}

/// Deterministic generator seeded from a beacon record.
pub struct SeededGenerator {
    rng: ChaCha20Rng,
    seed: i64,
    refresher: Option<Refresher>,
}

impl SeededGenerator {
    /// Seed from `record`. The generator never reseeds on its own.
    pub fn from_record(record: &Record) -> Self {
        Self::from_seed(seed_from_value(&record.seed_value))
    }

    /// Seed from an explicit value.
    pub fn from_seed(seed: i64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed as u64),
            seed,
            refresher: None,
        }
    }

    /// Seed from the latest record and keep following new records.
    pub fn from_latest(client: &BeaconClient) -> Result<Self, BeaconError> {
        let record = client.fetch_latest()?;
        let mut generator = Self::from_record(&record);
        generator.refresher = Some(Refresher {
            client: client.clone(),
            seeded_at: record.timestamp,
            checked_at: record.timestamp,
        });
        Ok(generator)
    }

    /// Reseed with `seed`. Disables auto-update.
    pub fn set_seed(&mut self, seed: i64) {
        self.reseed(seed);
        self.refresher = None;
    }

    /// Next non-negative pseudo-random integer.
    ///
    /// Auto-updating generators may fetch the latest record first; if that
    /// fails the error is returned and the current state is kept.
    pub fn next_int(&mut self) -> Result<i64, BeaconError> {
        self.refresh_if_due()?;
        Ok((self.rng.next_u64() >> 1) as i64)
    }

    /// Seed the engine was last seeded with.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn is_auto_updating(&self) -> bool {
        self.refresher.is_some()
    }

    /// Timestamp of the record an auto-updating generator last used.
    pub fn seeded_at(&self) -> Option<DateTime<Utc>> {
        self.refresher.as_ref().map(|r| r.seeded_at)
    }

    fn reseed(&mut self, seed: i64) {
        self.rng = ChaCha20Rng::seed_from_u64(seed as u64);
        self.seed = seed;
    }

    fn refresh_if_due(&mut self) -> Result<(), BeaconError> {
        let Some(refresher) = &self.refresher else {
            return Ok(());
        };

        let interval = chrono::Duration::from_std(refresher.client.config().refresh_interval)
            .unwrap_or(chrono::Duration::MAX);
        let due_at = refresher
            .checked_at
            .checked_add_signed(interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let now = refresher.client.now();
        if now <= due_at {
            return Ok(());
        }

        let record = refresher
            .client
            .fetch_latest()
            .map_err(|e| BeaconError::Refresh(Box::new(e)))?;

        if record.timestamp <= refresher.seeded_at {
            debug!(
                timestamp = %record.timestamp,
                "Latest beacon record unchanged, keeping current seed"
            );
            if let Some(refresher) = self.refresher.as_mut() {
                refresher.checked_at = now;
            }
            return Ok(());
        }

        info!(
            previous = %refresher.seeded_at,
            timestamp = %record.timestamp,
            "Reseeding generator from latest beacon record"
        );

        let seeded_at = record.timestamp;
        self.reseed(seed_from_value(&record.seed_value));
        if let Some(refresher) = self.refresher.as_mut() {
            refresher.seeded_at = seeded_at;
            refresher.checked_at = seeded_at;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SeededGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededGenerator")
            .field("seed", &self.seed)
            .field("seeded_at", &self.seeded_at())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BeaconConfig;
    use crate::error::ErrorKind;
    use crate::record::{decode, normalize};
    use crate::test_support::{
        at, test_anchor, ManualClock, ScriptedTransport, RECORD_1700000000, RECORD_1700000060, T0,
    };

    /// Top 64 bits of the seed in `record-1700000000.xml`.
    const FIRST_SEED: u64 = 0xB408_1C33_E20A_A54F;

    fn record(body: &str) -> Record {
        normalize(&decode(body.as_bytes()).unwrap())
    }

    fn client(transport: ScriptedTransport, clock: ManualClock) -> BeaconClient {
        client_with(BeaconConfig::default(), transport, clock)
    }

    fn client_with(
        config: BeaconConfig,
        transport: ScriptedTransport,
        clock: ManualClock,
    ) -> BeaconClient {
        BeaconClient::new(BeaconConfig {
            base_url: "https://beacon.test".to_string(),
            ..config
        })
        .unwrap()
        .with_transport(transport)
        .with_trust_anchor(test_anchor())
        .with_clock(clock)
    }

    fn take(generator: &mut SeededGenerator, n: usize) -> Vec<i64> {
        (0..n).map(|_| generator.next_int().unwrap()).collect()
    }

    #[test]
    fn seed_keeps_most_significant_64_bits() {
        let rec = record(RECORD_1700000000);
        assert_eq!(seed_from_value(&rec.seed_value), FIRST_SEED as i64);

        let top = BigInt::from(0x0123_4567_89AB_CDEFu64) << 448u32;
        assert_eq!(seed_from_value(&top), 0x0123_4567_89AB_CDEF);
        assert_eq!(seed_from_value(&(top + BigInt::from(u64::MAX))), 0x0123_4567_89AB_CDEF);
    }

    #[test]
    fn small_and_sentinel_values_seed_predictably() {
        assert_eq!(seed_from_value(&BigInt::from(0)), 0);
        assert_eq!(seed_from_value(&BigInt::from(u64::MAX)), 0);
        assert_eq!(seed_from_value(&BigInt::from(-1)), -1);
    }

    #[test]
    fn same_record_same_sequence() {
        let rec = record(RECORD_1700000000);
        let mut a = SeededGenerator::from_record(&rec);
        let mut b = SeededGenerator::from_record(&rec);

        assert_eq!(take(&mut a, 32), take(&mut b, 32));
        assert!(!a.is_auto_updating());
        assert_eq!(a.seeded_at(), None);
    }

    #[test]
    fn different_records_diverge() {
        let mut a = SeededGenerator::from_record(&record(RECORD_1700000000));
        let mut b = SeededGenerator::from_record(&record(RECORD_1700000060));
        assert_ne!(take(&mut a, 8), take(&mut b, 8));
    }

    #[test]
    fn values_are_non_negative() {
        let mut generator = SeededGenerator::from_seed(-7);
        assert!(take(&mut generator, 256).iter().all(|v| *v >= 0));
    }

    #[test]
    fn set_seed_restarts_sequence() {
        let mut generator = SeededGenerator::from_seed(42);
        let first = take(&mut generator, 4);
        generator.set_seed(42);
        assert_eq!(take(&mut generator, 4), first);
        assert_eq!(generator.seed(), 42);
    }

    #[test]
    fn from_latest_enables_auto_update() {
        let transport = ScriptedTransport::always(RECORD_1700000000);
        let client = client(transport.clone(), ManualClock::at(T0 + 5));

        let mut generator = SeededGenerator::from_latest(&client).unwrap();
        assert!(generator.is_auto_updating());
        assert_eq!(generator.seeded_at(), Some(at(T0)));
        assert_eq!(generator.seed(), FIRST_SEED as i64);

        let mut plain = SeededGenerator::from_record(&record(RECORD_1700000000));
        assert_eq!(take(&mut generator, 4), take(&mut plain, 4));
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn from_latest_propagates_fetch_errors() {
        let client = client(
            ScriptedTransport::always(RECORD_1700000000),
            ManualClock::at(T0 + 600),
        );
        let err = SeededGenerator::from_latest(&client).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Stale);
    }

    #[test]
    fn refreshes_once_per_window() {
        let clock = ManualClock::at(T0 + 5);
        let transport = ScriptedTransport::new()
            .then_ok(RECORD_1700000000)
            .then_ok(RECORD_1700000060);
        let client = client(transport.clone(), clock.clone());

        let mut generator = SeededGenerator::from_latest(&client).unwrap();
        generator.next_int().unwrap();
        clock.set(T0 + 60);
        generator.next_int().unwrap();
        assert_eq!(transport.calls(), 1);

        clock.set(T0 + 61);
        let refreshed = generator.next_int().unwrap();
        assert_eq!(transport.calls(), 2);
        assert_eq!(generator.seeded_at(), Some(at(T0 + 60)));

        let mut expected = SeededGenerator::from_record(&record(RECORD_1700000060));
        assert_eq!(refreshed, expected.next_int().unwrap());

        for secs in [T0 + 61, T0 + 90, T0 + 120] {
            clock.set(secs);
            generator.next_int().unwrap();
        }
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn failed_refresh_is_recoverable() {
        let clock = ManualClock::at(T0 + 5);
        let transport = ScriptedTransport::new()
            .then_ok(RECORD_1700000000)
            .then_fail("network unreachable")
            .then_ok(RECORD_1700000060);
        let client = client(transport.clone(), clock.clone());

        let mut generator = SeededGenerator::from_latest(&client).unwrap();
        clock.set(T0 + 65);

        let err = generator.next_int().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Refresh);
        assert!(err.to_string().contains("network unreachable"));
        assert_eq!(generator.seeded_at(), Some(at(T0)));
        assert_eq!(generator.seed(), FIRST_SEED as i64);

        assert!(generator.next_int().is_ok());
        assert_eq!(generator.seeded_at(), Some(at(T0 + 60)));
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn unchanged_record_keeps_sequence_running() {
        let clock = ManualClock::at(T0 + 5);
        let transport = ScriptedTransport::always(RECORD_1700000000);
        let config = BeaconConfig {
            refresh_interval: std::time::Duration::from_secs(10),
            ..BeaconConfig::default()
        };
        let client = client_with(config, transport.clone(), clock.clone());

        let mut generator = SeededGenerator::from_latest(&client).unwrap();
        clock.set(T0 + 20);
        let values = take(&mut generator, 4);

        let mut plain = SeededGenerator::from_record(&record(RECORD_1700000000));
        assert_eq!(values, take(&mut plain, 4));
        assert_ne!(values[0], values[1]);
        assert_eq!(transport.calls(), 2);
        assert_eq!(generator.seeded_at(), Some(at(T0)));

        // The next check waits a full interval from the last one.
        clock.set(T0 + 30);
        assert_eq!(generator.next_int().unwrap(), plain.next_int().unwrap());
        assert_eq!(transport.calls(), 2);

        clock.set(T0 + 31);
        assert_eq!(generator.next_int().unwrap(), plain.next_int().unwrap());
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn set_seed_stops_auto_update() {
        let clock = ManualClock::at(T0 + 5);
        let transport = ScriptedTransport::always(RECORD_1700000000);
        let client = client(transport.clone(), clock.clone());

        let mut generator = SeededGenerator::from_latest(&client).unwrap();
        generator.set_seed(7);
        clock.advance(3_600);

        assert!(generator.next_int().is_ok());
        assert!(!generator.is_auto_updating());
        assert_eq!(transport.calls(), 1);
    }
}
