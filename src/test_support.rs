// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures and fakes for unit tests.
//!
//! The records under `testdata/` were signed with `beacon-test-key.pem` in
//! the beacon's layout and signature byte order, so they verify against
//! [`test_anchor`] and against nothing else.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;

use crate::clock::Clock;
use crate::error::BeaconError;
use crate::transport::{HttpResponse, Transport};
use crate::verify::CertificateAnchor;

pub const TEST_CERT_PEM: &str = include_str!("../testdata/beacon-test-cert.pem");
pub const TEST_KEY_PEM: &str = include_str!("../testdata/beacon-test-key.pem");
pub const OTHER_CERT_PEM: &str = include_str!("../testdata/other-cert.pem");

/// Record stamped 1700000000 (2023-11-14T22:13:20Z).
pub const RECORD_1700000000: &str = include_str!("../testdata/record-1700000000.xml");
/// The record one interval later, chained to the one above.
pub const RECORD_1700000060: &str = include_str!("../testdata/record-1700000060.xml");

pub const T0: i64 = 1_700_000_000;

pub fn test_anchor() -> CertificateAnchor {
    CertificateAnchor::from_pem(TEST_CERT_PEM).unwrap()
}

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn at(secs: i64) -> Self {
        Self {
            now: Arc::new(Mutex::new(at(secs))),
        }
    }

    pub fn set(&self, secs: i64) {
        *self.now.lock().unwrap() = at(secs);
    }

    pub fn advance(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Transport answering from a script of responses, recording each URL.
///
/// Once the script runs out the last response is repeated.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, String>>>>,
    last: Arc<Mutex<Option<Result<HttpResponse, String>>>>,
    requests: Arc<Mutex<Vec<String>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn always(body: &str) -> Self {
        Self::new().then_ok(body)
    }

    pub fn then_ok(self, body: &str) -> Self {
        self.push(Ok(HttpResponse::ok(body)))
    }

    pub fn then_status(self, status: StatusCode, body: &str) -> Self {
        self.push(Ok(HttpResponse::with_status(status, body)))
    }

    pub fn then_fail(self, message: &str) -> Self {
        self.push(Err(message.to_string()))
    }

    fn push(self, response: Result<HttpResponse, String>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, BeaconError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(url.to_string());

        let next = self.responses.lock().unwrap().pop_front();
        let response = match next {
            Some(response) => {
                *self.last.lock().unwrap() = Some(response.clone());
                response
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err("no scripted response".to_string())),
        };
        response.map_err(BeaconError::Transport)
    }
}
