// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory transport for unit tests.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use crate::error::{BeaconError, Result};
use crate::transport::{OutboundRequest, Transport};

/// Records every request instead of sending it.
pub(crate) struct RecordingTransport {
	beacons: Mutex<Vec<(Url, String)>>,
	dispatched: Mutex<Vec<OutboundRequest>>,
	sent: Mutex<Vec<OutboundRequest>>,
	beacon_available: AtomicBool,
	fail_status: AtomicU16,
}

impl RecordingTransport {
	pub(crate) fn new() -> Self {
		Self {
			beacons: Mutex::new(Vec::new()),
			dispatched: Mutex::new(Vec::new()),
			sent: Mutex::new(Vec::new()),
			beacon_available: AtomicBool::new(true),
			fail_status: AtomicU16::new(0),
		}
	}

	pub(crate) fn without_beacon() -> Self {
		let transport = Self::new();
		transport.beacon_available.store(false, Ordering::SeqCst);
		transport
	}

	pub(crate) fn fail_sends_with(&self, status: u16) {
		self.fail_status.store(status, Ordering::SeqCst);
	}

	pub(crate) fn beacons(&self) -> Vec<(Url, String)> {
		self.beacons.lock().clone()
	}

	pub(crate) fn dispatched(&self) -> Vec<OutboundRequest> {
		self.dispatched.lock().clone()
	}

	pub(crate) fn sent(&self) -> Vec<OutboundRequest> {
		self.sent.lock().clone()
	}

	pub(crate) fn total_requests(&self) -> usize {
		self.beacons.lock().len() + self.dispatched.lock().len() + self.sent.lock().len()
	}
}

#[async_trait]
impl Transport for RecordingTransport {
	fn beacon(&self, url: &Url, body: String) -> bool {
		if !self.beacon_available.load(Ordering::SeqCst) {
			return false;
		}
		self.beacons.lock().push((url.clone(), body));
		true
	}

	fn dispatch(&self, request: OutboundRequest) {
		self.dispatched.lock().push(request);
	}

	async fn send(&self, request: OutboundRequest) -> Result<()> {
		self.sent.lock().push(request);
		match self.fail_status.load(Ordering::SeqCst) {
			0 => Ok(()),
			status => Err(BeaconError::ServerError {
				status,
				message: "mock failure".to_string(),
			}),
		}
	}
}
