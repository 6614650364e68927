// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client-side navigation tracking.
//!
//! Instead of patching the host's history in place, the host hands its
//! history to [`TrackedHistory`] (or a plain navigation function to
//! [`wrap_navigation`]) and uses the wrapped value from then on. The
//! original call always completes before the page view is reported, so the
//! report sees the new location.

use pirsch_beacon_core::{Page, SharedPage};
use serde_json::Value;

use crate::pageview::PageViewTracker;

/// The host's history-mutation entry point.
pub trait History {
	type Output;

	fn push_state(&mut self, state: Value, title: &str, url: Option<&str>) -> Self::Output;
}

/// A history whose every `push_state` is followed by one page view.
#[derive(Debug)]
pub struct TrackedHistory<H> {
	inner: H,
	tracker: PageViewTracker,
}

impl<H> TrackedHistory<H> {
	pub fn new(inner: H, tracker: PageViewTracker) -> Self {
		Self { inner, tracker }
	}

	/// Back/forward navigation listener: reports one page view per call.
	pub fn pop_state(&self) {
		self.tracker.hit();
	}

	pub fn inner(&self) -> &H {
		&self.inner
	}

	pub fn into_inner(self) -> H {
		self.inner
	}
}

impl<H: History> History for TrackedHistory<H> {
	type Output = H::Output;

	fn push_state(&mut self, state: Value, title: &str, url: Option<&str>) -> Self::Output {
		let output = self.inner.push_state(state, title, url);
		self.tracker.hit();
		output
	}
}

/// Wraps a navigation function so each call also reports a page view.
/// Arguments and return value pass through untouched.
pub fn wrap_navigation<A, R, F>(mut original: F, tracker: PageViewTracker) -> impl FnMut(A) -> R
where
	F: FnMut(A) -> R,
{
	move |args| {
		let output = original(args);
		tracker.hit();
		output
	}
}

/// A history entry recorded by [`PageHistory`].
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
	pub state: Value,
	pub url: String,
}

/// In-memory history driving a [`SharedPage`].
#[derive(Debug, Clone)]
pub struct PageHistory {
	page: SharedPage,
	entries: Vec<HistoryEntry>,
}

impl PageHistory {
	pub fn new(page: SharedPage) -> Self {
		let entries = vec![HistoryEntry {
			state: Value::Null,
			url: page.href(),
		}];
		Self { page, entries }
	}

	pub fn entries(&self) -> &[HistoryEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl History for PageHistory {
	type Output = ();

	// The title argument is ignored, as browsers do.
	fn push_state(&mut self, state: Value, _title: &str, url: Option<&str>) {
		if let Some(url) = url {
			self.page.navigate(url);
		}
		self.entries.push(HistoryEntry {
			state,
			url: self.page.href(),
		});
	}
}
