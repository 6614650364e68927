// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The go/no-go decision made once per page load.

use crate::config::BeaconConfig;
use crate::consent::check_consent;
use crate::page::Page;

/// Why a page load is not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
	/// The browser sends a do-not-track signal.
	DoNotTrack,
	/// The visitor stored the opt-out flag.
	OptedOut,
	/// An include list is configured and the path matches none of it.
	NotIncluded,
	/// The path matches an exclude pattern.
	Excluded,
}

impl std::fmt::Display for BlockReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			BlockReason::DoNotTrack => write!(f, "do_not_track"),
			BlockReason::OptedOut => write!(f, "opted_out"),
			BlockReason::NotIncluded => write!(f, "not_included"),
			BlockReason::Excluded => write!(f, "excluded"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
	Allowed,
	Blocked(BlockReason),
}

impl GateDecision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, GateDecision::Allowed)
	}
}

/// Runs consent first, then the page filter on the current path.
pub fn evaluate(page: &dyn Page, config: &BeaconConfig) -> GateDecision {
	if let Some(reason) = check_consent(page) {
		return GateDecision::Blocked(reason);
	}

	match config.filter.check(&page.pathname()) {
		Some(reason) => GateDecision::Blocked(reason),
		None => GateDecision::Allowed,
	}
}
