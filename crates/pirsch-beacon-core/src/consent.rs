// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Visitor consent.

use crate::gate::BlockReason;
use crate::page::Page;

/// Key of the persisted opt-out flag.
pub const OPT_OUT_KEY: &str = "disable_pirsch";

/// Do-not-track value meaning "do not track me".
pub const DO_NOT_TRACK_ENABLED: &str = "1";

/// Returns the reason tracking is refused, or `None` if it may proceed.
///
/// Any non-empty value stored under [`OPT_OUT_KEY`] counts as an opt-out.
/// Hosts without either API are treated as not opted out.
pub fn check_consent(page: &dyn Page) -> Option<BlockReason> {
	if page.do_not_track().as_deref() == Some(DO_NOT_TRACK_ENABLED) {
		return Some(BlockReason::DoNotTrack);
	}

	if page
		.stored_item(OPT_OUT_KEY)
		.is_some_and(|value| !value.is_empty())
	{
		return Some(BlockReason::OptedOut);
	}

	None
}
