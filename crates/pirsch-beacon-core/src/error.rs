// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for beacon configuration and payload construction.

use thiserror::Error;

/// Usage hint returned whenever an event is reported without a name.
pub const EVENT_NAME_USAGE: &str = "the event name is invalid (must be a non-empty string); usage: events.event(\"event name\", EventOptions::new().duration(42).meta_entry(\"key\", \"value\"))";

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while deriving configuration or building payloads.
#[derive(Debug, Error)]
pub enum CoreError {
	/// An include or exclude pattern is not a valid regular expression.
	#[error("invalid path pattern '{pattern}': {source}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	/// Custom events need a non-empty name.
	#[error("{}", EVENT_NAME_USAGE)]
	InvalidEventName,

	/// A page URL or endpoint could not be parsed.
	#[error("invalid URL: {0}")]
	InvalidUrl(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_invalid_event_name_message_carries_usage() {
		let err = CoreError::InvalidEventName;
		assert!(err.to_string().contains("non-empty string"));
		assert!(err.to_string().contains("usage"));
	}

	#[test]
	fn test_invalid_pattern_names_the_pattern() {
		let source = regex::Regex::new("(").unwrap_err();
		let err = CoreError::InvalidPattern {
			pattern: "(".to_string(),
			source,
		};
		assert!(err.to_string().starts_with("invalid path pattern '('"));
	}
}
