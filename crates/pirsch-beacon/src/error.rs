// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the beacon SDK.

use pirsch_beacon_core::CoreError;
use thiserror::Error;

/// Beacon SDK errors.
#[derive(Debug, Error)]
pub enum BeaconError {
	/// Configuration or payload validation failed.
	#[error(transparent)]
	Core(#[from] CoreError),

	/// The builder was not given a page.
	#[error("no page configured for the beacon")]
	MissingPage,

	/// The endpoint could not be resolved against the page URL.
	#[error("invalid endpoint '{endpoint}': {source}")]
	InvalidEndpoint {
		endpoint: String,
		#[source]
		source: url::ParseError,
	},

	/// HTTP request failed before a response arrived.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// The collector answered with a non-2xx status.
	#[error("server error ({status}): {message}")]
	ServerError { status: u16, message: String },

	/// Serialization error.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl BeaconError {
	/// True for errors raised before any request was attempted.
	pub fn is_validation(&self) -> bool {
		matches!(
			self,
			BeaconError::Core(CoreError::InvalidEventName) | BeaconError::InvalidEndpoint { .. }
		)
	}
}

/// Result type alias for beacon operations.
pub type Result<T> = std::result::Result<T, BeaconError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_invalid_event_name_is_validation() {
		let err = BeaconError::from(CoreError::InvalidEventName);
		assert!(err.is_validation());
		assert!(err.to_string().contains("non-empty string"));
	}

	#[test]
	fn test_server_error_is_not_validation() {
		let err = BeaconError::ServerError {
			status: 503,
			message: "Service Unavailable".to_string(),
		};
		assert!(!err.is_validation());
		assert_eq!(err.to_string(), "server error (503): Service Unavailable");
	}

	#[test]
	fn test_invalid_endpoint_message() {
		let err = BeaconError::InvalidEndpoint {
			endpoint: "/pirsch/hit".to_string(),
			source: url::ParseError::RelativeUrlWithoutBase,
		};
		assert!(err.is_validation());
		assert!(err.to_string().starts_with("invalid endpoint '/pirsch/hit'"));
	}
}
