// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration file for the `pirsch` binary.
//!
//! The file describes the page being reported and its script elements:
//!
//! ```toml
//! log_level = "debug"
//! request_timeout_secs = 5
//!
//! [page]
//! url = "https://example.com/blog/post-1"
//! title = "Post 1"
//!
//! [page.scripts.pirschjs]
//! data-endpoint = "https://example.com/pirsch/hit"
//! data-exclude = "^/admin"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use pirsch_beacon::PageSnapshot;
use serde::Deserialize;
use thiserror::Error;

/// Errors loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// I/O error reading config file
	#[error("I/O error reading {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Could not determine the user config directory")]
	ConfigDirNotFound,

	/// Missing required field
	#[error("Missing required field: {0}")]
	MissingField(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
	pub log_level: Option<String>,
	pub request_timeout_secs: Option<u64>,
	pub user_agent: Option<String>,
	pub page: Option<PageSnapshot>,
}

/// Page fields given on the command line.
#[derive(Debug, Clone, Default)]
pub struct PageOverrides {
	pub url: Option<String>,
	pub title: Option<String>,
	pub referrer: Option<String>,
}

impl CliConfig {
	/// Parses a config file.
	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
			path: path.to_path_buf(),
			source,
		})
	}

	/// Loads the given file, or the default one when no path is given.
	///
	/// A missing default file is not an error; an explicitly named one is.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		if let Some(path) = path {
			return Self::from_file(path);
		}

		let default = default_config_path()?;
		if !default.exists() {
			tracing::debug!(path = %default.display(), "No config file, using defaults");
			return Ok(Self::default());
		}
		Self::from_file(&default)
	}

	pub fn request_timeout(&self) -> Option<Duration> {
		self.request_timeout_secs.map(Duration::from_secs)
	}

	/// The page to report, with command-line overrides applied.
	pub fn page(&self, overrides: &PageOverrides) -> Result<PageSnapshot, ConfigError> {
		let mut page = self.page.clone().unwrap_or_else(|| PageSnapshot::new(""));
		if let Some(url) = &overrides.url {
			page.url = url.clone();
		}
		if let Some(title) = &overrides.title {
			page.title = title.clone();
		}
		if let Some(referrer) = &overrides.referrer {
			page.referrer = referrer.clone();
		}

		if page.url.is_empty() {
			return Err(ConfigError::MissingField("page.url".to_string()));
		}
		Ok(page)
	}
}

/// `~/.config/pirsch/config.toml` on Linux, the platform equivalent elsewhere.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
	dirs::config_dir()
		.map(|dir| dir.join("pirsch").join("config.toml"))
		.ok_or(ConfigError::ConfigDirNotFound)
}
