// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Include/exclude path filtering.
//!
//! Patterns are regular expressions searched anywhere in the path (anchor
//! them with `^` to match a prefix). They are compiled once when the
//! configuration is loaded; a list containing a malformed pattern is logged
//! and dropped so it can never block or crash tracking.

use regex::Regex;
use tracing::warn;

use crate::attributes::{ScriptAttributes, ATTR_EXCLUDE, ATTR_INCLUDE};
use crate::error::{CoreError, Result};
use crate::gate::BlockReason;

/// Decides whether a path matches.
pub trait Matcher: Send + Sync {
	fn matches(&self, path: &str) -> bool;
}

/// An ordered list of compiled path patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
	patterns: Vec<Regex>,
}

impl PatternSet {
	pub fn empty() -> Self {
		Self::default()
	}

	/// Compiles every pattern, failing on the first malformed one.
	pub fn compile<I, S>(patterns: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let patterns = patterns
			.into_iter()
			.map(|p| {
				let p = p.as_ref();
				Regex::new(p).map_err(|source| CoreError::InvalidPattern {
					pattern: p.to_string(),
					source,
				})
			})
			.collect::<Result<Vec<_>>>()?;

		Ok(Self { patterns })
	}

	/// Compiles the patterns, or logs the failure and returns an empty set.
	pub fn compile_or_empty<I, S>(list: &str, patterns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		match Self::compile(patterns) {
			Ok(set) => set,
			Err(e) => {
				warn!(list, error = %e, "Ignoring path pattern list");
				Self::empty()
			}
		}
	}

	pub fn is_empty(&self) -> bool {
		self.patterns.is_empty()
	}

	pub fn len(&self) -> usize {
		self.patterns.len()
	}
}

impl Matcher for PatternSet {
	fn matches(&self, path: &str) -> bool {
		self.patterns.iter().any(|re| re.is_match(path))
	}
}

/// Page eligibility based on include and exclude lists.
#[derive(Debug, Clone, Default)]
pub struct PageFilter {
	include: PatternSet,
	exclude: PatternSet,
}

impl PageFilter {
	pub fn new(include: PatternSet, exclude: PatternSet) -> Self {
		Self { include, exclude }
	}

	/// Reads `data-include` and `data-exclude`.
	pub fn from_attributes(attrs: &ScriptAttributes) -> Self {
		Self {
			include: PatternSet::compile_or_empty(ATTR_INCLUDE, attrs.list(ATTR_INCLUDE)),
			exclude: PatternSet::compile_or_empty(ATTR_EXCLUDE, attrs.list(ATTR_EXCLUDE)),
		}
	}

	/// Returns the reason the path is suppressed, if it is.
	///
	/// An empty include list admits every path. Exclusion applies
	/// independently of the include result.
	pub fn check(&self, path: &str) -> Option<BlockReason> {
		if !self.include.is_empty() && !self.include.matches(path) {
			return Some(BlockReason::NotIncluded);
		}

		if self.exclude.matches(path) {
			return Some(BlockReason::Excluded);
		}

		None
	}

	pub fn allows(&self, path: &str) -> bool {
		self.check(path).is_none()
	}

	pub fn include(&self) -> &PatternSet {
		&self.include
	}

	pub fn exclude(&self) -> &PatternSet {
		&self.exclude
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn filter(include: &[&str], exclude: &[&str]) -> PageFilter {
		PageFilter::new(
			PatternSet::compile(include).unwrap(),
			PatternSet::compile(exclude).unwrap(),
		)
	}

	#[test]
	fn test_include_admits_matching_path() {
		let f = filter(&["^/blog"], &[]);
		assert!(f.allows("/blog/post-1"));
	}

	#[test]
	fn test_include_suppresses_other_paths() {
		let f = filter(&["^/blog"], &[]);
		assert_eq!(f.check("/about"), Some(BlockReason::NotIncluded));
	}

	#[test]
	fn test_include_is_a_search_not_a_full_match() {
		let f = filter(&["post"], &[]);
		assert!(f.allows("/blog/post-1"));
	}

	#[test]
	fn test_any_include_pattern_is_enough() {
		let f = filter(&["^/docs", "^/blog"], &[]);
		assert!(f.allows("/blog"));
		assert!(f.allows("/docs/intro"));
	}

	#[test]
	fn test_exclude_without_include() {
		let f = filter(&[], &["^/admin"]);
		assert_eq!(f.check("/admin/x"), Some(BlockReason::Excluded));
		assert!(f.allows("/blog"));
	}

	#[test]
	fn test_exclude_wins_over_include() {
		let f = filter(&["^/blog"], &["draft"]);
		assert!(f.allows("/blog/post-1"));
		assert_eq!(f.check("/blog/draft-2"), Some(BlockReason::Excluded));
	}

	#[test]
	fn test_empty_lists_never_suppress() {
		let f = PageFilter::default();
		assert!(f.allows("/"));
		assert!(f.allows("/admin"));
	}

	#[test]
	fn test_compile_reports_malformed_pattern() {
		let err = PatternSet::compile(["^/ok", "(unclosed"]).unwrap_err();
		assert!(matches!(err, CoreError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
	}

	#[test]
	fn test_malformed_include_does_not_block_traffic() {
		let attrs = ScriptAttributes::new().with(ATTR_INCLUDE, "^/blog,(unclosed");
		let f = PageFilter::from_attributes(&attrs);
		assert!(f.include().is_empty());
		assert!(f.allows("/about"));
	}

	#[test]
	fn test_malformed_exclude_is_dropped() {
		let attrs = ScriptAttributes::new()
			.with(ATTR_INCLUDE, "^/blog")
			.with(ATTR_EXCLUDE, "[");
		let f = PageFilter::from_attributes(&attrs);
		assert!(f.exclude().is_empty());
		assert_eq!(f.include().len(), 1);
		assert!(f.allows("/blog/x"));
		assert!(!f.allows("/about"));
	}

	proptest! {
		#[test]
		fn empty_filter_allows_every_path(path in "/[a-z0-9/_-]{0,40}") {
			prop_assert!(PageFilter::default().allows(&path));
		}

		#[test]
		fn excluded_prefix_is_always_suppressed(rest in "[a-z0-9/_-]{0,40}") {
			let f = filter(&[], &["^/admin"]);
			let path = format!("/admin{rest}");
			prop_assert!(!f.allows(&path));
		}
	}
}
