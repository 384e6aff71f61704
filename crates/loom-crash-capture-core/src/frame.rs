// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack frame types and normalization into the crash backend's frame schema.

use serde::{Deserialize, Serialize};

/// Placeholder used for any frame field that could not be determined.
pub const UNKNOWN: &str = "<unknown>";

/// A raw stack frame as produced by symbolication.
///
/// The shape is untrusted: depending on the engine and whether a source map
/// was available, any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedFrame {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub line_number: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub column_number: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub function_name: Option<String>,
	/// The original source line text, if the symbolicator kept it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
}

/// A frame in the fixed shape the native crash collaborator expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFrame {
	/// Source text copied through from the captured frame.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub src: Option<String>,
	pub line: u32,
	pub col: u32,
	#[serde(rename = "fn")]
	pub function: String,
	/// `"<file>:<line>:<col>"`, or the header tag for the synthetic first frame.
	pub file: String,
}

impl NormalizedFrame {
	/// The synthetic frame used to label a record with an error name.
	///
	/// Crash dashboards group and title issues by the top frame's file, so
	/// putting the name there gives the record a readable classification.
	pub fn header(tag: impl Into<String>) -> Self {
		Self {
			src: Some(UNKNOWN.to_string()),
			line: 0,
			col: 0,
			function: UNKNOWN.to_string(),
			file: tag.into(),
		}
	}

	/// Normalize a single captured frame, filling in defaults for missing fields.
	pub fn from_captured(frame: &CapturedFrame) -> Self {
		let line = frame.line_number.unwrap_or(0);
		let col = frame.column_number.unwrap_or(0);
		let file_name = parse_file_name(frame.file_name.as_deref());

		Self {
			src: frame.source.clone(),
			line,
			col,
			function: frame
				.function_name
				.clone()
				.filter(|name| !name.is_empty())
				.unwrap_or_else(|| UNKNOWN.to_string()),
			file: format!("{file_name}:{line}:{col}"),
		}
	}
}

/// Strip a query string from a bundle file name.
///
/// Bundles served by a dev server carry cache-busting queries
/// (`index.bundle?platform=ios&dev=false`) that would otherwise split one
/// file into many in the crash backend. A name that is empty, missing, or
/// consists only of a query yields [`UNKNOWN`].
pub fn parse_file_name(file_name: Option<&str>) -> &str {
	match file_name {
		Some(name) if !name.is_empty() => match name.find('?') {
			None => name,
			Some(0) => UNKNOWN,
			Some(idx) => &name[..idx],
		},
		_ => UNKNOWN,
	}
}

/// Convert captured frames into the backend's frame schema.
///
/// When `header_tag` is given, a synthetic frame carrying the tag is placed
/// first and the captured frames follow in their original order.
pub fn normalize(frames: &[CapturedFrame], header_tag: Option<&str>) -> Vec<NormalizedFrame> {
	let mut normalized = Vec::with_capacity(frames.len() + usize::from(header_tag.is_some()));

	if let Some(tag) = header_tag {
		normalized.push(NormalizedFrame::header(tag));
	}

	normalized.extend(frames.iter().map(NormalizedFrame::from_captured));
	normalized
}
