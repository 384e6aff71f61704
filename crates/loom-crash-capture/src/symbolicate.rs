// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack trace resolution for captured errors.
//!
//! [`Symbolicator`] is the seam to whatever resolves an error's stack into
//! frames. [`StackTraceParser`] is the built-in offline implementation: it
//! reads the engine's stack text and never fetches source maps.

use std::sync::Arc;

use async_trait::async_trait;
use loom_crash_capture_core::{CapturedFrame, ErrorValue};
use tracing::debug;

use crate::error::SymbolicationError;

/// Options for a symbolication request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolicateOptions {
	/// Resolve without any network round-trip to a symbol server.
	pub offline: bool,
}

impl Default for SymbolicateOptions {
	fn default() -> Self {
		Self { offline: true }
	}
}

/// Resolves an error's stack into frames.
#[async_trait]
pub trait Symbolicator: Send + Sync + 'static {
	/// Returns the error's frames, innermost first.
	async fn symbolicate(
		&self,
		error: &ErrorValue,
		options: SymbolicateOptions,
	) -> Result<Vec<CapturedFrame>, SymbolicationError>;
}

/// Type alias for a shared symbolicator.
pub type SharedSymbolicator = Arc<dyn Symbolicator>;

/// Offline symbolicator that parses the engine's stack text.
///
/// Understands V8 and Hermes (`at fn (file:line:col)`) as well as JSC and
/// SpiderMonkey (`fn@file:line:col`) frame formats. Online resolution is not
/// wired up, so `offline: false` behaves the same as `offline: true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackTraceParser;

#[async_trait]
impl Symbolicator for StackTraceParser {
	async fn symbolicate(
		&self,
		error: &ErrorValue,
		options: SymbolicateOptions,
	) -> Result<Vec<CapturedFrame>, SymbolicationError> {
		let stack = error
			.stack
			.as_deref()
			.filter(|stack| !stack.trim().is_empty())
			.ok_or(SymbolicationError::MissingStack)?;

		let frames = parse_stack(stack);
		if frames.is_empty() {
			return Err(SymbolicationError::Unparseable);
		}

		debug!(
			frame_count = frames.len(),
			offline = options.offline,
			"Parsed stack frames"
		);
		Ok(frames)
	}
}

/// Parse engine stack text into frames, skipping lines that are not frames.
///
/// When any line is a V8 `at ` frame, only `at ` lines are frames; the
/// leading `Name: message` text may span lines and contain anything.
/// Otherwise a leading `Name: message` header is dropped before the
/// `fn@file:line:col` and bare-location forms are tried.
pub fn parse_stack(stack: &str) -> Vec<CapturedFrame> {
	let lines: Vec<&str> = stack
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.collect();

	if lines.iter().any(|line| line.starts_with("at ")) {
		return lines
			.into_iter()
			.filter_map(|line| line.strip_prefix("at ").map(|rest| parse_v8_frame(rest, line)))
			.collect();
	}

	let body = match lines.split_first() {
		Some((first, rest)) if is_header_line(first) => rest,
		_ => &lines[..],
	};
	body.iter().copied().filter_map(parse_frame_line).collect()
}

/// True for an error header such as `TypeError: message` or a bare `Error`.
fn is_header_line(line: &str) -> bool {
	let name_end = line
		.find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '$' | '.')))
		.unwrap_or(line.len());
	if name_end == 0 {
		return false;
	}

	let rest = &line[name_end..];
	rest.is_empty() || rest == ":" || rest.starts_with(": ")
}

/// Parse a single JSC or SpiderMonkey stack line into a frame.
fn parse_frame_line(line: &str) -> Option<CapturedFrame> {
	if let Some((function, location)) = line.split_once('@') {
		let (file_name, line_number, column_number) = parse_location(location);
		return Some(CapturedFrame {
			file_name,
			line_number,
			column_number,
			function_name: non_empty(function),
			source: Some(line.to_string()),
		});
	}

	// JSC global code has a bare location with no function name.
	match parse_location(line) {
		(file_name, Some(line_number), column_number) => Some(CapturedFrame {
			file_name,
			line_number: Some(line_number),
			column_number,
			function_name: None,
			source: Some(line.to_string()),
		}),
		_ => None,
	}
}

fn parse_v8_frame(rest: &str, source: &str) -> CapturedFrame {
	let rest = rest.strip_prefix("async ").unwrap_or(rest);

	let (function, location) = match (rest.find(" ("), rest.ends_with(')')) {
		(Some(idx), true) => (Some(&rest[..idx]), &rest[idx + 2..rest.len() - 1]),
		_ => (None, rest),
	};

	// Hermes prefixes bytecode locations with "address at ".
	let location = location
		.rsplit_once("address at ")
		.map_or(location, |(_, loc)| loc);

	let (file_name, line_number, column_number) = parse_location(location);

	CapturedFrame {
		file_name,
		line_number,
		column_number,
		function_name: function.and_then(non_empty),
		source: Some(source.to_string()),
	}
}

/// Split `file:line:col` (or `file:line`) into its parts.
///
/// File names may themselves contain colons (URLs), so numbers are taken
/// from the right.
fn parse_location(location: &str) -> (Option<String>, Option<u32>, Option<u32>) {
	let location = location.trim();
	if location.is_empty() {
		return (None, None, None);
	}

	let mut parts = location.rsplitn(3, ':');
	let last = parts.next().and_then(|s| s.parse::<u32>().ok());
	let second = parts.next();
	let rest = parts.next();

	match (last, second.and_then(|s| s.parse::<u32>().ok()), rest) {
		(Some(col), Some(line), Some(file)) => (non_empty(file), Some(line), Some(col)),
		(Some(col), Some(line), None) => (None, Some(line), Some(col)),
		(Some(line), _, _) => {
			let (file, _) = location.rsplit_once(':').unwrap_or((location, ""));
			(non_empty(file), Some(line), None)
		}
		_ => (Some(location.to_string()), None, None),
	}
}

fn non_empty(s: &str) -> Option<String> {
	let s = s.trim();
	if s.is_empty() {
		None
	} else {
		Some(s.to_string())
	}
}
