// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The canonical error record handed to the native crash collaborator.

use serde::{Deserialize, Serialize};

use crate::frame::{normalize, CapturedFrame, NormalizedFrame};
use crate::value::ErrorValue;

/// A normalized error ready to be recorded by the crash backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
	pub message: String,
	/// `true` for unhandled promise rejections, `false` for thrown errors.
	pub is_unhandled_rejection: bool,
	/// Innermost frame first, preceded by the header frame when one was requested.
	pub frames: Vec<NormalizedFrame>,
}

/// Build an error record from an error and its symbolicated frames.
pub fn build_error_record(
	error: &ErrorValue,
	frames: &[CapturedFrame],
	is_unhandled_rejection: bool,
	header_tag: Option<&str>,
) -> ErrorRecord {
	ErrorRecord {
		message: error.message_text(),
		is_unhandled_rejection,
		frames: normalize(frames, header_tag),
	}
}
