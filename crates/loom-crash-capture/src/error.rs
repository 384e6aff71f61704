// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the capture SDK.
//!
//! Collaborator calls each fail with their own error type. The interceptors
//! map every failure into a [`CaptureError`] kind at the call site, log it and
//! discard it; only [`crate::record_error`] hands a `CaptureError` back to the
//! caller.

use thiserror::Error;

/// Result type alias for capture operations.
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Failure of a call into the native crash module.
#[derive(Debug, Clone, Error)]
#[error("native crash module {operation} failed: {message}")]
pub struct NativeModuleError {
	/// Which native operation failed (`log`, `setAttribute`, `recordError`).
	pub operation: &'static str,
	pub message: String,
}

impl NativeModuleError {
	pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
		Self {
			operation,
			message: message.into(),
		}
	}
}

/// Failure of the analytics backend.
#[derive(Debug, Clone, Error)]
pub enum AnalyticsError {
	/// No analytics instance exists in this app.
	#[error("analytics is not configured")]
	NotConfigured,

	/// The analytics backend rejected or failed to log the event.
	#[error("analytics event failed: {0}")]
	Failed(String),
}

/// Failure to resolve an error's stack into frames.
#[derive(Debug, Clone, Error)]
pub enum SymbolicationError {
	/// The error carries no stack text to resolve.
	#[error("error has no stack to symbolicate")]
	MissingStack,

	/// None of the stack lines could be parsed as frames.
	#[error("could not parse any frames from stack")]
	Unparseable,

	/// A source map or resolution service was unavailable.
	#[error("symbolication unavailable: {0}")]
	Unavailable(String),
}

/// Failures inside the capture pipeline, one kind per collaborator call site.
#[derive(Debug, Error)]
pub enum CaptureError {
	/// The captured value is not Error-shaped.
	#[error("not an error value: {0}")]
	NonErrorInput(String),

	/// Writing the diagnostic log line for a non-Error value failed.
	#[error("diagnostic log failed: {0}")]
	DiagnosticLog(#[source] NativeModuleError),

	#[error("symbolication failed: {0}")]
	Symbolication(#[from] SymbolicationError),

	/// Setting the fatal-flag attribute failed.
	#[error("setting attribute failed: {0}")]
	AttributeSet(#[source] NativeModuleError),

	#[error("analytics logging failed: {0}")]
	Analytics(#[from] AnalyticsError),

	/// Handing the record to the native crash module failed.
	#[error("recording error failed: {0}")]
	Record(#[source] NativeModuleError),
}

impl CaptureError {
	/// Short stable name of the failure kind, used as a log field.
	pub fn kind(&self) -> &'static str {
		match self {
			CaptureError::NonErrorInput(_) => "non_error_input",
			CaptureError::DiagnosticLog(_) => "diagnostic_log",
			CaptureError::Symbolication(_) => "symbolication",
			CaptureError::AttributeSet(_) => "attribute_set",
			CaptureError::Analytics(_) => "analytics",
			CaptureError::Record(_) => "record",
		}
	}
}
