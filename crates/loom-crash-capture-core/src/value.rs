// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Values that reach an uncaught-error handler.
//!
//! Script runtimes let any value be thrown or used as a rejection reason, so
//! the handler cannot assume it received an error object. [`ThrownValue`]
//! separates Error-shaped values, which carry a name, message and stack, from
//! everything else.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An Error-shaped value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorValue {
	/// Constructor name, e.g. `TypeError`.
	pub name: String,
	/// The `message` property. It is usually a string but may be any value or
	/// missing entirely.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<Value>,
	/// Raw engine stack text, if the runtime captured one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stack: Option<String>,
}

impl ErrorValue {
	/// Creates an error value with a string message and no stack.
	pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			message: Some(Value::String(message.into())),
			stack: None,
		}
	}

	/// Sets the raw stack text.
	pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
		self.stack = Some(stack.into());
		self
	}

	/// Replaces the message with an arbitrary value (or removes it).
	pub fn with_message_value(mut self, message: Option<Value>) -> Self {
		self.message = message;
		self
	}

	/// String coercion of the message property.
	///
	/// A missing message coerces to the literal `"undefined"`, matching what
	/// the runtime itself would print.
	pub fn message_text(&self) -> String {
		match &self.message {
			Some(value) => coerce_to_string(value),
			None => "undefined".to_string(),
		}
	}
}

impl fmt::Display for ErrorValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let message = self.message.as_ref().map(coerce_to_string).unwrap_or_default();

		match (self.name.is_empty(), message.is_empty()) {
			(true, _) => f.write_str(&message),
			(false, true) => f.write_str(&self.name),
			(false, false) => write!(f, "{}: {}", self.name, message),
		}
	}
}

/// Any value delivered to an uncaught-error or unhandled-rejection handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ThrownValue {
	Error(ErrorValue),
	/// A thrown string, number, plain object, etc.
	Other(Value),
}

impl ThrownValue {
	/// Returns true if the value is Error-shaped.
	pub fn is_error(&self) -> bool {
		matches!(self, ThrownValue::Error(_))
	}

	/// Returns the error, if the value is Error-shaped.
	pub fn as_error(&self) -> Option<&ErrorValue> {
		match self {
			ThrownValue::Error(error) => Some(error),
			ThrownValue::Other(_) => None,
		}
	}
}

impl fmt::Display for ThrownValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ThrownValue::Error(error) => fmt::Display::fmt(error, f),
			ThrownValue::Other(value) => f.write_str(&coerce_to_string(value)),
		}
	}
}

impl From<ErrorValue> for ThrownValue {
	fn from(error: ErrorValue) -> Self {
		ThrownValue::Error(error)
	}
}

impl From<Value> for ThrownValue {
	fn from(value: Value) -> Self {
		ThrownValue::Other(value)
	}
}

impl From<&str> for ThrownValue {
	fn from(value: &str) -> Self {
		ThrownValue::Other(Value::String(value.to_string()))
	}
}

/// Coerce a value to a string the way a script runtime's `String(value)` does.
pub fn coerce_to_string(value: &Value) -> String {
	match value {
		Value::Null => "null".to_string(),
		Value::Bool(b) => b.to_string(),
		Value::Number(n) => coerce_number(n),
		Value::String(s) => s.clone(),
		Value::Array(items) => items
			.iter()
			.map(|item| match item {
				// Array joins render holes and nulls as empty strings
				Value::Null => String::new(),
				other => coerce_to_string(other),
			})
			.collect::<Vec<_>>()
			.join(","),
		Value::Object(_) => "[object Object]".to_string(),
	}
}

fn coerce_number(n: &serde_json::Number) -> String {
	if let Some(i) = n.as_i64() {
		return i.to_string();
	}
	if let Some(u) = n.as_u64() {
		return u.to_string();
	}
	match n.as_f64() {
		Some(f) => coerce_float(f),
		None => n.to_string(),
	}
}

/// Shortest round-trip digits, decimal within `[1e-6, 1e21)` and exponent
/// notation (`1e+21`, `1.5e-7`) outside it.
fn coerce_float(f: f64) -> String {
	if f == 0.0 {
		return "0".to_string();
	}

	let magnitude = f.abs();
	if (1e-6..1e21).contains(&magnitude) {
		return f.to_string();
	}

	let exp = format!("{f:e}");
	match exp.split_once('e') {
		Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{mantissa}e+{exponent}"),
		_ => exp,
	}
}
