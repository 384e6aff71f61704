// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Analytics integration for fatal crash events.
//!
//! When a fatal error is captured, an app-exception event is logged to the
//! analytics backend so crash-free-user metrics line up with crash reports.
//! The event uses the reserved `_ae` name and carries:
//!
//! | Property | Description |
//! |----------|-------------|
//! | `fatal` | Always `1` for errors caught by the global handler |
//! | `timestamp` | Milliseconds since the Unix epoch, as a string |
//!
//! Analytics is optional. Apps without an analytics instance get
//! [`NoAnalyticsBackend`], whose calls fail with
//! [`AnalyticsError::NotConfigured`]; the capture pipeline treats that like
//! any other analytics failure and carries on.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AnalyticsError;

/// Reserved analytics event name for app exceptions.
pub const APP_EXCEPTION_EVENT: &str = "_ae";

/// Data for the app-exception analytics event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppExceptionEvent {
	pub fatal: bool,
	pub timestamp: DateTime<Utc>,
}

impl AppExceptionEvent {
	/// A fatal app exception stamped with the current time.
	pub fn fatal_now() -> Self {
		Self {
			fatal: true,
			timestamp: Utc::now(),
		}
	}

	/// Converts this event to its analytics properties.
	///
	/// The timestamp is sent as a string because the analytics SDKs store
	/// event parameters as strings or 32-bit numbers.
	pub fn to_event_properties(&self) -> serde_json::Value {
		serde_json::json!({
			"fatal": u8::from(self.fatal),
			"timestamp": self.timestamp.timestamp_millis().to_string(),
		})
	}
}

/// An analytics backend that can log named events.
#[async_trait]
pub trait AnalyticsBackend: Send + Sync + 'static {
	/// Logs an event with the given properties.
	async fn log_event(
		&self,
		name: &str,
		properties: serde_json::Value,
	) -> Result<(), AnalyticsError>;
}

/// Type alias for a shared analytics backend.
pub type SharedAnalyticsBackend = Arc<dyn AnalyticsBackend>;

/// Stand-in used when the app has no analytics instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnalyticsBackend;

#[async_trait]
impl AnalyticsBackend for NoAnalyticsBackend {
	async fn log_event(
		&self,
		_name: &str,
		_properties: serde_json::Value,
	) -> Result<(), AnalyticsError> {
		Err(AnalyticsError::NotConfigured)
	}
}
