// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The collaborators a capture handler reports through.

use std::sync::Arc;

use loom_crash_capture_core::{CapturedFrame, ErrorValue};
use tracing::{debug, warn};

use crate::analytics::{AnalyticsBackend, NoAnalyticsBackend, SharedAnalyticsBackend};
use crate::config::CaptureConfig;
use crate::error::{AnalyticsError, CaptureError, SymbolicationError};
use crate::native::{NativeCrashModule, SharedNativeCrashModule};
use crate::symbolicate::{SharedSymbolicator, StackTraceParser, SymbolicateOptions, Symbolicator};

/// Everything a capture handler needs to report an error.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct CaptureServices {
	pub(crate) native: SharedNativeCrashModule,
	pub(crate) analytics: SharedAnalyticsBackend,
	pub(crate) symbolicator: SharedSymbolicator,
	pub(crate) config: CaptureConfig,
}

impl CaptureServices {
	/// Creates services around the native crash module, with no analytics,
	/// the offline stack parser, and the default config.
	pub fn new(native: impl NativeCrashModule) -> Self {
		Self::from_shared(Arc::new(native))
	}

	/// Like [`new`](Self::new) for an already shared native module.
	pub fn from_shared(native: SharedNativeCrashModule) -> Self {
		Self {
			native,
			analytics: Arc::new(NoAnalyticsBackend),
			symbolicator: Arc::new(StackTraceParser),
			config: CaptureConfig::default(),
		}
	}

	/// Sets the analytics backend that receives app-exception events.
	pub fn with_analytics(mut self, analytics: impl AnalyticsBackend) -> Self {
		self.analytics = Arc::new(analytics);
		self
	}

	/// Sets the symbolicator used to resolve error stacks.
	pub fn with_symbolicator(mut self, symbolicator: impl Symbolicator) -> Self {
		self.symbolicator = Arc::new(symbolicator);
		self
	}

	pub fn with_config(mut self, config: CaptureConfig) -> Self {
		self.config = config;
		self
	}

	pub fn config(&self) -> &CaptureConfig {
		&self.config
	}

	pub(crate) fn is_dev_mode(&self) -> bool {
		self.config.dev_mode.is_enabled()
	}

	pub(crate) async fn symbolicate(
		&self,
		error: &ErrorValue,
	) -> Result<Vec<CapturedFrame>, SymbolicationError> {
		let options = SymbolicateOptions {
			offline: self.config.offline_symbolication,
		};
		self.symbolicator.symbolicate(error, options).await
	}
}

/// Logs a pipeline failure that is being swallowed.
pub(crate) fn log_discarded(error: &CaptureError) {
	match error {
		// Most apps have no analytics; not worth a warning.
		CaptureError::Analytics(AnalyticsError::NotConfigured) => {
			debug!(kind = error.kind(), "Analytics not configured, skipping event");
		}
		_ => warn!(kind = error.kind(), error = %error, "Crash capture step failed"),
	}
}
