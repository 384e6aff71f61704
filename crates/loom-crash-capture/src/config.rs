// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Capture configuration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

/// Environment variable that overrides the development-mode default.
pub const DEV_MODE_ENV: &str = "LOOM_CRASH_DEV_MODE";

/// Shared development-mode flag.
///
/// Handlers read the flag on every invocation, so flipping it at runtime
/// takes effect for the next captured error. While it is on, nothing is
/// reported and errors go straight to the host's original handler.
#[derive(Debug, Clone)]
pub struct DevMode(Arc<AtomicBool>);

impl DevMode {
	pub fn new(enabled: bool) -> Self {
		Self(Arc::new(AtomicBool::new(enabled)))
	}

	/// Reads [`DEV_MODE_ENV`], falling back to the build profile default.
	pub fn from_env() -> Self {
		let enabled = match std::env::var(DEV_MODE_ENV) {
			Ok(value) => parse_flag(&value).unwrap_or_else(|| {
				warn!(var = DEV_MODE_ENV, value = %value, "Unrecognized dev mode value, using default");
				cfg!(debug_assertions)
			}),
			Err(_) => cfg!(debug_assertions),
		};
		Self::new(enabled)
	}

	pub fn is_enabled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}

	pub fn set(&self, enabled: bool) {
		self.0.store(enabled, Ordering::SeqCst);
	}
}

impl Default for DevMode {
	/// Development builds (debug assertions on) start in dev mode.
	fn default() -> Self {
		Self::new(cfg!(debug_assertions))
	}
}

fn parse_flag(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}

/// Configuration shared by the capture handlers.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
	/// Development-mode flag, read per captured error.
	pub dev_mode: DevMode,
	/// Resolve stacks without contacting a remote symbol server.
	pub offline_symbolication: bool,
}

impl Default for CaptureConfig {
	fn default() -> Self {
		Self {
			dev_mode: DevMode::default(),
			offline_symbolication: true,
		}
	}
}

impl CaptureConfig {
	/// Builds a config with the dev mode flag taken from the environment.
	pub fn from_env() -> Self {
		Self {
			dev_mode: DevMode::from_env(),
			..Self::default()
		}
	}

	/// Sets the development-mode flag handle.
	pub fn dev_mode(mut self, dev_mode: DevMode) -> Self {
		self.dev_mode = dev_mode;
		self
	}

	pub fn offline_symbolication(mut self, offline: bool) -> Self {
		self.offline_symbolication = offline;
		self
	}
}
