// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Interface to the native crash-reporting module.

use std::sync::Arc;

use async_trait::async_trait;
use loom_crash_capture_core::ErrorRecord;

use crate::error::NativeModuleError;

/// Attribute key that tells the crash backend the next record is fatal.
///
/// The backend converts records carrying this attribute into fatal crash
/// events instead of non-fatal logged errors.
pub const FATAL_FLAG: &str = "com.firebase.crashlytics.reactnative.fatal";

/// The native crash SDK that persists and uploads error records.
///
/// Every call is fire-and-forget from the pipeline's point of view; failures
/// are reported through [`NativeModuleError`] so the caller can log them.
#[async_trait]
pub trait NativeCrashModule: Send + Sync + 'static {
	/// Appends a line to the crash log attached to the next report.
	async fn log(&self, message: &str) -> Result<(), NativeModuleError>;

	/// Sets a custom key on subsequent reports.
	async fn set_attribute(&self, key: &str, value: &str) -> Result<(), NativeModuleError>;

	/// Records an error. Ownership of the record passes to the native module.
	async fn record_error(&self, record: ErrorRecord) -> Result<(), NativeModuleError>;

	/// Whether uncaught script errors should generate crash reports at all.
	fn is_error_generation_on_js_crash_enabled(&self) -> bool;
}

/// Type alias for a shared native crash module.
pub type SharedNativeCrashModule = Arc<dyn NativeCrashModule>;
