// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Uncaught-error capture for script runtimes embedded in native apps.
//!
//! This crate hooks the two ways a script runtime fails without anyone
//! catching it, turns each failure into an [`ErrorRecord`], and hands the
//! record to the native crash SDK:
//!
//! - **Uncaught errors**: [`set_global_error_handler`] wraps the runtime's
//!   existing global handler. Fatal errors are symbolicated, tagged fatal,
//!   logged to analytics and recorded; the original handler always runs
//!   afterwards so the host's own crash behavior is unchanged.
//! - **Unhandled rejections**: [`set_unhandled_promise_rejection_handler`]
//!   enables rejection tracking and records every rejection that nothing
//!   handled as a non-fatal error.
//!
//! Both installers run once per process; calling them again returns the
//! handler from the first call. Reporting is best-effort: no failure in
//! symbolication, analytics or the native module ever escapes a handler.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use loom_crash_capture::{
//!     set_global_error_handler, set_unhandled_promise_rejection_handler, CaptureConfig,
//!     CaptureServices, HandlerSlot, RejectionTracking,
//! };
//!
//! let services = CaptureServices::new(my_native_module)
//!     .with_analytics(my_analytics)
//!     .with_config(CaptureConfig::from_env());
//!
//! let slot = Arc::new(HandlerSlot::default());
//! let tracking = Arc::new(RejectionTracking::new());
//!
//! set_global_error_handler(slot.clone(), services.clone());
//! set_unhandled_promise_rejection_handler(tracking.clone(), services);
//!
//! // The host forwards failures:
//! slot.dispatch(error, true).await;
//! tracking.dispatch_unhandled(id, reason).await;
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod global;
pub mod native;
pub mod once;
pub mod registry;
pub mod rejection;
pub mod report;
pub mod services;
pub mod symbolicate;
pub mod tracking;

pub use analytics::{
	AnalyticsBackend, AppExceptionEvent, NoAnalyticsBackend, SharedAnalyticsBackend,
	APP_EXCEPTION_EVENT,
};
pub use config::{CaptureConfig, DevMode, DEV_MODE_ENV};
pub use error::{AnalyticsError, CaptureError, NativeModuleError, Result, SymbolicationError};
pub use global::{set_global_error_handler, GlobalErrorInterceptor};
pub use native::{NativeCrashModule, SharedNativeCrashModule, FATAL_FLAG};
pub use once::{make_idempotent, Idempotent};
pub use registry::{global_handler, GlobalHandler, GlobalHandlerRegistry, HandlerSlot};
pub use rejection::{set_unhandled_promise_rejection_handler, RejectionInterceptor};
pub use report::record_error;
pub use services::CaptureServices;
pub use symbolicate::{
	parse_stack, SharedSymbolicator, StackTraceParser, SymbolicateOptions, Symbolicator,
};
pub use tracking::{
	unhandled_rejection_handler, RejectionId, RejectionTracker, RejectionTracking,
	RejectionTrackingOptions, UnhandledRejectionHandler,
};

// Re-export core types for convenience
pub use loom_crash_capture_core::{
	build_error_record, normalize, CapturedFrame, ErrorRecord, ErrorValue, NormalizedFrame,
	ThrownValue, UNKNOWN,
};
