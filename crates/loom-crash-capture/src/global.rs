// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Global uncaught-error handler that reports fatal errors, then defers to
//! the handler that was registered before it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::FutureExt;
use loom_crash_capture_core::{build_error_record, ErrorValue, ThrownValue};
use tracing::{debug, info};

use crate::analytics::{AppExceptionEvent, APP_EXCEPTION_EVENT};
use crate::error::{CaptureError, Result};
use crate::native::FATAL_FLAG;
use crate::once::Idempotent;
use crate::registry::{GlobalHandler, GlobalHandlerRegistry};
use crate::services::{log_discarded, CaptureServices};

type InstallGlobalErrorHandler =
	fn((Arc<dyn GlobalHandlerRegistry>, CaptureServices)) -> GlobalHandler;

static GLOBAL_ERROR_HANDLER: Idempotent<InstallGlobalErrorHandler, GlobalHandler> =
	Idempotent::new(install_global_error_handler as InstallGlobalErrorHandler);

/// Installs the crash-reporting global error handler for this process.
///
/// Only the first call installs anything. Later calls return the handler
/// installed by the first call and ignore their arguments, so the previous
/// handler is never wrapped twice.
pub fn set_global_error_handler(
	registry: Arc<dyn GlobalHandlerRegistry>,
	services: CaptureServices,
) -> GlobalHandler {
	GLOBAL_ERROR_HANDLER.call((registry, services))
}

fn install_global_error_handler(
	(registry, services): (Arc<dyn GlobalHandlerRegistry>, CaptureServices),
) -> GlobalHandler {
	GlobalErrorInterceptor::install(registry.as_ref(), services)
}

/// Wraps the previously registered global handler with crash reporting.
pub struct GlobalErrorInterceptor {
	original: GlobalHandler,
	services: CaptureServices,
}

impl GlobalErrorInterceptor {
	/// Captures the registry's current handler, registers a reporting handler
	/// in its place, and returns the new handler.
	///
	/// This is the unguarded installation; use [`set_global_error_handler`]
	/// for the once-per-process version.
	pub fn install(registry: &dyn GlobalHandlerRegistry, services: CaptureServices) -> GlobalHandler {
		let interceptor = Arc::new(Self {
			original: registry.get_global_handler(),
			services,
		});

		let handler: GlobalHandler = Arc::new(move |error, fatal| {
			let interceptor = Arc::clone(&interceptor);
			async move { interceptor.handle(error, fatal).await }.boxed()
		});

		registry.set_global_handler(Arc::clone(&handler));
		info!("Global error handler installed");
		handler
	}

	/// Reports the error if appropriate, then always calls the original handler.
	///
	/// Reporting completes before the original handler runs, so a slow
	/// collaborator delays the host's own error behavior but never prevents it.
	pub async fn handle(&self, error: ThrownValue, fatal: bool) {
		if self.services.is_dev_mode() {
			debug!(fatal, "Dev mode, skipping crash report");
			return (self.original)(error, fatal).await;
		}

		match &error {
			ThrownValue::Other(_) => {
				if let Err(e) = self.log_non_error(&error).await {
					log_discarded(&e);
				}
			}
			ThrownValue::Error(err) => {
				if self.services.native.is_error_generation_on_js_crash_enabled() {
					self.report_fatal(err).await;
				} else {
					debug!(fatal, "Error generation on crash disabled, skipping crash report");
				}
			}
		}

		(self.original)(error, fatal).await
	}

	async fn log_non_error(&self, error: &ThrownValue) -> Result<()> {
		self.services
			.native
			.log(&format!("Unknown Error: {error}"))
			.await
			.map_err(CaptureError::DiagnosticLog)
	}

	/// Symbolicate, tag fatal, notify analytics, record.
	///
	/// Without frames there is nothing to record, so a symbolication failure
	/// ends the sequence. Every later step is isolated from the others.
	async fn report_fatal(&self, error: &ErrorValue) {
		let frames = match self.services.symbolicate(error).await {
			Ok(frames) => frames,
			Err(e) => return log_discarded(&CaptureError::from(e)),
		};

		if let Err(e) = self
			.services
			.native
			.set_attribute(FATAL_FLAG, &fatal_flag_value(Utc::now()))
			.await
		{
			log_discarded(&CaptureError::AttributeSet(e));
		}

		let event = AppExceptionEvent::fatal_now();
		if let Err(e) = self
			.services
			.analytics
			.log_event(APP_EXCEPTION_EVENT, event.to_event_properties())
			.await
		{
			log_discarded(&CaptureError::from(e));
		}

		let record = build_error_record(error, &frames, false, None);
		let frame_count = record.frames.len();
		match self.services.native.record_error(record).await {
			Ok(()) => debug!(frame_count, "Fatal error recorded"),
			Err(e) => log_discarded(&CaptureError::Record(e)),
		}
	}
}

/// Unix time in whole seconds (rounded), as the fatal attribute expects.
fn fatal_flag_value(now: DateTime<Utc>) -> String {
	let secs = (now.timestamp_millis() as f64 / 1000.0).round() as i64;
	secs.to_string()
}
