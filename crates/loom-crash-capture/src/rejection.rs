// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reporting for promise rejections that nothing handled.

use std::sync::Arc;

use futures::future::FutureExt;
use loom_crash_capture_core::{build_error_record, ThrownValue};
use tracing::{debug, info};

use crate::error::{CaptureError, Result};
use crate::once::Idempotent;
use crate::services::{log_discarded, CaptureServices};
use crate::tracking::{
	RejectionId, RejectionTracker, RejectionTrackingOptions, UnhandledRejectionHandler,
};

type InstallRejectionHandler =
	fn((Arc<dyn RejectionTracker>, CaptureServices)) -> UnhandledRejectionHandler;

static REJECTION_HANDLER: Idempotent<InstallRejectionHandler, UnhandledRejectionHandler> =
	Idempotent::new(install_rejection_handler as InstallRejectionHandler);

/// Enables unhandled-rejection reporting for this process.
///
/// Only the first call enables tracking; later calls return the same handler
/// and ignore their arguments.
pub fn set_unhandled_promise_rejection_handler(
	tracker: Arc<dyn RejectionTracker>,
	services: CaptureServices,
) -> UnhandledRejectionHandler {
	REJECTION_HANDLER.call((tracker, services))
}

fn install_rejection_handler(
	(tracker, services): (Arc<dyn RejectionTracker>, CaptureServices),
) -> UnhandledRejectionHandler {
	RejectionInterceptor::install(tracker.as_ref(), services)
}

/// Records unhandled rejections as non-fatal errors.
///
/// There is no earlier rejection handler to chain to; the interceptor only
/// adds reporting.
pub struct RejectionInterceptor {
	services: CaptureServices,
}

impl RejectionInterceptor {
	/// Enables tracking of every unhandled rejection and returns the callback
	/// the tracker will invoke.
	///
	/// This is the unguarded installation; use
	/// [`set_unhandled_promise_rejection_handler`] for the once-per-process
	/// version.
	pub fn install(tracker: &dyn RejectionTracker, services: CaptureServices) -> UnhandledRejectionHandler {
		let interceptor = Arc::new(Self { services });

		let on_unhandled: UnhandledRejectionHandler = Arc::new(move |id, error| {
			let interceptor = Arc::clone(&interceptor);
			async move { interceptor.handle(id, error).await }.boxed()
		});

		tracker.enable(RejectionTrackingOptions {
			all_rejections: true,
			on_unhandled: Arc::clone(&on_unhandled),
		});
		info!("Unhandled rejection handler installed");
		on_unhandled
	}

	/// Records the rejection unless in dev mode. Never fails.
	pub async fn handle(&self, id: RejectionId, error: ThrownValue) {
		if self.services.is_dev_mode() {
			debug!(id, "Dev mode, skipping rejection report");
			return;
		}

		if let Err(e) = self.report(&error).await {
			log_discarded(&e);
		}
	}

	async fn report(&self, error: &ThrownValue) -> Result<()> {
		// A non-Error reason has no stack to resolve.
		let error = error
			.as_error()
			.ok_or_else(|| CaptureError::NonErrorInput(error.to_string()))?;

		let frames = self.services.symbolicate(error).await?;
		let record = build_error_record(error, &frames, true, None);

		self.services
			.native
			.record_error(record)
			.await
			.map_err(CaptureError::Record)?;

		debug!(frame_count = frames.len(), "Unhandled rejection recorded");
		Ok(())
	}
}
