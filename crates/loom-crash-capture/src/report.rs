// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Manual recording of caught errors.

use loom_crash_capture_core::{build_error_record, ThrownValue};
use tracing::{debug, warn};

use crate::error::{CaptureError, Result};
use crate::services::CaptureServices;

/// Records a caught error as a non-fatal crash report.
///
/// `js_error_name` puts a synthetic first frame carrying the name on the
/// record, which the crash dashboard then uses to title and group the issue.
///
/// Unlike the uncaught-error handlers this returns failures to the caller,
/// and it reports regardless of dev mode.
pub async fn record_error(
	services: &CaptureServices,
	error: &ThrownValue,
	js_error_name: Option<&str>,
) -> Result<()> {
	let Some(err) = error.as_error() else {
		warn!(value = %error, "record_error expects an Error value");
		return Err(CaptureError::NonErrorInput(error.to_string()));
	};

	let frames = services.symbolicate(err).await?;
	let record = build_error_record(err, &frames, false, js_error_name);
	let frame_count = record.frames.len();

	services
		.native
		.record_error(record)
		.await
		.map_err(CaptureError::Record)?;

	debug!(frame_count, "Error recorded");
	Ok(())
}
