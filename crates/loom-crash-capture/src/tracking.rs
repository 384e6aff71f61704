// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Unhandled promise rejection tracking.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::{BoxFuture, FutureExt};
use loom_crash_capture_core::ThrownValue;
use tracing::debug;

/// Identifier the runtime assigns to a tracked rejection.
pub type RejectionId = u64;

/// Called when a rejection settles with no handler attached in time.
pub type UnhandledRejectionHandler =
	Arc<dyn Fn(RejectionId, ThrownValue) -> BoxFuture<'static, ()> + Send + Sync>;

/// Wraps an async closure as an [`UnhandledRejectionHandler`].
pub fn unhandled_rejection_handler<F, Fut>(f: F) -> UnhandledRejectionHandler
where
	F: Fn(RejectionId, ThrownValue) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	Arc::new(move |id, error| f(id, error).boxed())
}

/// Error names reported when `all_rejections` is off.
const DEFAULT_WHITELIST: [&str; 3] = ["ReferenceError", "TypeError", "RangeError"];

/// Options passed when enabling rejection tracking.
#[derive(Clone)]
pub struct RejectionTrackingOptions {
	/// Report every unhandled rejection rather than only the default
	/// whitelist of programmer-error types.
	pub all_rejections: bool,
	pub on_unhandled: UnhandledRejectionHandler,
}

impl std::fmt::Debug for RejectionTrackingOptions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RejectionTrackingOptions")
			.field("all_rejections", &self.all_rejections)
			.finish_non_exhaustive()
	}
}

/// The runtime's unhandled-rejection notification channel.
pub trait RejectionTracker: Send + Sync + 'static {
	/// Turns tracking on, replacing any previously enabled options.
	fn enable(&self, options: RejectionTrackingOptions);
}

/// In-process rejection tracker for hosts that detect unhandled rejections
/// themselves and forward them through [`RejectionTracking::dispatch_unhandled`].
#[derive(Default)]
pub struct RejectionTracking {
	options: RwLock<Option<RejectionTrackingOptions>>,
}

impl RejectionTracking {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_enabled(&self) -> bool {
		self.current().is_some()
	}

	/// Notifies the tracker of an unhandled rejection.
	///
	/// Returns true if the rejection was passed to the `on_unhandled` callback.
	pub async fn dispatch_unhandled(&self, id: RejectionId, error: ThrownValue) -> bool {
		let Some(options) = self.current() else {
			debug!(id, "Rejection tracking disabled, ignoring rejection");
			return false;
		};

		if !options.all_rejections && !is_whitelisted(&error) {
			debug!(id, "Rejection not in default whitelist, ignoring");
			return false;
		}

		(options.on_unhandled)(id, error).await;
		true
	}

	fn current(&self) -> Option<RejectionTrackingOptions> {
		self.options
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}
}

impl RejectionTracker for RejectionTracking {
	fn enable(&self, options: RejectionTrackingOptions) {
		*self.options.write().unwrap_or_else(PoisonError::into_inner) = Some(options);
	}
}

fn is_whitelisted(error: &ThrownValue) -> bool {
	error
		.as_error()
		.is_some_and(|error| DEFAULT_WHITELIST.contains(&error.name.as_str()))
}
