// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The host runtime's global uncaught-error handler slot.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::{BoxFuture, FutureExt};
use loom_crash_capture_core::ThrownValue;
use tracing::error;

/// A global uncaught-error handler, called with the error and whether it is fatal.
pub type GlobalHandler = Arc<dyn Fn(ThrownValue, bool) -> BoxFuture<'static, ()> + Send + Sync>;

/// Wraps an async closure as a [`GlobalHandler`].
pub fn global_handler<F, Fut>(f: F) -> GlobalHandler
where
	F: Fn(ThrownValue, bool) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	Arc::new(move |error, fatal| f(error, fatal).boxed())
}

/// Access to the runtime's single global uncaught-error handler.
pub trait GlobalHandlerRegistry: Send + Sync + 'static {
	/// Returns the currently registered handler.
	fn get_global_handler(&self) -> GlobalHandler;

	/// Replaces the registered handler.
	fn set_global_handler(&self, handler: GlobalHandler);
}

/// In-process handler slot for hosts that route uncaught errors themselves.
pub struct HandlerSlot {
	handler: RwLock<GlobalHandler>,
}

impl HandlerSlot {
	/// Creates a slot holding `handler`.
	pub fn new(handler: GlobalHandler) -> Self {
		Self {
			handler: RwLock::new(handler),
		}
	}

	/// Sends an uncaught error to whichever handler is registered now.
	pub async fn dispatch(&self, error: ThrownValue, fatal: bool) {
		let handler = self.get_global_handler();
		handler(error, fatal).await;
	}
}

impl Default for HandlerSlot {
	/// Starts with a handler that only logs the error.
	fn default() -> Self {
		Self::new(global_handler(|error, fatal| async move {
			error!(error = %error, fatal, "Uncaught error");
		}))
	}
}

impl GlobalHandlerRegistry for HandlerSlot {
	fn get_global_handler(&self) -> GlobalHandler {
		Arc::clone(&self.handler.read().unwrap_or_else(PoisonError::into_inner))
	}

	fn set_global_handler(&self, handler: GlobalHandler) {
		*self.handler.write().unwrap_or_else(PoisonError::into_inner) = handler;
	}
}
