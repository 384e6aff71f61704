// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One-shot installation guard.

use std::sync::OnceLock;

/// Runs an installation function at most once and caches its result.
///
/// The first [`call`](Idempotent::call) runs the function with its arguments;
/// every later call, from any thread and with any arguments, returns the
/// cached result without running it again. Concurrent first calls block until
/// the single installation finishes.
///
/// `new` is `const`, so a guard can live in a `static` for process-wide
/// installation.
pub struct Idempotent<F, T> {
	install: F,
	result: OnceLock<T>,
}

impl<F, T> Idempotent<F, T> {
	/// Wraps `install` in a one-shot guard.
	pub const fn new(install: F) -> Self {
		Self {
			install,
			result: OnceLock::new(),
		}
	}

	/// Runs the installation on the first call; returns the cached result after.
	pub fn call<A>(&self, args: A) -> T
	where
		F: Fn(A) -> T,
		T: Clone,
	{
		self.result.get_or_init(|| (self.install)(args)).clone()
	}

	/// Returns true once the installation has run.
	pub fn has_run(&self) -> bool {
		self.result.get().is_some()
	}

	/// Returns the cached result without running the installation.
	pub fn get(&self) -> Option<&T> {
		self.result.get()
	}
}

/// Wraps `install` in an [`Idempotent`] guard.
pub fn make_idempotent<A, F, T>(install: F) -> Idempotent<F, T>
where
	F: Fn(A) -> T,
{
	Idempotent::new(install)
}
