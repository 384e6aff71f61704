// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: route uncaught errors and rejections through the capture handlers.
//!
//! Run with:
//!   LOOM_CRASH_DEV_MODE=0 cargo run --example capture -p loom-crash-capture

use std::sync::Arc;

use async_trait::async_trait;
use loom_crash_capture::{
	record_error, set_global_error_handler, set_unhandled_promise_rejection_handler,
	CaptureConfig, CaptureServices, ErrorRecord, ErrorValue, HandlerSlot, NativeCrashModule,
	NativeModuleError, RejectionTracking, ThrownValue,
};

/// Prints what a native crash SDK would persist.
struct PrintingNativeModule;

#[async_trait]
impl NativeCrashModule for PrintingNativeModule {
	async fn log(&self, message: &str) -> Result<(), NativeModuleError> {
		println!("log: {message}");
		Ok(())
	}

	async fn set_attribute(&self, key: &str, value: &str) -> Result<(), NativeModuleError> {
		println!("attribute: {key} = {value}");
		Ok(())
	}

	async fn record_error(&self, record: ErrorRecord) -> Result<(), NativeModuleError> {
		let json = serde_json::to_string_pretty(&record)
			.map_err(|e| NativeModuleError::new("recordError", e.to_string()))?;
		println!("record: {json}");
		Ok(())
	}

	fn is_error_generation_on_js_crash_enabled(&self) -> bool {
		true
	}
}

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "loom_crash_capture=debug".into()),
		)
		.init();

	let services = CaptureServices::new(PrintingNativeModule).with_config(CaptureConfig::from_env());
	println!("Dev mode: {}", services.config().dev_mode.is_enabled());

	let slot = Arc::new(HandlerSlot::default());
	let tracking = Arc::new(RejectionTracking::new());

	set_global_error_handler(slot.clone(), services.clone());
	set_unhandled_promise_rejection_handler(tracking.clone(), services.clone());

	let stack = "TypeError: undefined is not a function
    at onPress (http://localhost:8081/index.bundle?platform=ios:1204:27)
    at dispatch (http://localhost:8081/index.bundle?platform=ios:88:12)";

	println!("\n-- uncaught error");
	let error = ErrorValue::new("TypeError", "undefined is not a function").with_stack(stack);
	slot.dispatch(error.clone().into(), true).await;

	println!("\n-- thrown string");
	slot.dispatch("boom".into(), false).await;

	println!("\n-- unhandled rejection");
	tracking.dispatch_unhandled(1, error.clone().into()).await;

	println!("\n-- manual record with error name");
	if let Err(e) = record_error(&services, &ThrownValue::from(error), Some("CheckoutFailed")).await {
		eprintln!("record_error failed: {e}");
	}
}
