// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Integration tests for the capture handlers.
//!
//! Tests cover:
//! - Chaining to the original global handler in every mode
//! - Step ordering and fault isolation of the fatal reporting sequence
//! - Non-Error values and dev mode
//! - Unhandled rejection reporting
//! - Manual `record_error` with an error name
//! - Once-per-process installation

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use loom_crash_capture::{
	global_handler, record_error, set_global_error_handler, set_unhandled_promise_rejection_handler,
	AnalyticsBackend, AnalyticsError, CaptureConfig, CaptureError, CaptureServices, CapturedFrame,
	DevMode, ErrorRecord, ErrorValue, GlobalErrorInterceptor, GlobalHandlerRegistry, HandlerSlot,
	NativeCrashModule, NativeModuleError, RejectionInterceptor, RejectionTracking,
	SymbolicateOptions, SymbolicationError, Symbolicator, ThrownValue, APP_EXCEPTION_EVENT,
	FATAL_FLAG, UNKNOWN,
};
use serde_json::json;

const STACK: &str = "TypeError: undefined is not a function
    at onPress (http://localhost:8081/index.bundle?platform=ios:1204:27)
    at dispatch (http://localhost:8081/index.bundle?platform=ios:88:12)";

// ============================================================================
// Test doubles
// ============================================================================

/// Ordered log of collaborator calls shared by all doubles.
#[derive(Clone, Default)]
struct Timeline(Arc<Mutex<Vec<String>>>);

impl Timeline {
	fn push(&self, entry: impl Into<String>) {
		self.0.lock().unwrap().push(entry.into());
	}

	fn entries(&self) -> Vec<String> {
		self.0.lock().unwrap().clone()
	}
}

#[derive(Default)]
struct FakeNative {
	timeline: Timeline,
	generation_enabled: bool,
	fail_log: bool,
	fail_attribute: bool,
	fail_record: bool,
	logs: Mutex<Vec<String>>,
	attributes: Mutex<Vec<(String, String)>>,
	records: Mutex<Vec<ErrorRecord>>,
}

impl FakeNative {
	fn enabled(timeline: &Timeline) -> Self {
		Self {
			timeline: timeline.clone(),
			generation_enabled: true,
			..Self::default()
		}
	}

	fn records(&self) -> Vec<ErrorRecord> {
		self.records.lock().unwrap().clone()
	}

	fn logs(&self) -> Vec<String> {
		self.logs.lock().unwrap().clone()
	}
}

#[async_trait]
impl NativeCrashModule for FakeNative {
	async fn log(&self, message: &str) -> Result<(), NativeModuleError> {
		self.timeline.push("log");
		self.logs.lock().unwrap().push(message.to_string());
		if self.fail_log {
			return Err(NativeModuleError::new("log", "bridge unavailable"));
		}
		Ok(())
	}

	async fn set_attribute(&self, key: &str, value: &str) -> Result<(), NativeModuleError> {
		self.timeline.push("set_attribute");
		self.attributes
			.lock()
			.unwrap()
			.push((key.to_string(), value.to_string()));
		if self.fail_attribute {
			return Err(NativeModuleError::new("setAttribute", "bridge unavailable"));
		}
		Ok(())
	}

	async fn record_error(&self, record: ErrorRecord) -> Result<(), NativeModuleError> {
		self.timeline.push("record_error");
		self.records.lock().unwrap().push(record);
		if self.fail_record {
			return Err(NativeModuleError::new("recordError", "bridge unavailable"));
		}
		Ok(())
	}

	fn is_error_generation_on_js_crash_enabled(&self) -> bool {
		self.generation_enabled
	}
}

#[derive(Clone, Default)]
struct FakeAnalytics {
	timeline: Timeline,
	fail: bool,
	events: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

#[async_trait]
impl AnalyticsBackend for FakeAnalytics {
	async fn log_event(
		&self,
		name: &str,
		properties: serde_json::Value,
	) -> Result<(), AnalyticsError> {
		self.timeline.push("log_event");
		self.events
			.lock()
			.unwrap()
			.push((name.to_string(), properties));
		if self.fail {
			return Err(AnalyticsError::Failed("no analytics app".to_string()));
		}
		Ok(())
	}
}

/// Parses the stack like the default symbolicator but can be made to fail.
#[derive(Clone, Default)]
struct FakeSymbolicator {
	timeline: Timeline,
	fail: bool,
}

#[async_trait]
impl Symbolicator for FakeSymbolicator {
	async fn symbolicate(
		&self,
		error: &ErrorValue,
		options: SymbolicateOptions,
	) -> Result<Vec<CapturedFrame>, SymbolicationError> {
		self.timeline.push(format!("symbolicate offline={}", options.offline));
		if self.fail {
			return Err(SymbolicationError::Unavailable("source map missing".to_string()));
		}
		Ok(loom_crash_capture::parse_stack(error.stack.as_deref().unwrap_or_default()))
	}
}

struct Harness {
	timeline: Timeline,
	native: Arc<FakeNative>,
	analytics: FakeAnalytics,
	dev_mode: DevMode,
	original_calls: Arc<Mutex<Vec<(ThrownValue, bool)>>>,
	slot: HandlerSlot,
}

impl Harness {
	fn new(native: FakeNative, analytics: FakeAnalytics, symbolicator: FakeSymbolicator) -> (Self, CaptureServices) {
		let timeline = native.timeline.clone();
		let native = Arc::new(native);
		let dev_mode = DevMode::new(false);
		let original_calls = Arc::new(Mutex::new(Vec::new()));

		let calls = Arc::clone(&original_calls);
		let original_timeline = timeline.clone();
		let slot = HandlerSlot::new(global_handler(move |error, fatal| {
			let calls = Arc::clone(&calls);
			let timeline = original_timeline.clone();
			async move {
				timeline.push("original");
				calls.lock().unwrap().push((error, fatal));
			}
		}));

		let services = CaptureServices::from_shared(native.clone())
			.with_analytics(analytics.clone())
			.with_symbolicator(symbolicator)
			.with_config(CaptureConfig::default().dev_mode(dev_mode.clone()));

		(
			Self {
				timeline,
				native,
				analytics,
				dev_mode,
				original_calls,
				slot,
			},
			services,
		)
	}

	fn standard() -> (Self, CaptureServices) {
		let timeline = Timeline::default();
		Self::new(
			FakeNative::enabled(&timeline),
			FakeAnalytics {
				timeline: timeline.clone(),
				..FakeAnalytics::default()
			},
			FakeSymbolicator {
				timeline: timeline.clone(),
				..FakeSymbolicator::default()
			},
		)
	}

	fn original_calls(&self) -> Vec<(ThrownValue, bool)> {
		self.original_calls.lock().unwrap().clone()
	}
}

fn type_error() -> ThrownValue {
	ErrorValue::new("TypeError", "undefined is not a function")
		.with_stack(STACK)
		.into()
}

// ============================================================================
// Global error handler
// ============================================================================

#[tokio::test]
async fn fatal_error_runs_steps_in_order_then_original() {
	let (h, services) = Harness::standard();
	GlobalErrorInterceptor::install(&h.slot, services);

	h.slot.dispatch(type_error(), true).await;

	assert_eq!(
		h.timeline.entries(),
		vec![
			"symbolicate offline=true",
			"set_attribute",
			"log_event",
			"record_error",
			"original"
		]
	);

	let records = h.native.records();
	assert_eq!(records.len(), 1);
	assert_eq!(records[0].message, "undefined is not a function");
	assert!(!records[0].is_unhandled_rejection);
	assert_eq!(records[0].frames.len(), 2);
	assert_eq!(records[0].frames[0].function, "onPress");
	assert_eq!(records[0].frames[0].file, "http://localhost:8081/index.bundle:1204:27");

	let attributes = h.native.attributes.lock().unwrap().clone();
	assert_eq!(attributes.len(), 1);
	assert_eq!(attributes[0].0, FATAL_FLAG);
	assert!(attributes[0].1.parse::<i64>().is_ok());

	let events = h.analytics.events.lock().unwrap().clone();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].0, APP_EXCEPTION_EVENT);
	assert_eq!(events[0].1["fatal"], 1);
	assert!(events[0].1["timestamp"].as_str().unwrap().parse::<i64>().is_ok());

	let original = h.original_calls();
	assert_eq!(original, vec![(type_error(), true)]);
}

#[tokio::test]
async fn install_chains_to_previous_handler() {
	let (h, services) = Harness::standard();
	let previous = h.slot.get_global_handler();

	let installed = GlobalErrorInterceptor::install(&h.slot, services);

	assert!(Arc::ptr_eq(&h.slot.get_global_handler(), &installed));
	assert!(!Arc::ptr_eq(&installed, &previous));

	installed(type_error(), false).await;
	assert_eq!(h.original_calls(), vec![(type_error(), false)]);
}

#[tokio::test]
async fn original_handler_called_once_in_every_mode() {
	for dev in [false, true] {
		for error_shaped in [false, true] {
			for enabled in [false, true] {
				let timeline = Timeline::default();
				let native = FakeNative {
					timeline: timeline.clone(),
					generation_enabled: enabled,
					..FakeNative::default()
				};
				let (h, services) = Harness::new(
					native,
					FakeAnalytics {
						timeline: timeline.clone(),
						..FakeAnalytics::default()
					},
					FakeSymbolicator {
						timeline: timeline.clone(),
						..FakeSymbolicator::default()
					},
				);
				h.dev_mode.set(dev);
				GlobalErrorInterceptor::install(&h.slot, services);

				let error = if error_shaped { type_error() } else { "boom".into() };
				h.slot.dispatch(error.clone(), true).await;

				assert_eq!(
					h.original_calls(),
					vec![(error, true)],
					"dev={dev} error_shaped={error_shaped} enabled={enabled}"
				);
			}
		}
	}
}

#[tokio::test]
async fn dev_mode_makes_no_collaborator_calls() {
	let (h, services) = Harness::standard();
	h.dev_mode.set(true);
	GlobalErrorInterceptor::install(&h.slot, services);

	h.slot.dispatch(type_error(), true).await;
	h.slot.dispatch("boom".into(), true).await;

	assert_eq!(h.timeline.entries(), vec!["original", "original"]);
	assert!(h.native.records().is_empty());
	assert!(h.native.logs().is_empty());
	assert!(h.analytics.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn dev_mode_is_read_per_invocation() {
	let (h, services) = Harness::standard();
	GlobalErrorInterceptor::install(&h.slot, services);

	h.dev_mode.set(true);
	h.slot.dispatch(type_error(), true).await;
	assert!(h.native.records().is_empty());

	h.dev_mode.set(false);
	h.slot.dispatch(type_error(), true).await;
	assert_eq!(h.native.records().len(), 1);
}

#[tokio::test]
async fn non_error_value_is_logged_not_recorded() {
	let (h, services) = Harness::standard();
	GlobalErrorInterceptor::install(&h.slot, services);

	let thrown: ThrownValue = "boom".into();
	h.slot.dispatch(thrown.clone(), false).await;

	let logs = h.native.logs();
	assert_eq!(logs.len(), 1);
	assert!(logs[0].contains("boom"));
	assert_eq!(logs[0], "Unknown Error: boom");
	assert!(h.native.records().is_empty());
	assert_eq!(h.timeline.entries(), vec!["log", "original"]);
	assert_eq!(h.original_calls(), vec![(thrown, false)]);
}

#[tokio::test]
async fn non_error_object_is_coerced_in_log() {
	let (h, services) = Harness::standard();
	GlobalErrorInterceptor::install(&h.slot, services);

	h.slot
		.dispatch(ThrownValue::Other(json!({"message": "boom"})), true)
		.await;

	assert_eq!(h.native.logs(), vec!["Unknown Error: [object Object]"]);
	assert_eq!(h.original_calls().len(), 1);
}

#[tokio::test]
async fn failed_diagnostic_log_still_calls_original() {
	let timeline = Timeline::default();
	let native = FakeNative {
		fail_log: true,
		..FakeNative::enabled(&timeline)
	};
	let (h, services) = Harness::new(native, FakeAnalytics::default(), FakeSymbolicator::default());
	GlobalErrorInterceptor::install(&h.slot, services);

	h.slot.dispatch("boom".into(), true).await;

	assert_eq!(h.native.logs().len(), 1);
	assert_eq!(h.original_calls().len(), 1);
}

#[tokio::test]
async fn generation_disabled_skips_reporting() {
	let timeline = Timeline::default();
	let native = FakeNative {
		timeline: timeline.clone(),
		generation_enabled: false,
		..FakeNative::default()
	};
	let (h, services) = Harness::new(
		native,
		FakeAnalytics {
			timeline: timeline.clone(),
			..FakeAnalytics::default()
		},
		FakeSymbolicator {
			timeline: timeline.clone(),
			..FakeSymbolicator::default()
		},
	);
	GlobalErrorInterceptor::install(&h.slot, services);

	h.slot.dispatch(type_error(), true).await;

	assert_eq!(h.timeline.entries(), vec!["original"]);
}

#[tokio::test]
async fn symbolication_failure_skips_record_but_calls_original() {
	let timeline = Timeline::default();
	let (h, services) = Harness::new(
		FakeNative::enabled(&timeline),
		FakeAnalytics {
			timeline: timeline.clone(),
			..FakeAnalytics::default()
		},
		FakeSymbolicator {
			timeline: timeline.clone(),
			fail: true,
		},
	);
	GlobalErrorInterceptor::install(&h.slot, services);

	h.slot.dispatch(type_error(), true).await;

	assert!(h.native.records().is_empty());
	assert_eq!(
		h.timeline.entries(),
		vec!["symbolicate offline=true", "original"]
	);
	assert_eq!(h.original_calls().len(), 1);
}

#[tokio::test]
async fn analytics_failure_still_records() {
	let timeline = Timeline::default();
	let (h, services) = Harness::new(
		FakeNative::enabled(&timeline),
		FakeAnalytics {
			timeline: timeline.clone(),
			fail: true,
			..FakeAnalytics::default()
		},
		FakeSymbolicator {
			timeline: timeline.clone(),
			..FakeSymbolicator::default()
		},
	);
	GlobalErrorInterceptor::install(&h.slot, services);

	h.slot.dispatch(type_error(), true).await;

	assert_eq!(h.native.records().len(), 1);
	assert_eq!(h.original_calls().len(), 1);
}

#[tokio::test]
async fn missing_analytics_still_records() {
	let timeline = Timeline::default();
	let native = Arc::new(FakeNative::enabled(&timeline));
	let slot = HandlerSlot::default();
	let services = CaptureServices::from_shared(native.clone())
		.with_config(CaptureConfig::default().dev_mode(DevMode::new(false)));
	GlobalErrorInterceptor::install(&slot, services);

	slot.dispatch(type_error(), true).await;

	assert_eq!(native.records().len(), 1);
}

#[tokio::test]
async fn attribute_failure_still_records() {
	let timeline = Timeline::default();
	let native = FakeNative {
		fail_attribute: true,
		..FakeNative::enabled(&timeline)
	};
	let (h, services) = Harness::new(
		native,
		FakeAnalytics {
			timeline: timeline.clone(),
			..FakeAnalytics::default()
		},
		FakeSymbolicator {
			timeline: timeline.clone(),
			..FakeSymbolicator::default()
		},
	);
	GlobalErrorInterceptor::install(&h.slot, services);

	h.slot.dispatch(type_error(), true).await;

	assert_eq!(
		h.timeline.entries(),
		vec![
			"symbolicate offline=true",
			"set_attribute",
			"log_event",
			"record_error",
			"original"
		]
	);
	assert_eq!(h.native.records().len(), 1);
}

#[tokio::test]
async fn record_failure_still_calls_original() {
	let timeline = Timeline::default();
	let native = FakeNative {
		fail_record: true,
		..FakeNative::enabled(&timeline)
	};
	let (h, services) = Harness::new(native, FakeAnalytics::default(), FakeSymbolicator::default());
	GlobalErrorInterceptor::install(&h.slot, services);

	h.slot.dispatch(type_error(), true).await;

	assert_eq!(h.native.records().len(), 1);
	assert_eq!(h.original_calls().len(), 1);
}

#[tokio::test]
async fn missing_message_is_recorded_as_undefined() {
	let (h, services) = Harness::standard();
	GlobalErrorInterceptor::install(&h.slot, services);

	let error = ErrorValue::new("Error", "")
		.with_message_value(None)
		.with_stack(STACK);
	h.slot.dispatch(error.into(), true).await;

	assert_eq!(h.native.records()[0].message, "undefined");
}

// ============================================================================
// Unhandled rejections
// ============================================================================

#[tokio::test]
async fn rejection_is_recorded_as_unhandled() {
	let (h, services) = Harness::standard();
	let tracking = RejectionTracking::new();
	RejectionInterceptor::install(&tracking, services);

	assert!(tracking.is_enabled());
	assert!(tracking.dispatch_unhandled(7, type_error()).await);

	let records = h.native.records();
	assert_eq!(records.len(), 1);
	assert!(records[0].is_unhandled_rejection);
	assert_eq!(records[0].message, "undefined is not a function");
	assert_eq!(
		h.timeline.entries(),
		vec!["symbolicate offline=true", "record_error"]
	);
}

#[tokio::test]
async fn rejection_tracking_reports_all_error_types() {
	let (h, services) = Harness::standard();
	let tracking = RejectionTracking::new();
	RejectionInterceptor::install(&tracking, services);

	let custom = ErrorValue::new("PaymentError", "card declined").with_stack(STACK);
	assert!(tracking.dispatch_unhandled(1, custom.into()).await);
	assert_eq!(h.native.records().len(), 1);
}

#[tokio::test]
async fn rejection_in_dev_mode_is_ignored() {
	let (h, services) = Harness::standard();
	h.dev_mode.set(true);
	let tracking = RejectionTracking::new();
	let on_unhandled = RejectionInterceptor::install(&tracking, services);

	on_unhandled(1, type_error()).await;

	assert!(h.timeline.entries().is_empty());
}

#[tokio::test]
async fn rejection_failures_are_swallowed() {
	let timeline = Timeline::default();
	let native = FakeNative {
		fail_record: true,
		..FakeNative::enabled(&timeline)
	};
	let (h, services) = Harness::new(
		native,
		FakeAnalytics::default(),
		FakeSymbolicator {
			timeline: timeline.clone(),
			fail: false,
		},
	);
	let tracking = RejectionTracking::new();
	RejectionInterceptor::install(&tracking, services);

	assert!(tracking.dispatch_unhandled(1, type_error()).await);
	assert!(tracking.dispatch_unhandled(2, "not an error".into()).await);

	assert_eq!(h.native.records().len(), 1);
}

#[tokio::test]
async fn rejection_symbolication_failure_skips_record() {
	let timeline = Timeline::default();
	let (h, services) = Harness::new(
		FakeNative::enabled(&timeline),
		FakeAnalytics::default(),
		FakeSymbolicator {
			timeline: timeline.clone(),
			fail: true,
		},
	);
	let tracking = RejectionTracking::new();
	RejectionInterceptor::install(&tracking, services);

	tracking.dispatch_unhandled(1, type_error()).await;

	assert!(h.native.records().is_empty());
}

// ============================================================================
// Manual recording
// ============================================================================

#[tokio::test]
async fn record_error_with_name_adds_header_frame() {
	let (h, services) = Harness::standard();

	record_error(&services, &type_error(), Some("CheckoutFailed"))
		.await
		.unwrap();

	let records = h.native.records();
	assert_eq!(records.len(), 1);
	assert!(!records[0].is_unhandled_rejection);
	assert_eq!(records[0].frames.len(), 3);
	assert_eq!(records[0].frames[0].file, "CheckoutFailed");
	assert_eq!(records[0].frames[0].function, UNKNOWN);
	assert_eq!(records[0].frames[1].function, "onPress");
}

#[tokio::test]
async fn record_error_rejects_non_error_values() {
	let (h, services) = Harness::standard();

	let result = record_error(&services, &ThrownValue::from("boom"), None).await;

	assert!(matches!(result, Err(CaptureError::NonErrorInput(ref v)) if v == "boom"));
	assert!(h.native.records().is_empty());
}

#[tokio::test]
async fn record_error_surfaces_collaborator_failures() {
	let timeline = Timeline::default();
	let (_h, services) = Harness::new(
		FakeNative::enabled(&timeline),
		FakeAnalytics::default(),
		FakeSymbolicator {
			timeline: timeline.clone(),
			fail: true,
		},
	);

	let result = record_error(&services, &type_error(), None).await;
	assert!(matches!(result, Err(CaptureError::Symbolication(_))));
}

// ============================================================================
// Process-wide installation
// ============================================================================

#[tokio::test]
async fn global_handler_installs_once_per_process() {
	let (h, services) = Harness::standard();
	let slot = Arc::new(h.slot);
	let registry: Arc<dyn GlobalHandlerRegistry> = slot.clone();

	let first = set_global_error_handler(Arc::clone(&registry), services.clone());
	let second = set_global_error_handler(Arc::clone(&registry), services);

	assert!(Arc::ptr_eq(&first, &second));
	assert!(Arc::ptr_eq(&slot.get_global_handler(), &first));

	// A second registry is ignored entirely.
	let other = Arc::new(HandlerSlot::default());
	let before = other.get_global_handler();
	let (_h2, other_services) = Harness::standard();
	let third = set_global_error_handler(other.clone(), other_services);
	assert!(Arc::ptr_eq(&first, &third));
	assert!(Arc::ptr_eq(&other.get_global_handler(), &before));

	// The wrapped original runs exactly once per error, not once per install.
	slot.dispatch(type_error(), true).await;
	assert_eq!(h.original_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn rejection_handler_installs_once_per_process() {
	let (h, services) = Harness::standard();
	let tracking = Arc::new(RejectionTracking::new());

	let first = set_unhandled_promise_rejection_handler(tracking.clone(), services.clone());
	let second = set_unhandled_promise_rejection_handler(tracking.clone(), services);
	assert!(Arc::ptr_eq(&first, &second));

	let other = Arc::new(RejectionTracking::new());
	let (_h2, other_services) = Harness::standard();
	let third = set_unhandled_promise_rejection_handler(other.clone(), other_services);
	assert!(Arc::ptr_eq(&first, &third));
	assert!(!other.is_enabled());

	tracking.dispatch_unhandled(1, type_error()).await;
	assert_eq!(h.native.records().len(), 1);
}
