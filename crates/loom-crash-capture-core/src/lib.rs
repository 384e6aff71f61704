// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Loom uncaught-error capture pipeline.
//!
//! This crate holds the backend-agnostic data model shared by the capture SDK
//! (`loom-crash-capture`) and anything that consumes its records:
//!
//! - [`CapturedFrame`]: a raw stack frame as produced by symbolication, any
//!   field of which may be missing
//! - [`NormalizedFrame`] and [`normalize`]: the fixed-shape frame schema sent
//!   to the crash backend
//! - [`ErrorRecord`] and [`build_error_record`]: the canonical record handed to
//!   the native crash collaborator
//! - [`ThrownValue`]: whatever value reached the uncaught-error handler, with
//!   host-runtime string coercion
//!
//! Nothing in here performs I/O or fails; malformed input always degrades to
//! defaults.

pub mod frame;
pub mod record;
pub mod value;

pub use frame::{normalize, parse_file_name, CapturedFrame, NormalizedFrame, UNKNOWN};
pub use record::{build_error_record, ErrorRecord};
pub use value::{coerce_to_string, ErrorValue, ThrownValue};
