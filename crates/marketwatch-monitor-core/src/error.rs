// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the monitoring data model.

use thiserror::Error;

/// Result type for core monitoring operations.
pub type Result<T> = std::result::Result<T, MonitorCoreError>;

/// Errors raised while building or parsing monitoring types.
#[derive(Debug, Error)]
pub enum MonitorCoreError {
	#[error("invalid connection id: {0}")]
	InvalidConnectionId(String),

	#[error("invalid check definition for {kind}: {message}")]
	InvalidDefinition { kind: String, message: String },

	#[error("unknown {kind}: {value}")]
	UnknownVariant { kind: &'static str, value: String },
}
