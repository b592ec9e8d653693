// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use marketwatch_monitor_core::{CheckKind, ConnectionId};

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("Duplicate result for {connection_id}/{check} at epoch {epoch}")]
	Duplicate {
		connection_id: ConnectionId,
		check: CheckKind,
		epoch: i64,
	},

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Internal: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
