// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Append-only store for check results.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::instrument;

use marketwatch_monitor_core::{CheckKind, CheckResult, ConnectionId};

use crate::error::{PersistenceError, Result};
use crate::timestamp;

/// Persistence interface for monitoring results.
#[async_trait]
pub trait ResultStore: Send + Sync {
	/// Create the results table and its lookup indexes. Safe to call repeatedly.
	async fn ensure_indexes(&self) -> Result<()>;

	/// Append one result. Fails with [`PersistenceError::Duplicate`] if a result
	/// for the same (connection, check, epoch) already exists.
	///
	/// Timestamps are kept to the millisecond; anything finer is dropped.
	async fn write_result(&self, result: &CheckResult) -> Result<()>;

	/// Most recent results first, at most `limit`.
	async fn query_recent(
		&self,
		connection_id: &ConnectionId,
		check: CheckKind,
		limit: u32,
	) -> Result<Vec<CheckResult>>;

	/// Results with `from <= finished_at < to`, oldest first, at most `limit`.
	async fn query_range(
		&self,
		from: DateTime<Utc>,
		to: DateTime<Utc>,
		limit: u32,
	) -> Result<Vec<CheckResult>>;
}

const SCHEMA: &[&str] = &[
	r#"
	CREATE TABLE IF NOT EXISTS check_results (
		id TEXT PRIMARY KEY,
		connection_id TEXT NOT NULL,
		check_name TEXT NOT NULL,
		epoch INTEGER NOT NULL,
		started_at TEXT NOT NULL,
		finished_at TEXT NOT NULL,
		duration_ms INTEGER NOT NULL,
		outcome TEXT NOT NULL,
		payload TEXT NOT NULL,
		error TEXT
	)
	"#,
	r#"
	CREATE UNIQUE INDEX IF NOT EXISTS idx_check_results_execution
		ON check_results (connection_id, check_name, epoch)
	"#,
	r#"
	CREATE INDEX IF NOT EXISTS idx_check_results_recent
		ON check_results (connection_id, check_name, finished_at)
	"#,
	r#"
	CREATE INDEX IF NOT EXISTS idx_check_results_finished_at
		ON check_results (finished_at)
	"#,
];

/// SQLite implementation of the result store.
#[derive(Clone)]
pub struct SqliteResultStore {
	pool: SqlitePool,
}

impl SqliteResultStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl ResultStore for SqliteResultStore {
	#[instrument(skip(self))]
	async fn ensure_indexes(&self) -> Result<()> {
		let mut tx = self.pool.begin().await?;
		for statement in SCHEMA {
			sqlx::query(*statement).execute(&mut *tx).await?;
		}
		tx.commit().await?;

		tracing::debug!("check result indexes ensured");
		Ok(())
	}

	#[instrument(
		skip(self, result),
		fields(connection_id = %result.connection_id, check = %result.check, epoch = result.epoch)
	)]
	async fn write_result(&self, result: &CheckResult) -> Result<()> {
		let payload = serde_json::to_string(&result.payload)?;

		sqlx::query(
			r#"
			INSERT INTO check_results (
				id, connection_id, check_name, epoch,
				started_at, finished_at, duration_ms,
				outcome, payload, error
			)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(result.id.0.to_string())
		.bind(result.connection_id.as_str())
		.bind(result.check.as_str())
		.bind(result.epoch)
		.bind(timestamp::format(result.started_at))
		.bind(timestamp::format(result.finished_at))
		.bind(result.duration_ms as i64)
		.bind(result.outcome.to_string())
		.bind(payload)
		.bind(&result.error)
		.execute(&self.pool)
		.await
		.map_err(|e| match e {
			sqlx::Error::Database(ref db) if db.is_unique_violation() => PersistenceError::Duplicate {
				connection_id: result.connection_id.clone(),
				check: result.check,
				epoch: result.epoch,
			},
			other => PersistenceError::Database(other),
		})?;

		Ok(())
	}

	#[instrument(skip(self), fields(connection_id = %connection_id, check = %check))]
	async fn query_recent(
		&self,
		connection_id: &ConnectionId,
		check: CheckKind,
		limit: u32,
	) -> Result<Vec<CheckResult>> {
		if limit == 0 {
			return Ok(Vec::new());
		}

		let rows = sqlx::query_as::<_, CheckResultRow>(
			r#"
			SELECT id, connection_id, check_name, epoch,
				   started_at, finished_at, duration_ms,
				   outcome, payload, error
			FROM check_results
			WHERE connection_id = ? AND check_name = ?
			ORDER BY finished_at DESC, epoch DESC
			LIMIT ?
			"#,
		)
		.bind(connection_id.as_str())
		.bind(check.as_str())
		.bind(limit as i64)
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(skip(self))]
	async fn query_range(
		&self,
		from: DateTime<Utc>,
		to: DateTime<Utc>,
		limit: u32,
	) -> Result<Vec<CheckResult>> {
		if limit == 0 || from >= to {
			return Ok(Vec::new());
		}

		let rows = sqlx::query_as::<_, CheckResultRow>(
			r#"
			SELECT id, connection_id, check_name, epoch,
				   started_at, finished_at, duration_ms,
				   outcome, payload, error
			FROM check_results
			WHERE finished_at >= ? AND finished_at < ?
			ORDER BY finished_at ASC, epoch ASC
			LIMIT ?
			"#,
		)
		.bind(timestamp::format(from))
		.bind(timestamp::format(to))
		.bind(limit as i64)
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}
}

#[derive(sqlx::FromRow)]
struct CheckResultRow {
	id: String,
	connection_id: String,
	check_name: String,
	epoch: i64,
	started_at: String,
	finished_at: String,
	duration_ms: i64,
	outcome: String,
	payload: String,
	error: Option<String>,
}

impl TryFrom<CheckResultRow> for CheckResult {
	type Error = PersistenceError;

	fn try_from(row: CheckResultRow) -> Result<Self> {
		Ok(CheckResult {
			id: row
				.id
				.parse()
				.map_err(|_| PersistenceError::Internal("Invalid result ID".to_string()))?,
			connection_id: row
				.connection_id
				.parse()
				.map_err(|_| PersistenceError::Internal("Invalid connection ID".to_string()))?,
			check: row
				.check_name
				.parse()
				.map_err(|_| PersistenceError::Internal("Invalid check name".to_string()))?,
			epoch: row.epoch,
			started_at: timestamp::parse(&row.started_at, "started_at")?,
			finished_at: timestamp::parse(&row.finished_at, "finished_at")?,
			duration_ms: row.duration_ms.max(0) as u64,
			outcome: row
				.outcome
				.parse()
				.map_err(|_| PersistenceError::Internal("Invalid outcome".to_string()))?,
			payload: serde_json::from_str(&row.payload)?,
			error: row.error,
		})
	}
}
