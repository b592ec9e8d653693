// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Registry of marketplace connections under monitoring.
//!
//! Connections are created and suspended by the account-linking side. The
//! orchestrator only reads them through [`ConnectionRegistry::list_active`],
//! once per cycle.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::instrument;

use marketwatch_monitor_core::{Connection, ConnectionId, ConnectionStatus, MarketplaceId};

use crate::error::{PersistenceError, Result};
use crate::timestamp;

#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
	/// Connections whose status is `active` right now, ordered by id.
	async fn list_active(&self) -> Result<Vec<Connection>>;
}

/// SQLite implementation of the connection registry.
#[derive(Clone)]
pub struct SqliteConnectionRegistry {
	pool: SqlitePool,
}

impl SqliteConnectionRegistry {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[instrument(skip(self))]
	pub async fn ensure_schema(&self) -> Result<()> {
		sqlx::query(
			r#"
			CREATE TABLE IF NOT EXISTS marketplace_connections (
				id TEXT PRIMARY KEY,
				marketplace_id TEXT NOT NULL,
				region TEXT NOT NULL,
				status TEXT NOT NULL,
				created_at TEXT NOT NULL,
				updated_at TEXT NOT NULL
			)
			"#,
		)
		.execute(&self.pool)
		.await?;

		sqlx::query(
			r#"
			CREATE INDEX IF NOT EXISTS idx_marketplace_connections_status
				ON marketplace_connections (status)
			"#,
		)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	/// Insert a connection or replace its marketplace, region and status.
	#[instrument(skip(self, connection), fields(connection_id = %connection.id, status = %connection.status))]
	pub async fn upsert(&self, connection: &Connection) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO marketplace_connections (
				id, marketplace_id, region, status, created_at, updated_at
			)
			VALUES (?, ?, ?, ?, ?, ?)
			ON CONFLICT(id) DO UPDATE SET
				marketplace_id = excluded.marketplace_id,
				region = excluded.region,
				status = excluded.status,
				updated_at = excluded.updated_at
			"#,
		)
		.bind(connection.id.as_str())
		.bind(connection.marketplace_id.as_str())
		.bind(&connection.region)
		.bind(connection.status.to_string())
		.bind(timestamp::format(connection.created_at))
		.bind(timestamp::format(connection.updated_at))
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	/// Returns `false` if no connection has this id.
	#[instrument(skip(self), fields(connection_id = %id, status = %status))]
	pub async fn set_status(&self, id: &ConnectionId, status: ConnectionStatus) -> Result<bool> {
		let result = sqlx::query(
			r#"
			UPDATE marketplace_connections
			SET status = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(status.to_string())
		.bind(timestamp::format(Utc::now()))
		.bind(id.as_str())
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}

	#[instrument(skip(self), fields(connection_id = %id))]
	pub async fn get(&self, id: &ConnectionId) -> Result<Option<Connection>> {
		let row = sqlx::query_as::<_, ConnectionRow>(
			r#"
			SELECT id, marketplace_id, region, status, created_at, updated_at
			FROM marketplace_connections
			WHERE id = ?
			"#,
		)
		.bind(id.as_str())
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}
}

#[async_trait]
impl ConnectionRegistry for SqliteConnectionRegistry {
	#[instrument(skip(self))]
	async fn list_active(&self) -> Result<Vec<Connection>> {
		let rows = sqlx::query_as::<_, ConnectionRow>(
			r#"
			SELECT id, marketplace_id, region, status, created_at, updated_at
			FROM marketplace_connections
			WHERE status = 'active'
			ORDER BY id ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}
}

#[derive(sqlx::FromRow)]
struct ConnectionRow {
	id: String,
	marketplace_id: String,
	region: String,
	status: String,
	created_at: String,
	updated_at: String,
}

impl TryFrom<ConnectionRow> for Connection {
	type Error = PersistenceError;

	fn try_from(row: ConnectionRow) -> Result<Self> {
		Ok(Connection {
			id: row
				.id
				.parse()
				.map_err(|_| PersistenceError::Internal("Invalid connection ID".to_string()))?,
			marketplace_id: MarketplaceId::new(&row.marketplace_id),
			region: row.region,
			status: row
				.status
				.parse()
				.map_err(|_| PersistenceError::Internal("Invalid status".to_string()))?,
			created_at: timestamp::parse(&row.created_at, "created_at")?,
			updated_at: timestamp::parse(&row.updated_at, "updated_at")?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{create_test_pool, create_test_registry, make_connection};

	fn ids(connections: &[Connection]) -> Vec<&str> {
		connections.iter().map(|c| c.id.as_str()).collect()
	}

	#[tokio::test]
	async fn list_active_excludes_suspended_and_revoked() {
		let pool = create_test_pool().await;
		let registry = create_test_registry(&pool).await;

		registry
			.upsert(&make_connection("C3", "amazon", ConnectionStatus::Active))
			.await
			.unwrap();
		registry
			.upsert(&make_connection("C1", "amazon", ConnectionStatus::Active))
			.await
			.unwrap();
		registry
			.upsert(&make_connection("C2", "amazon", ConnectionStatus::Suspended))
			.await
			.unwrap();
		registry
			.upsert(&make_connection("C4", "ebay", ConnectionStatus::Revoked))
			.await
			.unwrap();

		let active = registry.list_active().await.unwrap();
		assert_eq!(ids(&active), vec!["C1", "C3"]);
	}

	#[tokio::test]
	async fn list_active_reflects_status_changes_immediately() {
		let pool = create_test_pool().await;
		let registry = create_test_registry(&pool).await;
		registry
			.upsert(&make_connection("C1", "amazon", ConnectionStatus::Active))
			.await
			.unwrap();
		assert_eq!(registry.list_active().await.unwrap().len(), 1);

		let id = ConnectionId::new("C1").unwrap();
		assert!(registry.set_status(&id, ConnectionStatus::Suspended).await.unwrap());
		assert!(registry.list_active().await.unwrap().is_empty());

		assert!(registry.set_status(&id, ConnectionStatus::Active).await.unwrap());
		assert_eq!(ids(&registry.list_active().await.unwrap()), vec!["C1"]);
	}

	#[tokio::test]
	async fn set_status_on_unknown_connection_returns_false() {
		let pool = create_test_pool().await;
		let registry = create_test_registry(&pool).await;

		let updated = registry
			.set_status(&ConnectionId::new("missing").unwrap(), ConnectionStatus::Revoked)
			.await
			.unwrap();
		assert!(!updated);
	}

	#[tokio::test]
	async fn upsert_replaces_region_and_keeps_one_row() {
		let pool = create_test_pool().await;
		let registry = create_test_registry(&pool).await;

		let mut conn = make_connection("C1", "Amazon", ConnectionStatus::Active);
		registry.upsert(&conn).await.unwrap();
		conn.region = "eu".to_string();
		registry.upsert(&conn).await.unwrap();

		let stored = registry
			.get(&ConnectionId::new("C1").unwrap())
			.await
			.unwrap()
			.unwrap();
		assert_eq!(stored.region, "eu");
		assert_eq!(stored.marketplace_id.as_str(), "amazon");
		assert_eq!(registry.list_active().await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn ensure_schema_is_idempotent() {
		let pool = create_test_pool().await;
		let registry = create_test_registry(&pool).await;
		registry
			.upsert(&make_connection("C1", "amazon", ConnectionStatus::Active))
			.await
			.unwrap();

		registry.ensure_schema().await.unwrap();
		registry.ensure_schema().await.unwrap();

		assert_eq!(registry.list_active().await.unwrap().len(), 1);
	}
}
