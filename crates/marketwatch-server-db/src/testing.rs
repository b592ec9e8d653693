// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helpers for tests that need a database.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::{SqliteConnectionRegistry, SqliteResultStore};
use marketwatch_monitor_core::{Connection, ConnectionId, ConnectionStatus, MarketplaceId};

/// In-memory pool pinned to one connection so every query sees the same database.
pub async fn create_test_pool() -> SqlitePool {
	SqlitePoolOptions::new()
		.max_connections(1)
		.connect("sqlite::memory:")
		.await
		.unwrap()
}

/// Result store with its table and indexes in place.
pub async fn create_test_store(pool: &SqlitePool) -> SqliteResultStore {
	use crate::ResultStore;

	let store = SqliteResultStore::new(pool.clone());
	store.ensure_indexes().await.unwrap();
	store
}

/// Connection registry with its schema in place.
pub async fn create_test_registry(pool: &SqlitePool) -> SqliteConnectionRegistry {
	let registry = SqliteConnectionRegistry::new(pool.clone());
	registry.ensure_schema().await.unwrap();
	registry
}

pub fn make_connection(id: &str, marketplace: &str, status: ConnectionStatus) -> Connection {
	let mut conn = Connection::new(
		ConnectionId::new(id).unwrap(),
		MarketplaceId::new(marketplace),
		"us-east-1",
	);
	conn.status = status;
	conn
}
