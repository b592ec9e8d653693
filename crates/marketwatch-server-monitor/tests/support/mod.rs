// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use marketwatch_monitor_core::{
	CheckDefinition, CheckKind, CheckResult, Connection, ConnectionId, ConnectionStatus,
	MarketplaceId,
};
use marketwatch_server_db::testing::{
	create_test_pool, create_test_registry, create_test_store, make_connection,
};
use marketwatch_server_db::{
	ConnectionRegistry, PersistenceError, ResultStore, SqliteConnectionRegistry,
	SqliteResultStore,
};
use marketwatch_server_monitor::{
	MarketplaceProbe, MonitoringService, Orchestrator, OrchestratorOptions, ProbeError,
	ProbeRegistry,
};

pub const MARKETPLACE: &str = "amazon";

/// What the scripted probe does for one call.
pub enum Step {
	Reply(serde_json::Value),
	Fail(ProbeError),
	Hang(Duration),
}

type Script = dyn Fn(&Connection, CheckKind, usize) -> Step + Send + Sync;

/// Probe whose behavior is a function of (connection, check, call number).
pub struct ScriptedProbe {
	id: MarketplaceId,
	script: Box<Script>,
	calls: Mutex<HashMap<(String, CheckKind), usize>>,
	total: AtomicUsize,
}

impl ScriptedProbe {
	pub fn new(
		script: impl Fn(&Connection, CheckKind, usize) -> Step + Send + Sync + 'static,
	) -> Arc<Self> {
		Arc::new(Self {
			id: MarketplaceId::new(MARKETPLACE),
			script: Box::new(script),
			calls: Mutex::new(HashMap::new()),
			total: AtomicUsize::new(0),
		})
	}

	pub fn always_ok() -> Arc<Self> {
		Self::new(|conn, check, _| {
			Step::Reply(serde_json::json!({ "connection": conn.id.as_str(), "check": check.as_str() }))
		})
	}

	pub fn total_calls(&self) -> usize {
		self.total.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl MarketplaceProbe for ScriptedProbe {
	fn marketplace_id(&self) -> &MarketplaceId {
		&self.id
	}

	async fn probe(
		&self,
		connection: &Connection,
		check: CheckKind,
	) -> Result<serde_json::Value, ProbeError> {
		self.total.fetch_add(1, Ordering::SeqCst);
		let call = {
			let mut calls = self.calls.lock().unwrap();
			let count = calls
				.entry((connection.id.as_str().to_string(), check))
				.or_insert(0);
			let call = *count;
			*count += 1;
			call
		};

		match (self.script)(connection, check, call) {
			Step::Reply(payload) => Ok(payload),
			Step::Fail(err) => Err(err),
			Step::Hang(duration) => {
				tokio::time::sleep(duration).await;
				Ok(serde_json::Value::Null)
			}
		}
	}
}

/// Store that accepts nothing.
pub struct FailingStore;

#[async_trait]
impl ResultStore for FailingStore {
	async fn ensure_indexes(&self) -> marketwatch_server_db::Result<()> {
		Ok(())
	}

	async fn write_result(&self, _result: &CheckResult) -> marketwatch_server_db::Result<()> {
		Err(PersistenceError::Internal("store unavailable".to_string()))
	}

	async fn query_recent(
		&self,
		_connection_id: &ConnectionId,
		_check: CheckKind,
		_limit: u32,
	) -> marketwatch_server_db::Result<Vec<CheckResult>> {
		Ok(Vec::new())
	}

	async fn query_range(
		&self,
		_from: DateTime<Utc>,
		_to: DateTime<Utc>,
		_limit: u32,
	) -> marketwatch_server_db::Result<Vec<CheckResult>> {
		Ok(Vec::new())
	}
}

/// Registry whose `list_active` never returns.
pub struct StalledRegistry;

#[async_trait]
impl ConnectionRegistry for StalledRegistry {
	async fn list_active(&self) -> marketwatch_server_db::Result<Vec<Connection>> {
		tokio::time::sleep(Duration::from_secs(3600)).await;
		Ok(Vec::new())
	}
}

pub struct Harness {
	pub pool: SqlitePool,
	pub store: Arc<SqliteResultStore>,
	pub registry: Arc<SqliteConnectionRegistry>,
}

impl Harness {
	pub async fn new() -> Self {
		let pool = create_test_pool().await;
		let store = Arc::new(create_test_store(&pool).await);
		let registry = Arc::new(create_test_registry(&pool).await);
		Self {
			pool,
			store,
			registry,
		}
	}

	pub async fn add_connection(&self, id: &str, status: ConnectionStatus) {
		self
			.registry
			.upsert(&make_connection(id, MARKETPLACE, status))
			.await
			.unwrap();
	}

	pub async fn set_status(&self, id: &str, status: ConnectionStatus) {
		self
			.registry
			.set_status(&ConnectionId::new(id).unwrap(), status)
			.await
			.unwrap();
	}

	pub fn orchestrator(
		&self,
		probe: Arc<ScriptedProbe>,
		definitions: Vec<CheckDefinition>,
		options: OrchestratorOptions,
	) -> Orchestrator {
		Orchestrator::new(
			definitions,
			self.store.clone(),
			self.registry.clone(),
			service(probe),
			options,
		)
	}

	/// Results for one (connection, check), oldest first.
	pub async fn results(&self, id: &str, check: CheckKind) -> Vec<CheckResult> {
		let mut results = self
			.store
			.query_recent(&ConnectionId::new(id).unwrap(), check, 1000)
			.await
			.unwrap();
		results.reverse();
		results
	}
}

pub fn service(probe: Arc<ScriptedProbe>) -> Arc<MonitoringService> {
	let mut probes = ProbeRegistry::new();
	probes.register(probe);
	Arc::new(MonitoringService::new(probes))
}

pub fn definition(kind: CheckKind, interval_ms: u64, timeout_ms: u64) -> CheckDefinition {
	CheckDefinition::new(
		kind,
		Duration::from_millis(interval_ms),
		Duration::from_millis(timeout_ms),
	)
}

pub fn fast_options() -> OrchestratorOptions {
	OrchestratorOptions {
		shutdown_grace: Duration::from_secs(2),
		max_concurrent_checks: 8,
		result_buffer: 32,
		call_timeout: Duration::from_secs(2),
	}
}

/// Poll `condition` every 10ms until it holds or `timeout` passes.
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
	F: FnMut() -> Fut,
	Fut: Future<Output = bool>,
{
	let deadline = tokio::time::Instant::now() + timeout;
	loop {
		if condition().await {
			return true;
		}
		if tokio::time::Instant::now() >= deadline {
			return false;
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
}
