// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scheduling of recurring checks across all active connections.
//!
//! One scheduler task keeps a due instant per [`CheckDefinition`]. When a
//! definition comes due it reads the active connections once and spawns one
//! task per (connection, definition) pair, bounded by a semaphore. Check
//! tasks report on an mpsc channel drained by a single writer task, so a slow
//! or failing store never stalls dispatch.
//!
//! Lifecycle state lives in a `watch` channel. Every transition is a
//! compare-and-set through `send_if_modified`, and the scheduler re-reads the
//! state before each dispatch.

use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Extra time, past the grace period, the scheduler gets to finish draining
/// before shutdown aborts it.
const SCHEDULER_EXIT_MARGIN: Duration = Duration::from_secs(1);

use marketwatch_monitor_core::{
	CheckDefinition, CheckKind, CheckOutcome, CheckResult, Connection, OrchestratorState,
};
use marketwatch_server_db::{ConnectionRegistry, ResultStore};

use crate::context::{CancellationToken, CheckContext};
use crate::error::InitializationError;
use crate::health::{check_health, HealthState, MonitoringHealth, UNHEALTHY_THRESHOLD};
use crate::service::MonitoringService;

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
	/// How long shutdown waits for in-flight checks, and then for the writer.
	pub shutdown_grace: Duration,
	pub max_concurrent_checks: usize,
	/// Capacity of the completion channel between check tasks and the writer.
	pub result_buffer: usize,
	/// Upper bound on each call into the result store or connection registry
	/// made by the orchestrator itself.
	pub call_timeout: Duration,
}

impl Default for OrchestratorOptions {
	fn default() -> Self {
		Self {
			shutdown_grace: Duration::from_secs(30),
			max_concurrent_checks: 16,
			result_buffer: 256,
			call_timeout: Duration::from_secs(10),
		}
	}
}

/// Point-in-time copy of the orchestrator counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
	pub cycles: u64,
	pub dispatched: u64,
	pub succeeded: u64,
	pub failed: u64,
	pub timed_out: u64,
	pub persisted: u64,
	pub persistence_failures: u64,
	/// Dispatched checks that never started because shutdown began while
	/// they waited for a permit.
	pub skipped: u64,
	pub abandoned: u64,
}

#[derive(Default)]
struct Stats {
	cycles: AtomicU64,
	dispatched: AtomicU64,
	succeeded: AtomicU64,
	failed: AtomicU64,
	timed_out: AtomicU64,
	persisted: AtomicU64,
	persistence_failures: AtomicU64,
	skipped: AtomicU64,
	abandoned: AtomicU64,
}

impl Stats {
	fn record_outcome(&self, outcome: CheckOutcome) {
		let counter = match outcome {
			CheckOutcome::Success => &self.succeeded,
			CheckOutcome::Failure => &self.failed,
			CheckOutcome::Timeout => &self.timed_out,
		};
		counter.fetch_add(1, Ordering::Relaxed);
	}

	fn snapshot(&self) -> StatsSnapshot {
		StatsSnapshot {
			cycles: self.cycles.load(Ordering::Relaxed),
			dispatched: self.dispatched.load(Ordering::Relaxed),
			succeeded: self.succeeded.load(Ordering::Relaxed),
			failed: self.failed.load(Ordering::Relaxed),
			timed_out: self.timed_out.load(Ordering::Relaxed),
			persisted: self.persisted.load(Ordering::Relaxed),
			persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
			skipped: self.skipped.load(Ordering::Relaxed),
			abandoned: self.abandoned.load(Ordering::Relaxed),
		}
	}
}

struct BackgroundTasks {
	scheduler: JoinHandle<()>,
	writer: JoinHandle<()>,
}

pub struct Orchestrator {
	definitions: Vec<CheckDefinition>,
	store: Arc<dyn ResultStore>,
	registry: Arc<dyn ConnectionRegistry>,
	service: Arc<MonitoringService>,
	options: OrchestratorOptions,
	state_tx: watch::Sender<OrchestratorState>,
	stats: Arc<Stats>,
	tasks: Mutex<Option<BackgroundTasks>>,
}

impl Orchestrator {
	pub fn new(
		definitions: Vec<CheckDefinition>,
		store: Arc<dyn ResultStore>,
		registry: Arc<dyn ConnectionRegistry>,
		service: Arc<MonitoringService>,
		options: OrchestratorOptions,
	) -> Self {
		let (state_tx, _) = watch::channel(OrchestratorState::Uninitialized);
		Self {
			definitions,
			store,
			registry,
			service,
			options,
			state_tx,
			stats: Arc::new(Stats::default()),
			tasks: Mutex::new(None),
		}
	}

	pub fn state(&self) -> OrchestratorState {
		*self.state_tx.borrow()
	}

	pub fn stats(&self) -> StatsSnapshot {
		self.stats.snapshot()
	}

	pub fn definitions(&self) -> &[CheckDefinition] {
		&self.definitions
	}

	/// Start scheduling. Returns `false` if the orchestrator could not start;
	/// the cause is logged.
	#[instrument(skip(self), fields(definitions = self.definitions.len()))]
	pub async fn initialize(&self) -> bool {
		match self.state() {
			OrchestratorState::Running => {
				warn!("Orchestrator already running, ignoring initialize");
				return true;
			}
			OrchestratorState::ShuttingDown | OrchestratorState::Stopped => {
				error!(state = %self.state(), "Orchestrator cannot be initialized after shutdown");
				return false;
			}
			OrchestratorState::Uninitialized => {}
		}

		match self.try_initialize().await {
			Ok(()) => true,
			Err(InitializationError::InvalidState(OrchestratorState::Running)) => {
				warn!("Orchestrator started concurrently, ignoring initialize");
				true
			}
			Err(e) => {
				error!(error = %e, "Orchestrator initialization failed");
				false
			}
		}
	}

	async fn try_initialize(&self) -> Result<(), InitializationError> {
		self.validate()?;
		tokio::time::timeout(self.options.call_timeout, self.store.ensure_indexes())
			.await
			.map_err(|_| InitializationError::IndexesTimedOut(self.options.call_timeout))?
			.map_err(InitializationError::Indexes)?;

		// Held across the transition so shutdown always finds the tasks.
		let mut tasks = self.tasks.lock().await;
		let mut observed = OrchestratorState::Uninitialized;
		let started = self.state_tx.send_if_modified(|state| {
			observed = *state;
			if state.can_transition_to(OrchestratorState::Running) {
				*state = OrchestratorState::Running;
				true
			} else {
				false
			}
		});
		if !started {
			return Err(InitializationError::InvalidState(observed));
		}

		let (results_tx, results_rx) = mpsc::channel(self.options.result_buffer);
		let writer = tokio::spawn(run_writer(
			Arc::clone(&self.store),
			Arc::clone(&self.stats),
			results_rx,
		));

		let scheduler = Scheduler {
			definitions: self.definitions.clone(),
			registry: Arc::clone(&self.registry),
			service: Arc::clone(&self.service),
			stats: Arc::clone(&self.stats),
			permits: Arc::new(Semaphore::new(self.options.max_concurrent_checks)),
			results_tx,
			cancellation_token: CancellationToken::new(),
			shutdown_grace: self.options.shutdown_grace,
			call_timeout: self.options.call_timeout,
			last_epochs: HashMap::new(),
		};
		let scheduler = tokio::spawn(scheduler.run(self.state_tx.subscribe()));

		*tasks = Some(BackgroundTasks { scheduler, writer });

		info!(
			checks = ?self.definitions.iter().map(|d| d.kind).collect::<Vec<_>>(),
			max_concurrent_checks = self.options.max_concurrent_checks,
			"Monitoring orchestrator started"
		);
		Ok(())
	}

	fn validate(&self) -> Result<(), InitializationError> {
		if self.definitions.is_empty() {
			return Err(InitializationError::NoDefinitions);
		}

		let mut seen = HashSet::new();
		for definition in &self.definitions {
			definition.validate()?;
			if !seen.insert(definition.kind) {
				return Err(InitializationError::DuplicateDefinition(definition.kind));
			}
		}

		if self.options.max_concurrent_checks == 0
			|| self.options.max_concurrent_checks > Semaphore::MAX_PERMITS
		{
			return Err(InitializationError::InvalidOptions(format!(
				"max_concurrent_checks must be between 1 and {}",
				Semaphore::MAX_PERMITS
			)));
		}
		if self.options.result_buffer == 0 {
			return Err(InitializationError::InvalidOptions(
				"result_buffer must be greater than zero".to_string(),
			));
		}
		if self.options.call_timeout.is_zero() {
			return Err(InitializationError::InvalidOptions(
				"call_timeout must be greater than zero".to_string(),
			));
		}

		Ok(())
	}

	/// Stop scheduling and wait for in-flight work, bounded by the grace
	/// period. Calling it again once stopped does nothing.
	#[instrument(skip(self))]
	pub async fn shutdown(&self) {
		let mut observed = OrchestratorState::Uninitialized;
		self.state_tx.send_if_modified(|state| {
			observed = *state;
			let next = match *state {
				OrchestratorState::Uninitialized => OrchestratorState::Stopped,
				OrchestratorState::Running => OrchestratorState::ShuttingDown,
				OrchestratorState::ShuttingDown | OrchestratorState::Stopped => return false,
			};
			*state = next;
			true
		});

		match observed {
			OrchestratorState::Stopped => {
				debug!("Orchestrator already stopped");
				return;
			}
			OrchestratorState::Uninitialized => {
				info!("Orchestrator stopped before it was started");
				return;
			}
			OrchestratorState::ShuttingDown => {
				debug!("Shutdown already in progress, waiting for it to finish");
				let mut state_rx = self.state_tx.subscribe();
				let _ = state_rx
					.wait_for(|state| *state == OrchestratorState::Stopped)
					.await;
				return;
			}
			OrchestratorState::Running => {}
		}

		info!(grace_secs = self.options.shutdown_grace.as_secs(), "Shutting down orchestrator");

		let tasks = self.tasks.lock().await.take();
		if let Some(BackgroundTasks {
			mut scheduler,
			mut writer,
		}) = tasks
		{
			// The scheduler enforces the grace period on in-flight checks and
			// drops the completion sender on exit.
			let scheduler_deadline = self.options.shutdown_grace + SCHEDULER_EXIT_MARGIN;
			match tokio::time::timeout(scheduler_deadline, &mut scheduler).await {
				Ok(Ok(())) => {}
				Ok(Err(e)) => error!(error = %e, "Scheduler task ended abnormally"),
				Err(_) => {
					// Dropping the scheduler's JoinSet aborts its checks.
					scheduler.abort();
					error!("Scheduler did not stop within the grace period, aborted");
				}
			}

			match tokio::time::timeout(self.options.shutdown_grace, &mut writer).await {
				Ok(Ok(())) => {}
				Ok(Err(e)) => error!(error = %e, "Result writer ended abnormally"),
				Err(_) => {
					writer.abort();
					error!("Result writer did not drain within the grace period");
				}
			}
		}

		self.state_tx.send_replace(OrchestratorState::Stopped);
		let stats = self.stats();
		info!(
			dispatched = stats.dispatched,
			persisted = stats.persisted,
			abandoned = stats.abandoned,
			"Orchestrator stopped"
		);
	}

	/// Health of every (active connection, check) pair, derived from the most
	/// recent stored results.
	#[instrument(skip(self))]
	pub async fn health_status(&self) -> MonitoringHealth {
		let listed = tokio::time::timeout(self.options.call_timeout, self.registry.list_active()).await;
		let connections = match listed {
			Ok(Ok(connections)) => connections,
			Ok(Err(e)) => {
				error!(error = %e, "Failed to list active connections for health status");
				return MonitoringHealth::unhealthy();
			}
			Err(_) => {
				error!(
					timeout_ms = self.options.call_timeout.as_millis() as u64,
					"Listing active connections for health status timed out"
				);
				return MonitoringHealth::unhealthy();
			}
		};

		let mut checks = Vec::with_capacity(connections.len() * self.definitions.len());
		for connection in &connections {
			for definition in &self.definitions {
				let queried = tokio::time::timeout(
					self.options.call_timeout,
					self
						.store
						.query_recent(&connection.id, definition.kind, UNHEALTHY_THRESHOLD),
				)
				.await;
				let recent = match queried {
					Ok(Ok(recent)) => recent,
					Ok(Err(e)) => {
						warn!(
							connection_id = %connection.id,
							check = %definition.kind,
							error = %e,
							"Failed to read recent results"
						);
						Vec::new()
					}
					Err(_) => {
						warn!(
							connection_id = %connection.id,
							check = %definition.kind,
							"Reading recent results timed out"
						);
						Vec::new()
					}
				};
				checks.push(check_health(connection.id.clone(), definition.kind, &recent));
			}
		}

		MonitoringHealth::from_checks(checks)
	}
}

async fn run_writer(
	store: Arc<dyn ResultStore>,
	stats: Arc<Stats>,
	mut results_rx: mpsc::Receiver<CheckResult>,
) {
	while let Some(result) = results_rx.recv().await {
		match store.write_result(&result).await {
			Ok(()) => {
				stats.persisted.fetch_add(1, Ordering::Relaxed);
			}
			Err(e) => {
				stats.persistence_failures.fetch_add(1, Ordering::Relaxed);
				error!(
					connection_id = %result.connection_id,
					check = %result.check,
					epoch = result.epoch,
					outcome = %result.outcome,
					error = %e,
					"Failed to persist check result"
				);
			}
		}
	}
	debug!("Result writer drained");
}

enum SchedulerEvent {
	Due,
	StateChanged,
	StateClosed,
	Reaped(Result<(), JoinError>),
}

struct Scheduler {
	definitions: Vec<CheckDefinition>,
	registry: Arc<dyn ConnectionRegistry>,
	service: Arc<MonitoringService>,
	stats: Arc<Stats>,
	permits: Arc<Semaphore>,
	results_tx: mpsc::Sender<CheckResult>,
	/// Shared by every dispatched check; cancelled when the grace period ends.
	cancellation_token: CancellationToken,
	shutdown_grace: Duration,
	call_timeout: Duration,
	last_epochs: HashMap<CheckKind, i64>,
}

impl Scheduler {
	async fn run(mut self, mut state_rx: watch::Receiver<OrchestratorState>) {
		let mut next_due = vec![Instant::now(); self.definitions.len()];
		let mut in_flight = JoinSet::new();

		loop {
			if !state_rx.borrow_and_update().accepts_work() {
				break;
			}

			let wake_at = next_due.iter().copied().min().unwrap_or_else(Instant::now);
			let event = tokio::select! {
				_ = tokio::time::sleep_until(wake_at) => SchedulerEvent::Due,
				changed = state_rx.changed() => match changed {
					Ok(()) => SchedulerEvent::StateChanged,
					Err(_) => SchedulerEvent::StateClosed,
				},
				Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
					SchedulerEvent::Reaped(joined)
				}
			};

			match event {
				SchedulerEvent::Due => {
					let now = Instant::now();
					let mut due = Vec::new();
					for (index, definition) in self.definitions.iter().enumerate() {
						if next_due[index] <= now {
							due.push(*definition);
							next_due[index] = advance(next_due[index], definition.interval, now);
						}
					}
					self.run_cycle(&due, &mut state_rx, &mut in_flight).await;
				}
				SchedulerEvent::StateChanged => {}
				SchedulerEvent::StateClosed => break,
				SchedulerEvent::Reaped(joined) => log_join_result(joined),
			}
		}

		self.drain(in_flight).await;
	}

	async fn run_cycle(
		&mut self,
		due: &[CheckDefinition],
		state_rx: &mut watch::Receiver<OrchestratorState>,
		in_flight: &mut JoinSet<()>,
	) {
		if due.is_empty() {
			return;
		}
		self.stats.cycles.fetch_add(1, Ordering::Relaxed);

		let listed = tokio::select! {
			listed = tokio::time::timeout(self.call_timeout, self.registry.list_active()) => listed,
			_ = wait_until_stopped(state_rx) => {
				debug!("Orchestrator stopped while listing connections");
				return;
			}
		};
		let connections = match listed {
			Ok(Ok(connections)) => connections,
			Ok(Err(e)) => {
				error!(error = %e, "Failed to list active connections, skipping cycle");
				return;
			}
			Err(_) => {
				error!(
					timeout_ms = self.call_timeout.as_millis() as u64,
					"Listing active connections timed out, skipping cycle"
				);
				return;
			}
		};

		for definition in due {
			let epoch = self.next_epoch(definition.kind);
			debug!(
				check = %definition.kind,
				epoch,
				connections = connections.len(),
				"Dispatching checks"
			);

			for connection in &connections {
				if !state_rx.borrow().accepts_work() {
					debug!("Orchestrator no longer running, stopping dispatch");
					return;
				}
				self.dispatch(connection.clone(), *definition, epoch, state_rx, in_flight);
			}
		}
	}

	fn dispatch(
		&self,
		connection: Connection,
		definition: CheckDefinition,
		epoch: i64,
		state_rx: &watch::Receiver<OrchestratorState>,
		in_flight: &mut JoinSet<()>,
	) {
		let state_rx = state_rx.clone();
		let service = Arc::clone(&self.service);
		let stats = Arc::clone(&self.stats);
		let permits = Arc::clone(&self.permits);
		let results_tx = self.results_tx.clone();
		let ctx = CheckContext::new(epoch, self.cancellation_token.clone());

		self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
		in_flight.spawn(async move {
			let Ok(_permit) = permits.acquire_owned().await else {
				return;
			};
			// Checks still queued on the semaphore when shutdown begins never start.
			if !state_rx.borrow().accepts_work() {
				stats.skipped.fetch_add(1, Ordering::Relaxed);
				debug!(
					connection_id = %connection.id,
					check = %definition.kind,
					"Orchestrator no longer running, skipping queued check"
				);
				return;
			}
			let result = service.run_check(&connection, &definition, &ctx).await;
			// Counted as abandoned by the drain that cancelled it.
			if ctx.cancellation_token.is_cancelled() {
				return;
			}
			stats.record_outcome(result.outcome);
			if results_tx.send(result).await.is_err() {
				warn!(
					connection_id = %connection.id,
					check = %definition.kind,
					"Result writer closed, dropping result"
				);
			}
		});
	}

	/// Epoch for the next execution of `check`: wall-clock milliseconds,
	/// bumped past the previous epoch so it always increases.
	fn next_epoch(&mut self, check: CheckKind) -> i64 {
		let now_ms = Utc::now().timestamp_millis();
		let epoch = match self.last_epochs.get(&check) {
			Some(previous) => now_ms.max(previous + 1),
			None => now_ms,
		};
		self.last_epochs.insert(check, epoch);
		epoch
	}

	async fn drain(self, mut in_flight: JoinSet<()>) {
		if in_flight.is_empty() {
			return;
		}

		info!(in_flight = in_flight.len(), "Waiting for in-flight checks");
		let deadline = Instant::now() + self.shutdown_grace;
		loop {
			match tokio::time::timeout_at(deadline, in_flight.join_next()).await {
				Ok(Some(joined)) => log_join_result(joined),
				Ok(None) => break,
				Err(_) => {
					let abandoned = in_flight.len() as u64;
					self.cancellation_token.cancel();
					in_flight.shutdown().await;
					self.stats.abandoned.fetch_add(abandoned, Ordering::Relaxed);
					warn!(abandoned, "Grace period elapsed, abandoning in-flight checks");
					break;
				}
			}
		}
	}
}

/// Next due instant after `previous`, skipping ticks missed while the
/// scheduler was busy.
fn advance(previous: Instant, interval: Duration, now: Instant) -> Instant {
	let next = previous + interval;
	if next <= now {
		now + interval
	} else {
		next
	}
}

/// Resolves once the state no longer accepts work or the sender is gone.
async fn wait_until_stopped(state_rx: &mut watch::Receiver<OrchestratorState>) {
	loop {
		if !state_rx.borrow_and_update().accepts_work() {
			return;
		}
		if state_rx.changed().await.is_err() {
			return;
		}
	}
}

fn log_join_result(joined: Result<(), JoinError>) {
	if let Err(e) = joined {
		if e.is_panic() {
			error!(error = %e, "Check task panicked");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::probe::ProbeRegistry;
	use async_trait::async_trait;
	use marketwatch_server_db::{PersistenceError, Result as DbResult};
	use std::sync::atomic::AtomicUsize;

	struct EmptyRegistry;

	#[async_trait]
	impl ConnectionRegistry for EmptyRegistry {
		async fn list_active(&self) -> DbResult<Vec<Connection>> {
			Ok(Vec::new())
		}
	}

	#[derive(Default)]
	struct CountingStore {
		ensure_calls: AtomicUsize,
		fail_indexes: bool,
		hang_indexes: bool,
	}

	#[async_trait]
	impl ResultStore for CountingStore {
		async fn ensure_indexes(&self) -> DbResult<()> {
			self.ensure_calls.fetch_add(1, Ordering::SeqCst);
			if self.hang_indexes {
				tokio::time::sleep(Duration::from_secs(3600)).await;
			}
			if self.fail_indexes {
				return Err(PersistenceError::Internal("disk full".to_string()));
			}
			Ok(())
		}

		async fn write_result(&self, _result: &CheckResult) -> DbResult<()> {
			Ok(())
		}

		async fn query_recent(
			&self,
			_connection_id: &marketwatch_monitor_core::ConnectionId,
			_check: CheckKind,
			_limit: u32,
		) -> DbResult<Vec<CheckResult>> {
			Ok(Vec::new())
		}

		async fn query_range(
			&self,
			_from: chrono::DateTime<Utc>,
			_to: chrono::DateTime<Utc>,
			_limit: u32,
		) -> DbResult<Vec<CheckResult>> {
			Ok(Vec::new())
		}
	}

	fn definition(kind: CheckKind) -> CheckDefinition {
		CheckDefinition::new(kind, Duration::from_secs(60), Duration::from_secs(5))
	}

	fn orchestrator_with(
		definitions: Vec<CheckDefinition>,
		store: Arc<CountingStore>,
		options: OrchestratorOptions,
	) -> Orchestrator {
		Orchestrator::new(
			definitions,
			store,
			Arc::new(EmptyRegistry),
			Arc::new(MonitoringService::new(ProbeRegistry::new())),
			options,
		)
	}

	fn orchestrator(definitions: Vec<CheckDefinition>) -> Orchestrator {
		orchestrator_with(
			definitions,
			Arc::new(CountingStore::default()),
			OrchestratorOptions::default(),
		)
	}

	#[test]
	fn advance_keeps_cadence_when_on_time() {
		let start = Instant::now();
		let interval = Duration::from_secs(10);
		assert_eq!(advance(start, interval, start), start + interval);
	}

	#[test]
	fn advance_skips_missed_ticks() {
		let start = Instant::now();
		let interval = Duration::from_secs(10);
		let late = start + Duration::from_secs(35);
		assert_eq!(advance(start, interval, late), late + interval);
	}

	#[tokio::test]
	async fn epochs_strictly_increase_per_check() {
		let (tx, _rx) = mpsc::channel(1);
		let mut scheduler = Scheduler {
			definitions: Vec::new(),
			registry: Arc::new(EmptyRegistry),
			service: Arc::new(MonitoringService::new(ProbeRegistry::new())),
			stats: Arc::new(Stats::default()),
			permits: Arc::new(Semaphore::new(1)),
			results_tx: tx,
			cancellation_token: CancellationToken::new(),
			shutdown_grace: Duration::from_secs(1),
			call_timeout: Duration::from_secs(1),
			last_epochs: HashMap::new(),
		};

		let mut previous = scheduler.next_epoch(CheckKind::Price);
		for _ in 0..1000 {
			let epoch = scheduler.next_epoch(CheckKind::Price);
			assert!(epoch > previous);
			previous = epoch;
		}
		assert!(scheduler.next_epoch(CheckKind::Health) > 0);
	}

	#[tokio::test]
	async fn initialize_rejects_empty_definitions() {
		let orch = orchestrator(Vec::new());
		assert!(!orch.initialize().await);
		assert_eq!(orch.state(), OrchestratorState::Uninitialized);
	}

	#[tokio::test]
	async fn initialize_rejects_duplicate_kinds() {
		let orch = orchestrator(vec![definition(CheckKind::Health), definition(CheckKind::Health)]);
		assert!(matches!(
			orch.validate(),
			Err(InitializationError::DuplicateDefinition(CheckKind::Health))
		));
		assert!(!orch.initialize().await);
	}

	#[tokio::test]
	async fn initialize_rejects_zero_timeout() {
		let orch = orchestrator(vec![CheckDefinition::new(
			CheckKind::Price,
			Duration::from_secs(60),
			Duration::ZERO,
		)]);
		assert!(matches!(
			orch.validate(),
			Err(InitializationError::InvalidDefinition(_))
		));
	}

	#[tokio::test]
	async fn initialize_rejects_zero_concurrency() {
		let orch = orchestrator_with(
			vec![definition(CheckKind::Health)],
			Arc::new(CountingStore::default()),
			OrchestratorOptions {
				max_concurrent_checks: 0,
				..Default::default()
			},
		);
		assert!(!orch.initialize().await);
	}

	#[tokio::test]
	async fn index_failure_returns_false_and_stays_uninitialized() {
		let store = Arc::new(CountingStore {
			fail_indexes: true,
			..Default::default()
		});
		let orch = orchestrator_with(
			vec![definition(CheckKind::Health)],
			store.clone(),
			OrchestratorOptions::default(),
		);

		assert!(!orch.initialize().await);
		assert_eq!(orch.state(), OrchestratorState::Uninitialized);
		assert_eq!(store.ensure_calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn stalled_index_creation_times_out_and_stays_uninitialized() {
		let store = Arc::new(CountingStore {
			hang_indexes: true,
			..Default::default()
		});
		let orch = orchestrator_with(
			vec![definition(CheckKind::Health)],
			store.clone(),
			OrchestratorOptions {
				call_timeout: Duration::from_millis(50),
				..Default::default()
			},
		);

		assert!(matches!(
			orch.try_initialize().await,
			Err(InitializationError::IndexesTimedOut(_))
		));
		let started = tokio::time::timeout(Duration::from_secs(2), orch.initialize())
			.await
			.expect("initialize should give up on a stalled store");
		assert!(!started);
		assert_eq!(orch.state(), OrchestratorState::Uninitialized);
		assert_eq!(store.ensure_calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn initialize_rejects_zero_call_timeout() {
		let orch = orchestrator_with(
			vec![definition(CheckKind::Health)],
			Arc::new(CountingStore::default()),
			OrchestratorOptions {
				call_timeout: Duration::ZERO,
				..Default::default()
			},
		);
		assert!(matches!(
			orch.validate(),
			Err(InitializationError::InvalidOptions(_))
		));
	}

	#[tokio::test]
	async fn initialize_twice_is_idempotent() {
		let store = Arc::new(CountingStore::default());
		let orch = orchestrator_with(
			vec![definition(CheckKind::Health)],
			store.clone(),
			OrchestratorOptions::default(),
		);

		assert!(orch.initialize().await);
		assert!(orch.initialize().await);
		assert_eq!(orch.state(), OrchestratorState::Running);
		assert_eq!(store.ensure_calls.load(Ordering::SeqCst), 1);

		orch.shutdown().await;
		assert_eq!(orch.state(), OrchestratorState::Stopped);
	}

	#[tokio::test]
	async fn shutdown_before_initialize_stops_and_blocks_restart() {
		let orch = orchestrator(vec![definition(CheckKind::Health)]);
		orch.shutdown().await;
		assert_eq!(orch.state(), OrchestratorState::Stopped);
		assert!(!orch.initialize().await);
		assert_eq!(orch.state(), OrchestratorState::Stopped);
	}

	#[tokio::test]
	async fn shutdown_twice_is_a_no_op() {
		let orch = orchestrator(vec![definition(CheckKind::Health)]);
		assert!(orch.initialize().await);

		orch.shutdown().await;
		let after_first = orch.stats();
		orch.shutdown().await;

		assert_eq!(orch.state(), OrchestratorState::Stopped);
		assert_eq!(orch.stats(), after_first);
	}
}
