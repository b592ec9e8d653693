// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::Utc;
use tracing::{debug, instrument, warn};

use marketwatch_monitor_core::{CheckDefinition, CheckOutcome, CheckResult, Connection};

use crate::context::CheckContext;
use crate::probe::ProbeRegistry;

/// Executes single checks against single connections.
///
/// Every call yields a [`CheckResult`]; timeouts and probe errors become
/// `timeout` / `failure` outcomes, as does cancelling the context mid-check.
/// Nothing is persisted here.
pub struct MonitoringService {
	probes: ProbeRegistry,
}

impl MonitoringService {
	pub fn new(probes: ProbeRegistry) -> Self {
		Self { probes }
	}

	pub fn probes(&self) -> &ProbeRegistry {
		&self.probes
	}

	#[instrument(
		skip(self, connection, definition, ctx),
		fields(
			connection_id = %connection.id,
			marketplace = %connection.marketplace_id,
			check = %definition.kind,
			epoch = ctx.epoch
		)
	)]
	pub async fn run_check(
		&self,
		connection: &Connection,
		definition: &CheckDefinition,
		ctx: &CheckContext,
	) -> CheckResult {
		let started_at = Utc::now();
		let finish = |outcome, payload, error| {
			CheckResult::completed(
				connection.id.clone(),
				definition.kind,
				ctx.epoch,
				started_at,
				outcome,
				payload,
				error,
			)
		};

		if ctx.cancellation_token.is_cancelled() {
			debug!("Check cancelled before dispatch");
			return finish(
				CheckOutcome::Failure,
				serde_json::Value::Null,
				Some("cancelled before dispatch".to_string()),
			);
		}

		let Some(probe) = self.probes.get(&connection.marketplace_id) else {
			warn!("No probe registered for marketplace");
			return finish(
				CheckOutcome::Failure,
				serde_json::Value::Null,
				Some(format!(
					"no probe registered for marketplace {}",
					connection.marketplace_id
				)),
			);
		};

		let attempt = tokio::select! {
			biased;
			_ = ctx.cancellation_token.cancelled() => None,
			attempt = tokio::time::timeout(definition.timeout, probe.probe(connection, definition.kind)) => {
				Some(attempt)
			}
		};
		let Some(attempt) = attempt else {
			debug!("Check cancelled while in flight");
			return finish(
				CheckOutcome::Failure,
				serde_json::Value::Null,
				Some("cancelled".to_string()),
			);
		};

		match attempt {
			Ok(Ok(payload)) => {
				debug!("Check succeeded");
				finish(CheckOutcome::Success, payload, None)
			}
			Ok(Err(e)) => {
				warn!(error = %e, "Check failed");
				finish(CheckOutcome::Failure, serde_json::Value::Null, Some(e.to_string()))
			}
			Err(_) => {
				let timeout_ms = definition.timeout.as_millis() as u64;
				warn!(timeout_ms, "Check timed out");
				finish(
					CheckOutcome::Timeout,
					serde_json::Value::Null,
					Some(format!("check timed out after {timeout_ms}ms")),
				)
			}
		}
	}
}
