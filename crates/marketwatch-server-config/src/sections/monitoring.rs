// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Check schedules and orchestrator limits.

use serde::Deserialize;
use std::time::Duration;

use marketwatch_monitor_core::{CheckDefinition, CheckKind};

/// Schedule for one check kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckScheduleConfig {
	pub enabled: bool,
	pub interval_secs: u64,
	pub timeout_ms: u64,
}

impl CheckScheduleConfig {
	fn default_for(kind: CheckKind) -> Self {
		match kind {
			CheckKind::Health => Self {
				enabled: true,
				interval_secs: 60,
				timeout_ms: 10_000,
			},
			CheckKind::Price | CheckKind::Inventory => Self {
				enabled: true,
				interval_secs: 300,
				timeout_ms: 15_000,
			},
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckScheduleLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
	#[serde(default)]
	pub interval_secs: Option<u64>,
	#[serde(default)]
	pub timeout_ms: Option<u64>,
}

impl CheckScheduleLayer {
	pub fn merge(&mut self, other: CheckScheduleLayer) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.interval_secs.is_some() {
			self.interval_secs = other.interval_secs;
		}
		if other.timeout_ms.is_some() {
			self.timeout_ms = other.timeout_ms;
		}
	}

	fn finalize(self, kind: CheckKind) -> CheckScheduleConfig {
		let defaults = CheckScheduleConfig::default_for(kind);
		CheckScheduleConfig {
			enabled: self.enabled.unwrap_or(defaults.enabled),
			interval_secs: self.interval_secs.unwrap_or(defaults.interval_secs),
			timeout_ms: self.timeout_ms.unwrap_or(defaults.timeout_ms),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringConfig {
	pub health: CheckScheduleConfig,
	pub price: CheckScheduleConfig,
	pub inventory: CheckScheduleConfig,
	pub shutdown_grace_secs: u64,
	pub max_concurrent_checks: usize,
	pub result_buffer: usize,
	/// Bound on each store or registry call the orchestrator makes itself.
	pub call_timeout_secs: u64,
}

impl Default for MonitoringConfig {
	fn default() -> Self {
		MonitoringConfigLayer::default().finalize()
	}
}

impl MonitoringConfig {
	pub fn schedule(&self, kind: CheckKind) -> &CheckScheduleConfig {
		match kind {
			CheckKind::Health => &self.health,
			CheckKind::Price => &self.price,
			CheckKind::Inventory => &self.inventory,
		}
	}

	/// Definitions for every enabled check.
	pub fn definitions(&self) -> Vec<CheckDefinition> {
		CheckKind::ALL
			.into_iter()
			.filter(|kind| self.schedule(*kind).enabled)
			.map(|kind| {
				let schedule = self.schedule(kind);
				CheckDefinition::new(
					kind,
					Duration::from_secs(schedule.interval_secs),
					Duration::from_millis(schedule.timeout_ms),
				)
			})
			.collect()
	}

	pub fn shutdown_grace(&self) -> Duration {
		Duration::from_secs(self.shutdown_grace_secs)
	}

	pub fn call_timeout(&self) -> Duration {
		Duration::from_secs(self.call_timeout_secs)
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitoringConfigLayer {
	#[serde(default)]
	pub health: Option<CheckScheduleLayer>,
	#[serde(default)]
	pub price: Option<CheckScheduleLayer>,
	#[serde(default)]
	pub inventory: Option<CheckScheduleLayer>,
	#[serde(default)]
	pub shutdown_grace_secs: Option<u64>,
	#[serde(default)]
	pub max_concurrent_checks: Option<usize>,
	#[serde(default)]
	pub result_buffer: Option<usize>,
	#[serde(default)]
	pub call_timeout_secs: Option<u64>,
}

impl MonitoringConfigLayer {
	pub fn merge(&mut self, other: MonitoringConfigLayer) {
		merge_schedule(&mut self.health, other.health);
		merge_schedule(&mut self.price, other.price);
		merge_schedule(&mut self.inventory, other.inventory);
		if other.shutdown_grace_secs.is_some() {
			self.shutdown_grace_secs = other.shutdown_grace_secs;
		}
		if other.max_concurrent_checks.is_some() {
			self.max_concurrent_checks = other.max_concurrent_checks;
		}
		if other.result_buffer.is_some() {
			self.result_buffer = other.result_buffer;
		}
		if other.call_timeout_secs.is_some() {
			self.call_timeout_secs = other.call_timeout_secs;
		}
	}

	pub fn finalize(self) -> MonitoringConfig {
		MonitoringConfig {
			health: self.health.unwrap_or_default().finalize(CheckKind::Health),
			price: self.price.unwrap_or_default().finalize(CheckKind::Price),
			inventory: self
				.inventory
				.unwrap_or_default()
				.finalize(CheckKind::Inventory),
			shutdown_grace_secs: self.shutdown_grace_secs.unwrap_or(30),
			max_concurrent_checks: self.max_concurrent_checks.unwrap_or(16),
			result_buffer: self.result_buffer.unwrap_or(256),
			call_timeout_secs: self.call_timeout_secs.unwrap_or(10),
		}
	}
}

fn merge_schedule(base: &mut Option<CheckScheduleLayer>, other: Option<CheckScheduleLayer>) {
	if let Some(incoming) = other {
		match base {
			Some(existing) => existing.merge(incoming),
			None => *base = Some(incoming),
		}
	}
}
