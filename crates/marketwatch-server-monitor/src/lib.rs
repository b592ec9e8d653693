// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Marketplace check execution and scheduling.
//!
//! [`MonitoringService`] runs one check against one connection through the
//! [`MarketplaceProbe`] registered for its marketplace. [`Orchestrator`] owns
//! the schedule: it re-reads the active connections every cycle, fans checks
//! out to concurrent tasks and funnels their results to a single writer.

pub mod context;
pub mod error;
pub mod health;
pub mod http_probe;
pub mod orchestrator;
pub mod probe;
pub mod service;

pub use context::{CancellationToken, CheckContext};
pub use error::{InitializationError, ProbeError};
pub use health::{CheckHealth, HealthState, LastResultInfo, MonitoringHealth};
pub use http_probe::HttpMarketplaceProbe;
pub use orchestrator::{Orchestrator, OrchestratorOptions, StatsSnapshot};
pub use probe::{MarketplaceProbe, ProbeRegistry};
pub use service::MonitoringService;
