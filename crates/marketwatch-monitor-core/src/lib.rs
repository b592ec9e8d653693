// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for marketplace monitoring.
//!
//! This crate holds the data model shared by the result store, the monitoring
//! service and the orchestrator: connections under monitoring, check
//! definitions, immutable check results and the orchestrator lifecycle state.

pub mod check;
pub mod connection;
pub mod error;
pub mod state;

pub use check::{CheckDefinition, CheckKind, CheckOutcome, CheckResult, ResultId};
pub use connection::{Connection, ConnectionId, ConnectionStatus, MarketplaceId};
pub use error::{MonitorCoreError, Result};
pub use state::OrchestratorState;
