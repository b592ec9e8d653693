// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sandbox-only marketplace operations.
//!
//! [`SandboxGate`] is resolved once from the deployment environment. In
//! production every guarded operation fails with [`SandboxDisabledError`]
//! without reaching the backend.

pub mod backend;
pub mod environment;
pub mod error;
pub mod gate;
pub mod request;

pub use backend::{InMemorySandboxBackend, SandboxBackend};
pub use environment::{DeploymentEnvironment, UnknownEnvironment, ENVIRONMENT_VAR};
pub use error::{Result, SandboxDisabledError, SandboxError, SandboxOperation};
pub use gate::SandboxGate;
pub use request::{InventoryUpdate, ListingRequest, PriceUpdate, SimulatedListing, SimulatedUpdate};
