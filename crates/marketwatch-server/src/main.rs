// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Marketwatch server binary.

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use marketwatch_sandbox::{InMemorySandboxBackend, SandboxGate};
use marketwatch_server_config::{MarketplaceConfig, ServerConfig};
use marketwatch_server_db::{create_pool, SqliteConnectionRegistry, SqliteResultStore};
use marketwatch_server_monitor::{
	HttpMarketplaceProbe, MonitoringService, Orchestrator, OrchestratorOptions, ProbeRegistry,
};

mod cli;
mod logging;
mod version;

use cli::{Args, Command, SimulateCommand};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(ExitCode::SUCCESS);
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => marketwatch_server_config::load_config_with_file(path),
		None => marketwatch_server_config::load_config(),
	}
	.context("failed to load configuration")?;

	logging::init_tracing(&config.logging);

	match args.command {
		None | Some(Command::Run) => run(config).await,
		Some(Command::Simulate(command)) => simulate(&config, command).await,
		Some(Command::Version) => Ok(ExitCode::SUCCESS),
	}
}

async fn run(config: ServerConfig) -> anyhow::Result<ExitCode> {
	tracing::info!(
		environment = %config.environment.name,
		database = %config.database.url,
		"starting marketwatch-server"
	);

	let pool = create_pool(&config.database.url)
		.await
		.context("failed to open database")?;

	let registry = Arc::new(SqliteConnectionRegistry::new(pool.clone()));
	registry
		.ensure_schema()
		.await
		.context("failed to prepare connection registry")?;
	let store = Arc::new(SqliteResultStore::new(pool.clone()));

	let probes = build_probes(&config.marketplaces)?;
	if probes.is_empty() {
		tracing::warn!("No marketplaces configured; every check will report a failure");
	}
	let service = Arc::new(MonitoringService::new(probes));

	let options = OrchestratorOptions {
		shutdown_grace: config.monitoring.shutdown_grace(),
		max_concurrent_checks: config.monitoring.max_concurrent_checks,
		result_buffer: config.monitoring.result_buffer,
		call_timeout: config.monitoring.call_timeout(),
	};
	let orchestrator = Orchestrator::new(
		config.monitoring.definitions(),
		store,
		registry,
		service,
		options,
	);

	if !orchestrator.initialize().await {
		tracing::error!("Monitoring orchestrator failed to initialize, exiting");
		pool.close().await;
		return Ok(ExitCode::FAILURE);
	}

	wait_for_shutdown_signal().await;
	tracing::info!("Received shutdown signal");

	orchestrator.shutdown().await;
	let stats = orchestrator.stats();
	tracing::info!(
		cycles = stats.cycles,
		dispatched = stats.dispatched,
		succeeded = stats.succeeded,
		failed = stats.failed,
		timed_out = stats.timed_out,
		persisted = stats.persisted,
		persistence_failures = stats.persistence_failures,
		skipped = stats.skipped,
		abandoned = stats.abandoned,
		"Server shutdown complete"
	);

	pool.close().await;
	Ok(ExitCode::SUCCESS)
}

fn build_probes(marketplaces: &[MarketplaceConfig]) -> anyhow::Result<ProbeRegistry> {
	let mut probes = ProbeRegistry::new();
	for marketplace in marketplaces {
		let probe = HttpMarketplaceProbe::new(marketplace.id.clone(), &marketplace.base_url)
			.with_context(|| format!("invalid gateway for marketplace {}", marketplace.id))?;
		tracing::info!(marketplace = %marketplace.id, base_url = %marketplace.base_url, "Registered marketplace probe");
		probes.register(Arc::new(probe));
	}
	Ok(probes)
}

async fn simulate(config: &ServerConfig, command: SimulateCommand) -> anyhow::Result<ExitCode> {
	let gate = SandboxGate::for_environment(
		config.environment.name,
		Arc::new(InMemorySandboxBackend::new()),
	);

	let output = match command {
		SimulateCommand::Listing(args) => {
			serde_json::to_string_pretty(&gate.simulate_listing_creation(args.into()).await?)?
		}
		SimulateCommand::Inventory(args) => {
			serde_json::to_string_pretty(&gate.simulate_inventory_update(args.into()).await?)?
		}
		SimulateCommand::Price(args) => {
			serde_json::to_string_pretty(&gate.simulate_price_update(args.into()).await?)?
		}
	};

	println!("{output}");
	Ok(ExitCode::SUCCESS)
}

async fn wait_for_shutdown_signal() {
	#[cfg(unix)]
	{
		use tokio::signal::unix::{signal, SignalKind};

		match signal(SignalKind::terminate()) {
			Ok(mut terminate) => {
				tokio::select! {
					_ = tokio::signal::ctrl_c() => {}
					_ = terminate.recv() => {}
				}
				return;
			}
			Err(e) => {
				tracing::warn!(error = %e, "Failed to install SIGTERM handler, waiting for ctrl-c only");
			}
		}
	}

	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "Failed to listen for ctrl-c");
	}
}
