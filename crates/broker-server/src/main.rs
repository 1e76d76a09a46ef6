// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Service broker binary.

use std::path::PathBuf;
use std::sync::Arc;

use broker_config::SharedMysqlConfig;
use broker_k8s::KubeClient;
use broker_server::{create_router, Broker};
use broker_services::{Catalog, SharedMysqlSettings};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod version;

/// Open Service Broker provisioning MySQL and MinIO on Kubernetes.
#[derive(Parser, Debug)]
#[command(name = "service-broker", about = "Kubernetes service broker", version)]
struct Args {
	/// Config file; defaults to /etc/service-broker/broker.toml
	#[arg(long, env = "BROKER_CONFIG")]
	config: Option<PathBuf>,

	/// Namespace for instances without one and for shared services
	#[arg(long)]
	namespace: Option<String>,

	/// Run provision and deprovision in the background when allowed
	#[arg(long = "async")]
	async_enabled: bool,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

fn shared_settings(entry: SharedMysqlConfig) -> SharedMysqlSettings {
	SharedMysqlSettings {
		name: entry.name,
		id: entry.id,
		user: entry.user,
		password: entry.password,
		host: entry.host,
		port: entry.port,
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let mut config = match &args.config {
		Some(path) => broker_config::load_config_with_file(path)?,
		None => broker_config::load_config()?,
	};
	if let Some(namespace) = args.namespace.filter(|ns| !ns.is_empty()) {
		config.broker.namespace = namespace;
	}
	if args.async_enabled {
		config.broker.async_enabled = true;
	}

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		namespace = %config.broker.namespace,
		async_enabled = config.broker.async_enabled,
		"starting service-broker"
	);

	let client = Arc::new(KubeClient::new().await?);
	let catalog = Arc::new(Catalog::with_shared_mysql(
		config.shared_mysql.iter().cloned().map(shared_settings).collect(),
	));
	let broker = Arc::new(Broker::new(catalog, client, config.broker.clone()));
	let app = create_router(broker);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);
	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
