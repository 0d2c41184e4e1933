//! Main entry point for the restaurant menu service.
//!
//! Loads the configuration, builds the engine over the configured storage
//! backend, seeds a fresh store and serves the admin, display and public
//! menu API until interrupted.

use clap::Parser;
use menu_config::Config;
use menu_service::{factory_registry::build_engine_from_config, server};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line arguments for the menu service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "MENU_CONFIG", default_value = "config/menu.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started menu service");

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let engine = Arc::new(build_engine_from_config(config.clone()).await?);
	engine.initialize().await?;

	match config.enabled_api() {
		Some(api_config) => {
			let api_task = server::start_server(api_config.clone(), Arc::clone(&engine));

			tokio::select! {
				result = engine.run() => {
					tracing::info!("Engine finished");
					result?;
				}
				result = api_task => {
					tracing::info!("API server finished");
					result?;
				}
			}
		}
		None => {
			tracing::info!("API disabled, running engine only");
			engine.run().await?;
		}
	}

	engine.shutdown().await?;
	tracing::info!("Stopped menu service");
	Ok(())
}
