pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod parser;
pub mod services;
pub mod state;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, cmd_add_series, cmd_episodes, cmd_list_series, cmd_refresh};
pub use config::Config;
use services::Scheduler;
use state::SharedState;

pub async fn run(config: Config) -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&config);

    let Some(command) = cli.command else {
        println!("No command given. Run with --help for usage.");
        return Ok(());
    };

    if matches!(command, Commands::Init) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("config.toml already exists.");
        }
        return Ok(());
    }

    config.validate()?;

    match command {
        Commands::Daemon => run_daemon(config).await,
        Commands::Refresh { id } => {
            let state = SharedState::new(config).await?;
            cmd_refresh(&state, id).await
        }
        Commands::Add { external_id } => {
            let state = SharedState::new(config).await?;
            cmd_add_series(&state, external_id).await
        }
        Commands::List => {
            let state = SharedState::new(config).await?;
            cmd_list_series(&state).await
        }
        Commands::Episodes { id } => {
            let state = SharedState::new(config).await?;
            cmd_episodes(&state, id).await
        }
        Commands::Init => Ok(()),
    }
}

fn init_logging(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn init_metrics(config: &Config) -> anyhow::Result<()> {
    if !config.observability.metrics_enabled {
        return Ok(());
    }

    let Some(port) = config.observability.metrics_port else {
        info!("Metrics enabled but no metrics_port configured, exporter not started");
        return Ok(());
    };

    use metrics_exporter_prometheus::PrometheusBuilder;
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus exporter")?;
    info!("Prometheus metrics exporter listening on port {}", port);

    Ok(())
}

async fn run_daemon(config: Config) -> anyhow::Result<()> {
    info!(
        "Episodarr v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    init_metrics(&config)?;

    let state = SharedState::new(config.clone()).await?;

    let listener_handle = state.refresh.clone().start_listener(&state.event_bus);

    let scheduler = std::sync::Arc::new(Scheduler::new(
        state.refresh.clone(),
        config.scheduler.clone(),
    ));

    let scheduler_handle = {
        let sched = std::sync::Arc::clone(&scheduler);
        tokio::spawn(async move {
            if let Err(e) = sched.start().await {
                error!("Scheduler error: {}", e);
            }
        })
    };

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    scheduler.stop().await;
    scheduler_handle.abort();
    listener_handle.abort();
    info!("Daemon stopped");

    Ok(())
}
