pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod scheduler;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
pub use config::Config;
use scheduler::Scheduler;
use state::SharedState;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = config.general.log_level.clone();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "fieldops")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("serve" | "-d" | "--daemon") => run_server(config, prometheus_handle).await,

        Some("sweep") => run_single_sweep(config).await,

        Some("init" | "--init") => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists.");
            }
            Ok(())
        }

        Some("help" | "-h" | "--help") => {
            print_help();
            Ok(())
        }

        Some(other) => {
            println!("Unknown command: {other}");
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Fieldops - Field Operations Back Office");
    println!();
    println!("USAGE:");
    println!("  fieldops <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("  serve             Run the API server with the background scheduler (default)");
    println!("  sweep             Run a single auto clock-out sweep and exit");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure the server, scheduler and security params.");
    println!("  Set JWT_SECRET_KEY in the environment to override the session signing key.");
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Fieldops v{} starting in server mode...",
        env!("CARGO_PKG_VERSION")
    );

    let (_, secret_is_fallback) = Config::resolve_jwt_secret();
    if secret_is_fallback {
        warn!(
            "JWT_SECRET_KEY is not set; using the built-in fallback secret. \
             Set it before exposing this service."
        );
    }

    let shared = Arc::new(SharedState::new(config.clone()).await?);

    let scheduler = Scheduler::new(Arc::clone(&shared), config.scheduler.clone());
    let scheduler_handle = tokio::spawn(async move {
        if let Err(e) = scheduler.start().await {
            error!("Scheduler error: {}", e);
        }
    });

    let api_state = api::create_app_state(shared, prometheus_handle).await?;
    let app = api::router(api_state).await;

    let port = config.server.port;
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("Web server running at http://0.0.0.0:{}", port);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Server running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    scheduler_handle.abort();
    server_handle.abort();
    info!("Server stopped");

    Ok(())
}

async fn run_single_sweep(config: Config) -> anyhow::Result<()> {
    info!("Running single auto clock-out sweep...");

    let shared = Arc::new(SharedState::new(config.clone()).await?);
    let scheduler = Scheduler::new(shared, config.scheduler);

    let processed = scheduler.run_once().await?;

    info!("Sweep complete: {} employees clocked out", processed);
    Ok(())
}
