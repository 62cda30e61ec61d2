//! aurrpc server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use log::{info, LevelFilter};
use tokio::sync::watch;

use aurrpc_api::config::Settings;
use aurrpc_api::jobs::start_jobs;
use aurrpc_api::router::build_router;
use aurrpc_api::state::AppState;

#[derive(Parser)]
#[command(name = "aurrpc", about = "read-only RPC server over the AUR package set", version)]
struct Cli {
    /// Settings file (JSON); built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load(path).context("loading config file")?,
        None => Settings::default(),
    };
    init_logging(&settings.log_file, cli.verbose).context("setting up logging")?;
    settings.validate().context("validating config")?;

    info!("aurrpc {} is starting...", env!("CARGO_PKG_VERSION"));
    let state = Arc::new(AppState::new(settings.clone()));

    // The first load has to succeed; without a catalog there is nothing
    // to serve.
    info!("loading package data...");
    let start = Instant::now();
    let count = state
        .reload()
        .await
        .context("initial package data load")?;
    info!(
        "loaded {count} packages in {} ms",
        start.elapsed().as_millis()
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let workers = start_jobs(Arc::clone(&state), &shutdown_rx);

    let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));

    info!("server started, ready for client connections on {addr}");
    if settings.enable_ssl {
        let tls = RustlsConfig::from_pem_file(&settings.cert_file, &settings.key_file)
            .await
            .context("loading TLS certificate")?;
        let handle = axum_server::Handle::new();
        tokio::spawn(watch_for_shutdown(shutdown_tx, Some(handle.clone())));
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app)
            .await
            .context("server error")?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .context("binding listen socket")?;
        let mut rx = shutdown_rx.clone();
        tokio::spawn(watch_for_shutdown(shutdown_tx, None));
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.changed().await;
            })
            .await
            .context("server error")?;
    }

    // Drain the periodic workers before reporting a clean stop.
    for worker in workers {
        let _ = worker.await;
    }
    info!("aurrpc stopped.");
    Ok(())
}

/// Flip the shared shutdown signal on ctrl-c; with a TLS listener the
/// axum-server handle needs its own graceful-shutdown nudge.
async fn watch_for_shutdown(tx: watch::Sender<bool>, handle: Option<axum_server::Handle>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("server is shutting down...");
    let _ = tx.send(true);
    if let Some(handle) = handle {
        handle.graceful_shutdown(Some(Duration::from_secs(10)));
    }
}

/// Route log output to the configured file, or stdout when none is set.
fn init_logging(log_file: &str, verbosity: u8) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    if log_file.is_empty() {
        builder.target(env_logger::Target::Stdout);
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}
