use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use repo_ticker::config::Config;
use repo_ticker::github::GitHubClient;
use repo_ticker::printer::ReceiptPrinter;
use repo_ticker::server::{AppState, build_router};
use repo_ticker::sync::{Scheduler, SyncEngine};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("repo_ticker=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "configuration error");
            return ExitCode::FAILURE;
        }
    };

    let client = match GitHubClient::new(config.token.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build GitHub client");
            return ExitCode::FAILURE;
        }
    };

    let filter = config.action_filter();
    let engine = Arc::new(SyncEngine::new(client, filter.clone()));
    let scheduler = Arc::new(Scheduler::new(
        Arc::clone(&engine),
        config.repositories.clone(),
        config.poll_interval,
    ));

    let printer = ReceiptPrinter::new(config.printer.clone());
    let monitored = scheduler.start(printer).await;
    info!(repositories = monitored.len(), "synchronization started");

    let state = AppState::new(Arc::clone(&scheduler), config.poll_interval, &filter);
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };
    info!(%addr, "inspection endpoints listening");

    let shutdown_scheduler = Arc::clone(&scheduler);
    let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
        }
        info!("shutdown signal received");
        shutdown_scheduler.stop();
    });

    if let Err(e) = serve.await {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    scheduler.stop();
    ExitCode::SUCCESS
}
