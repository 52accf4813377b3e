mod config;
mod console;
mod controller;
mod errors;
mod estimator;
mod input;
mod models;
mod server;
mod state;
mod view;

use crate::estimator::client::EstimationClient;
use crate::state::{ViewEvent, ViewState};
use crate::view::chart::ChartView;
use tokio::sync::{mpsc, watch};

const USAGE: &str = "usage: volscope [console|serve]";

#[tokio::main]
async fn main() {
    // Structured logging to stderr; stdout belongs to the console view
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    match std::env::args().nth(1).as_deref() {
        None | Some("console") => run_console(cfg).await,
        Some("serve") => run_service(cfg).await,
        Some(other) => {
            eprintln!("unknown command: {other}\n{USAGE}");
            std::process::exit(2);
        }
    }
}

/// Interactive front end: stdin commands -> controller -> printed view.
async fn run_console(cfg: config::AppConfig) {
    tracing::info!(api = %cfg.api_base_url, "volscope console starting");

    let client = EstimationClient::new(&cfg.api_base_url, cfg.http_timeout);
    let initial = ViewState::new(&cfg.default_lambda);

    let (events_tx, events_rx) = mpsc::channel::<ViewEvent>(64);
    let (view_tx, view_rx) = watch::channel(ChartView::project(&initial));

    let controller = tokio::spawn(controller::run_controller(
        initial,
        client,
        events_tx.clone(),
        events_rx,
        view_tx,
    ));

    let printer = tokio::spawn(console::run_printer(view_rx.clone()));

    console::run_console_input(events_tx, view_rx).await;

    if let Err(e) = controller.await {
        tracing::error!("controller task failed: {e}");
    }
    // the watch sender dropped with the controller, so the printer flushes the last view and exits
    if let Err(e) = printer.await {
        tracing::error!("printer task failed: {e}");
    }
}

/// Estimation service.
async fn run_service(cfg: config::AppConfig) {
    let addr = format!("{}:{}", cfg.server_host, cfg.server_port);
    tracing::info!(rate_limit = cfg.rate_limit_per_minute, "estimation service listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server::serve(listener, cfg).await {
        tracing::error!("{e}");
    }
}
