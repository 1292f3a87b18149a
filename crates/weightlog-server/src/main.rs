// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use weightlog_server::{
    build_router, AppState, HttpMailer, LogMailer, MailTransport, Mailer, ServerConfig,
};
use weightlog_store::SqliteStore;

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                warn!("signal handlers unavailable, falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_mailer(config: &ServerConfig) -> Result<Arc<dyn Mailer>, String> {
    Ok(match &config.mail.transport {
        MailTransport::Log => Arc::new(LogMailer::new(config.mail.sender.clone())),
        MailTransport::Http { endpoint, bearer } => Arc::new(
            HttpMailer::new(
                endpoint.clone(),
                bearer.clone(),
                config.mail.sender.clone(),
                config.mail.retry.clone(),
            )
            .map_err(|e| format!("mail transport: {e}"))?,
        ),
    })
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = ServerConfig::from_env().map_err(|e| format!("invalid configuration: {e}"))?;
    init_tracing(config.log_json);
    match serde_json::to_string(&config) {
        Ok(effective) => info!(config = %effective, "effective configuration"),
        Err(e) => warn!("cannot render configuration: {e}"),
    }
    if config.uses_default_secret() {
        warn!("WEIGHTLOG_JWT_SECRET is not set; using the built-in development secret");
    }

    let store = SqliteStore::open(&config.database_path).map_err(|e| {
        format!(
            "failed to open database {}: {e}",
            config.database_path.display()
        )
    })?;
    let mailer = build_mailer(&config)?;
    info!(
        database = %config.database_path.display(),
        mail_transport = mailer.transport_tag(),
        "weightlog-server starting"
    );

    let bind_addr = config.bind_addr.clone();
    let drain = config.shutdown_drain;
    let state = AppState::new(Arc::new(store), mailer, config);
    let app = build_router(state.clone());

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    state.ready.store(true, Ordering::Relaxed);
    info!("weightlog-server listening on {bind_addr}");

    let ready = state.ready.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            ready.store(false, Ordering::Relaxed);
            info!(drain_ms = drain.as_millis() as u64, "shutdown requested, draining");
            tokio::time::sleep(drain).await;
        })
        .await
        .map_err(|e| {
            error!("server failed: {e}");
            format!("server failed: {e}")
        })
}
