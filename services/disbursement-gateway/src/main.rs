// Disbursement Gateway Service
// HTTP entry point for single disbursements over Instapay and Pesonet

use disbursement_adapters::{DisbursementService, PartnerClient, PartnerConnector};
use disbursement_gateway::{
    config::{Config, LogFormat},
    router, AppState,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config);

    info!("🚀 Starting Disbursement Gateway");

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let partner = PartnerClient::new(config.partner.clone())?;
    info!(
        "Partner: {} at {} (token cache: {})",
        partner.name(),
        config.partner.base_url,
        config.partner.cache_tokens
    );

    let service = DisbursementService::new(
        Arc::new(partner),
        config.sender.clone(),
        config.remittance.clone(),
    );

    let shutdown = CancellationToken::new();
    setup_shutdown_signal(shutdown.clone());

    let app = router(AppState::new(service, shutdown.clone()));

    let bind_addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("✅ Gateway listening on: {}", bind_addr);
    info!("   GET  /disbursement/:rail/banks - Receiving banks");
    info!("   POST /disbursement/single/:rail - Single transfer");
    info!("   GET  /disbursement/status/:method/:ref_id - Transfer status");
    info!("   GET  /health - Health check");
    info!("   GET  /readiness - Readiness check");
    info!("   GET  /metrics - Prometheus metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("👋 Disbursement Gateway stopped");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    match config.logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_line_number(true))
            .init(),
    }
}

/// Cancel `token` on Ctrl+C or SIGTERM
fn setup_shutdown_signal(token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
            _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
        }

        token.cancel();
    });
}
