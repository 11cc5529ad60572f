use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use pulsecheck::notifications::service::NotificationService;
use pulsecheck::server::config::ServerConfig;
use pulsecheck::server::logging::init_logging;
use pulsecheck::version::VERSION;
use pulsecheck::watchdog::WatchdogEngine;
use pulsecheck::web::create_axum_router;

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about = "Dead man's switch API for remote devices", long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler.");
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
                error!(error = %e, "Failed to install SIGTERM handler.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let server_config = ServerConfig::load(args.config.as_deref())?;
    init_logging(&server_config.log_dir);
    info!("Starting Pulse Check API, version: {}", VERSION);

    let notification_service = Arc::new(NotificationService::from_config(&server_config)?);
    info!(channels = ?notification_service.channel_names(), "Alert channels configured.");

    let engine = WatchdogEngine::new(notification_service);
    let app = create_axum_router(engine.clone());

    let addr: SocketAddr = server_config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "HTTP server listening.");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown();
    info!("Server stopped.");
    Ok(())
}
