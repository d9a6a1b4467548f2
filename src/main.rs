//! Sniffer Injector - mutating admission webhook for packet-capture sidecars

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use sniffer_injector::config::Args;
use sniffer_injector::telemetry::init_logging;
use sniffer_injector::webhook::{webhook_router, WebhookState};
use sniffer_injector::Error;

/// How long in-flight reviews get to finish after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install crypto provider - FIPS-validated aws-lc-rs
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!("CRITICAL: Failed to install crypto provider: {:?}", e);
        std::process::exit(1);
    }

    let args = Args::parse();
    init_logging(&args.log_level, args.log_format)?;

    let port = args.port;
    let tls_cert = args.tls_cert.clone().into_bytes();
    let tls_key = args.tls_key.clone().into_bytes();

    let config = args
        .into_injector_config()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!(
        image = %config.sidecar_image,
        excluded_namespaces = ?config.policy.excluded_namespaces().collect::<Vec<_>>(),
        skip_injected = config.skip_injected,
        "Injector configured"
    );

    let state = Arc::new(WebhookState::new(Arc::new(config)).map_err(Error::from)?);
    let router = webhook_router(state);

    let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem(tls_cert, tls_key)
        .await
        .map_err(|e| Error::server(format!("invalid TLS certificate or key: {e}")))?;

    let handle = axum_server::Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "Starting webhook HTTPS server");

    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .map_err(|e| Error::server(format!("failed to serve on {addr}: {e}")))?;

    info!("Webhook server stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM, then drain the server
async fn shutdown_on_signal(handle: axum_server::Handle) {
    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                error!(error = %e, "Failed to register signal handlers");
                return;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }

    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
