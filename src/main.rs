//! imagine - validating admission webhook for container image names.
//!
//! This is the main entry point that:
//! - Parses configuration from flags and environment
//! - Initializes structured logging
//! - Loads TLS materials and serves the webhook until SIGTERM/SIGINT

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use imagine_webhook::{Config, LogFormat, WebhookState, run_webhook_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_tracing(config.log_format)?;

    let policy = config.policy();
    info!(
        port = config.port,
        protocol = ?config.protocol,
        polarity = ?policy.polarity(),
        image_name = %policy.match_substring(),
        "Starting the imagine server"
    );

    let state = Arc::new(WebhookState::new(policy, config.protocol));

    if let Err(e) = run_webhook_server(
        state,
        &config.cert,
        &config.key,
        config.port,
        shutdown_signal(),
    )
    .await
    {
        error!(error = %e, "Webhook server failed");
        return Err(e.into());
    }

    info!("Webhook server stopped");
    Ok(())
}

/// Initialize the tracing subscriber. `RUST_LOG` refines the default directives.
fn init_tracing(format: LogFormat) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::from_default_env()
        .add_directive("imagine=info".parse()?)
        .add_directive("imagine_webhook=info".parse()?);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the server cannot shut down
/// gracefully without them.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
