//! picdrop - a minimal image host.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use picdrop::{
    create_router, prepare_upload_dir, Config, RouterConfig, StaticResolver, UploadProcessor,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let host_pattern = match config.host_pattern() {
        Ok(pattern) => pattern,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = prepare_upload_dir(&config.upload_dir) {
        error!(
            "Cannot create upload directory {}: {}",
            config.upload_dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let processor = UploadProcessor::with_copy_options(&config.upload_dir, config.copy_options());
    let resolver = StaticResolver::new(&config.upload_dir, host_pattern);
    let router_config = RouterConfig::new(config.credentials(), config.upload_url.clone())
        .with_auth_realm(config.auth_realm.clone())
        .with_tracing(!config.no_tracing);

    let copy_options = processor.copy_options();
    info!("picdrop v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Upload directory: {}", processor.upload_dir().display());
    info!("  Serving from: {}", resolver.root().display());
    info!("  Upload URL: {}", config.upload_url);
    info!("  Upload host pattern: {}", resolver.host_pattern().as_str());
    info!("  Auth user: {}", config.auth_user);
    info!(
        "  Copy: {} byte buffer, yield every {} bytes",
        copy_options.buffer_size, copy_options.yield_threshold
    );
    if !config.upload_url.ends_with('/') {
        warn!("  Upload URL does not end with '/'; filenames are appended verbatim");
    }

    let router = create_router(processor, resolver, router_config);

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "picdrop=debug,tower_http=debug"
    } else {
        "picdrop=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolve when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, keep serving until killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
