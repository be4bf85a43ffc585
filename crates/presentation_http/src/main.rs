//! Tenantry HTTP server

use std::{sync::Arc, time::Duration};

use application::{ports::TenantRegistryPort, services::TenantResolver};
use domain::{TenantId, TenantRecord};
use infrastructure::{
    AppConfig, AsyncDatabase, AsyncDatabaseConfig, SqliteTenantRegistry, TenantDataSources,
    init_telemetry,
};
use presentation_http::{AppState, error::set_expose_internal_errors, routes};
use tokio::{net::TcpListener, signal};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_telemetry(&config.telemetry)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Tenantry starting"
    );

    set_expose_internal_errors(config.server.expose_internal_errors);

    let shared = AsyncDatabase::new(&AsyncDatabaseConfig::from_url(
        config.database.url.clone(),
        config.database.max_connections,
    ))
    .await?;
    if config.database.run_migrations {
        shared.migrate().await?;
    }

    let registry = Arc::new(SqliteTenantRegistry::new(shared.pool().clone()));
    let root = TenantId::new(&config.tenancy.default_tenant);
    if registry.find(&root).await?.is_none() {
        registry
            .upsert(&TenantRecord::shared(root.clone(), "Root"))
            .await?;
        info!(tenant_id = %root, "Registered default tenant");
    }

    let resolver = TenantResolver::new(
        Arc::clone(&registry) as Arc<dyn TenantRegistryPort>,
        config.tenancy.resolution_config(config.environment),
    );
    let data_sources = TenantDataSources::new(shared.clone(), &config.database);

    let addr = config.server.bind_address();
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let state = AppState {
        resolver: Arc::new(resolver),
        registry,
        data_sources: Arc::new(data_sources),
        config: Arc::new(config),
    };

    let app = routes::create_router(state);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    shared.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    info!("Waiting up to {:?} for connections to close", timeout);
}
