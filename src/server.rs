//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, migrations, external service clients and the
//! Axum server lifecycle.

use crate::application::services::CheckoutSettings;
use crate::config::Config;
use crate::infrastructure::assets::CloudinaryUploader;
use crate::infrastructure::identity::JwksVerifier;
use crate::infrastructure::payments::StripeGateway;
use crate::routes::app_router;
use crate::state::{AppState, Gateways, Repositories};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Identity, image hosting and payment clients
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migrations fail
/// - An external client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");

    let timeout = config.external_timeout();
    let gateways = Gateways {
        identity: Arc::new(JwksVerifier::new(
            &config.auth0_issuer_base_url,
            &config.auth0_audience,
            timeout,
        )?),
        assets: Arc::new(CloudinaryUploader::new(
            &config.cloudinary_cloud_name,
            config.cloudinary_api_key.clone(),
            config.cloudinary_api_secret.clone(),
            timeout,
        )?),
        payments: Arc::new(StripeGateway::new(
            config.stripe_api_key.clone(),
            config.stripe_webhook_secret.clone(),
            timeout,
        )?),
    };

    let state = AppState::new(
        Repositories::postgres(Arc::new(pool)),
        gateways,
        CheckoutSettings::new(&config.frontend_url, config.payment_currency.clone()),
    );

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
