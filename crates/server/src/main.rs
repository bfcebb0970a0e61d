use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use stillframe_server::config::ServerConfig;
use stillframe_server::rate_limit::RateLimiter;
use stillframe_server::state::AppState;
use stillframe_upstream::flim::FlimClient;
use stillframe_upstream::provider::MediaProvider;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env();
    info!(db_path = %config.db_path, "connecting to database");

    let pool = stillframe_db::connect(&config.db_path)
        .await
        .context("failed to connect to database")?;

    stillframe_db::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("migrations complete");

    let provider = Arc::new(FlimClient::new(config.upstream_url.clone()));
    info!(provider = provider.name(), upstream = %config.upstream_url, "using upstream provider");
    if config.trust_forwarded_for {
        info!("email rate limit keyed on X-Forwarded-For");
    }
    let app_state = AppState {
        db: pool,
        provider,
        email_limiter: RateLimiter::new(config.email_rate_limit, 60)
            .trusting_forwarded_for(config.trust_forwarded_for),
    };

    let app = stillframe_server::routes::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("failed to bind")?;
    info!(addr = %config.bind_addr, "server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
