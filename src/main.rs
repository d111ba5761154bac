use std::net::SocketAddr;
use std::sync::Arc;

use mimalloc::MiMalloc;
use reportdash::config::AppConfig;
use reportdash::services::identity::PgIdentityProvider;
use reportdash::services::report_store::PgReportStore;
use reportdash::{db, routes, AppState};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reportdash=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    db::run_migrations(&pool).await?;

    let provider = Arc::new(PgIdentityProvider::new(
        pool.clone(),
        config.jwt_secret.clone(),
        config.jwt_token_expiry_secs,
    ));
    let store = Arc::new(PgReportStore::new(pool));
    let state = AppState::new(provider, store, config.dashboard_settings());

    let cors = CorsLayer::new().allow_origin(AllowOrigin::exact(config.frontend_url.parse()?));

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!(host = %addr, "Starting reportdash API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
