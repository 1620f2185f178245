use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use afisha::config::Config;
use afisha::services::stats_client::{StatsClient, ViewTracker};
use afisha::state::AppState;
use afisha::{db, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL").unwrap_or_else(|_| "afisha=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting events service...");

    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    let pool = db::connect(&config.database_url, config.database_max_connections).await?;
    sqlx::migrate!("./migrations/main").run(&pool).await?;
    info!("Database ready");

    let stats: Arc<dyn ViewTracker> =
        Arc::new(StatsClient::new(&config.stats_service_url, &config.app_name));

    let addr = SocketAddr::new(config.server_host.parse()?, config.server_port);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);
    let cors = if config.cors_allowed_origins == "*" {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .split(',')
            .filter_map(|o| o.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    };

    let state = Arc::new(AppState::new(config, pool, stats));

    let app = routes::events::router()
        .merge(routes::categories::router())
        .merge(routes::compilations::router())
        .merge(routes::users::router())
        .merge(routes::requests::router())
        .merge(routes::comments::router())
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Events service listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    Ok(())
}
