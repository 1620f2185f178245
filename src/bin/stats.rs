use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use afisha::config::StatsConfig;
use afisha::db;
use afisha::stats::{routes, StatsState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL").unwrap_or_else(|_| "afisha=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting stats service...");

    dotenv::dotenv().ok();
    let config = StatsConfig::from_env()?;

    let pool = db::connect(&config.database_url, config.database_max_connections).await?;
    sqlx::migrate!("./migrations/stats").run(&pool).await?;
    info!("Database ready");

    let addr = SocketAddr::new(config.server_host.parse()?, config.server_port);
    let state = Arc::new(StatsState::new(pool));

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Stats service listening on {}", addr);
    axum::Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
